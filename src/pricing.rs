//! Price oracle: trait, symbol normalization, and the HTTP quote client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("Error fetching price for {symbol}: {source}")]
    Request {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Price provider returned status {status} for {symbol}")]
    Status { symbol: String, status: u16 },
    #[error("Price missing from provider response for {symbol}")]
    MissingPrice { symbol: String },
}

/// Returns a current unit price for a ticker symbol. Implementations must
/// not cache across calls; every aggregation re-fetches.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn price(&self, symbol: &str) -> Result<f64, PriceError>;
}

/// Strip enclosing quote characters left over from malformed stored symbols,
/// then upper-case.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == '\'').to_uppercase()
}

/// HTTP oracle client: `GET {base_url}/stockprice?ticker={symbol}` with an
/// `X-Api-Key` header. Non-2xx responses and timeouts are failures.
pub struct HttpPriceOracle {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct PricePayload {
    price: Option<f64>,
}

impl HttpPriceOracle {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn price(&self, symbol: &str) -> Result<f64, PriceError> {
        let symbol = normalize_symbol(symbol);
        let url = format!("{}/stockprice", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("ticker", symbol.as_str())])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|source| PriceError::Request {
                symbol: symbol.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::Status {
                symbol,
                status: status.as_u16(),
            });
        }

        let payload: PricePayload =
            response
                .json()
                .await
                .map_err(|source| PriceError::Request {
                    symbol: symbol.clone(),
                    source,
                })?;
        match payload.price {
            Some(price) => {
                debug!(%symbol, price, "fetched stock price");
                Ok(price)
            }
            None => Err(PriceError::MissingPrice { symbol }),
        }
    }
}
