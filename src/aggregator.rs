//! Cross-service aggregation: selector resolution, position retrieval with
//! degrade-to-empty, and the fail-fast capital gains fold.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::gains::{capital_gain, round2, ShareBounds};
use crate::pricing::{normalize_symbol, PriceError, PriceOracle};
use crate::types::stock::Stock;

/// One named Position Service endpoint the aggregator can query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioSource {
    pub name: String,
    pub base_url: String,
}

pub struct Aggregator {
    sources: Vec<PortfolioSource>,
    oracle: Arc<dyn PriceOracle>,
    client: reqwest::Client,
}

impl Aggregator {
    pub fn new(
        sources: Vec<PortfolioSource>,
        oracle: Arc<dyn PriceOracle>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            sources,
            oracle,
            client,
        })
    }

    /// Sources matching the selector, in configuration order. No selector
    /// means all sources; an unrecognized selector means none (the
    /// aggregate is then zero, not an error).
    fn resolve(&self, selector: Option<&str>) -> Vec<&PortfolioSource> {
        match selector {
            None => self.sources.iter().collect(),
            Some(tag) => self.sources.iter().filter(|s| s.name == tag).collect(),
        }
    }

    /// List one service's positions. Any failure degrades to an empty list;
    /// an unreachable source must not fail the whole aggregation.
    async fn fetch_stocks(&self, source: &PortfolioSource) -> Vec<Stock> {
        let url = format!("{}/stocks", source.base_url.trim_end_matches('/'));
        debug!(source = %source.name, %url, "fetching stocks");
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(source = %source.name, error = %err, "stocks service unreachable");
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            warn!(
                source = %source.name,
                status = response.status().as_u16(),
                "stocks service returned non-success"
            );
            return Vec::new();
        }
        match response.json::<Vec<Stock>>().await {
            Ok(stocks) => stocks,
            Err(err) => {
                warn!(source = %source.name, error = %err, "unreadable stocks payload");
                Vec::new()
            }
        }
    }

    /// Concatenated positions from every resolved source, in resolution order.
    async fn collect_stocks(&self, selector: Option<&str>) -> Vec<Stock> {
        let mut stocks = Vec::new();
        for source in self.resolve(selector) {
            stocks.extend(self.fetch_stocks(source).await);
        }
        stocks
    }

    /// Total capital gains over the filtered positions, rounded to 2
    /// fractional digits. Prices are resolved once per distinct symbol
    /// within this call; the first oracle failure aborts the whole total.
    pub async fn total_capital_gains(
        &self,
        selector: Option<&str>,
        bounds: ShareBounds,
    ) -> Result<f64, PriceError> {
        let stocks = bounds.apply(self.collect_stocks(selector).await);

        let mut prices: HashMap<String, f64> = HashMap::new();
        let mut total = 0.0;
        for stock in &stocks {
            let symbol = normalize_symbol(&stock.symbol);
            let price = match prices.get(&symbol) {
                Some(price) => *price,
                None => {
                    let price = self.oracle.price(&symbol).await?;
                    prices.insert(symbol.clone(), price);
                    price
                }
            };
            let gain = capital_gain(stock, price);
            debug!(%symbol, gain, "capital gain");
            total += gain;
        }
        Ok(round2(total))
    }
}
