//! Stocks service binary: CRUD over positions plus valuation endpoints.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stock_portfolio::api::stocks::{stocks_router, StocksState};
use stock_portfolio::config::StocksConfig;
use stock_portfolio::pricing::HttpPriceOracle;
use stock_portfolio::store::{MemoryStore, PgStore, StockStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = StocksConfig::from_env()?;

    let store: Arc<dyn StockStore> = match &config.database_url {
        Some(url) => {
            info!("using postgres store");
            Arc::new(PgStore::connect(url).await?)
        }
        None => {
            info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let oracle = Arc::new(HttpPriceOracle::new(
        &config.oracle.base_url,
        &config.oracle.api_key,
        config.oracle.timeout,
    )?);

    let app = stocks_router(StocksState { store, oracle });
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "stocks service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
