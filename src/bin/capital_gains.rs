//! Capital gains service binary: aggregates positions across the configured
//! stocks services.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stock_portfolio::aggregator::Aggregator;
use stock_portfolio::api::capital_gains::{capital_gains_router, GainsState};
use stock_portfolio::config::GainsConfig;
use stock_portfolio::pricing::HttpPriceOracle;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GainsConfig::from_env()?;
    info!(
        sources = ?config.sources.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        "aggregating over stocks services"
    );

    let oracle = Arc::new(HttpPriceOracle::new(
        &config.oracle.base_url,
        &config.oracle.api_key,
        config.oracle.timeout,
    )?);
    let aggregator = Arc::new(Aggregator::new(
        config.sources.clone(),
        oracle,
        config.request_timeout,
    )?);

    let app = capital_gains_router(GainsState { aggregator });
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "capital gains service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
