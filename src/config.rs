//! Environment-driven configuration for the two binaries.

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::aggregator::PortfolioSource;

const DEFAULT_ORACLE_URL: &str = "https://api.api-ninjas.com/v1";
const DEFAULT_STOCK_SERVICES: &str = "stocks1=http://stocks1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl OracleConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: env::var("NINJA_API_URL").unwrap_or_else(|_| DEFAULT_ORACLE_URL.to_string()),
            api_key: env::var("NINJA_API_KEY").context("NINJA_API_KEY must be set")?,
            timeout: timeout_from_env()?,
        })
    }
}

/// Configuration for the stocks service. `DATABASE_URL` selects the
/// Postgres backend; without it the service runs on the in-memory store.
#[derive(Debug, Clone)]
pub struct StocksConfig {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub oracle: OracleConfig,
}

impl StocksConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: bind_addr_from_env(8000)?,
            database_url: env::var("DATABASE_URL").ok(),
            oracle: OracleConfig::from_env()?,
        })
    }
}

/// Configuration for the capital gains service, including the ordered list
/// of named stocks services it aggregates over.
#[derive(Debug, Clone)]
pub struct GainsConfig {
    pub bind_addr: String,
    pub sources: Vec<PortfolioSource>,
    pub oracle: OracleConfig,
    pub request_timeout: Duration,
}

impl GainsConfig {
    pub fn from_env() -> Result<Self> {
        let raw = env::var("STOCK_SERVICES").unwrap_or_else(|_| DEFAULT_STOCK_SERVICES.to_string());
        Ok(Self {
            bind_addr: bind_addr_from_env(8080)?,
            sources: parse_sources(&raw)?,
            oracle: OracleConfig::from_env()?,
            request_timeout: timeout_from_env()?,
        })
    }
}

fn bind_addr_from_env(default_port: u16) -> Result<String> {
    let port = match env::var("PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .with_context(|| format!("invalid PORT: {raw}"))?,
        Err(_) => default_port,
    };
    Ok(format!("0.0.0.0:{port}"))
}

fn timeout_from_env() -> Result<Duration> {
    let secs = match env::var("REQUEST_TIMEOUT_SECS") {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("invalid REQUEST_TIMEOUT_SECS: {raw}"))?,
        Err(_) => DEFAULT_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}

/// Parse a `name=url` list, comma-separated, preserving order.
pub fn parse_sources(raw: &str) -> Result<Vec<PortfolioSource>> {
    let mut sources = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some((name, base_url)) = entry.split_once('=') else {
            bail!("invalid STOCK_SERVICES entry {entry:?}: expected name=url");
        };
        sources.push(PortfolioSource {
            name: name.trim().to_string(),
            base_url: base_url.trim().to_string(),
        });
    }
    if sources.is_empty() {
        bail!("STOCK_SERVICES must name at least one service");
    }
    Ok(sources)
}
