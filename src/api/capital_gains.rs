//! Capital gains service: the cross-service aggregation endpoint.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::aggregator::Aggregator;
use crate::api::error::ApiError;
use crate::gains::ShareBounds;

#[derive(Clone)]
pub struct GainsState {
    pub aggregator: Arc<Aggregator>,
}

#[derive(Debug, Deserialize)]
pub struct GainsQuery {
    portfolio: Option<String>,
    numsharesgt: Option<i64>,
    numshareslt: Option<i64>,
}

pub fn capital_gains_router(state: GainsState) -> Router {
    Router::new()
        .route("/capital-gains", get(capital_gains))
        .with_state(state)
}

async fn capital_gains(
    State(state): State<GainsState>,
    query: Result<Query<GainsQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    debug!(
        portfolio = ?query.portfolio,
        numsharesgt = ?query.numsharesgt,
        numshareslt = ?query.numshareslt,
        "received capital gains query"
    );
    let bounds = ShareBounds {
        greater_than: query.numsharesgt,
        less_than: query.numshareslt,
    };
    let total = state
        .aggregator
        .total_capital_gains(query.portfolio.as_deref(), bounds)
        .await?;
    Ok(Json(json!({ "total_capital_gains": total })))
}
