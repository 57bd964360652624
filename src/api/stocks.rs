//! Stocks service: CRUD over positions plus the two valuation endpoints.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::debug;

use crate::api::error::{from_json_rejection, ApiError};
use crate::gains::{position_value, round2};
use crate::pricing::PriceOracle;
use crate::store::StockStore;
use crate::types::stock::{CreateStock, Stock, UpdateStock};

#[derive(Clone)]
pub struct StocksState {
    pub store: Arc<dyn StockStore>,
    pub oracle: Arc<dyn PriceOracle>,
}

pub fn stocks_router(state: StocksState) -> Router {
    Router::new()
        .route("/stocks", get(list_stocks).post(create_stock))
        .route(
            "/stocks/{id}",
            get(get_stock).put(update_stock).delete(delete_stock),
        )
        .route("/stock-value/{id}", get(stock_value))
        .route("/portfolio-value", get(portfolio_value))
        .with_state(state)
}

async fn create_stock(
    State(state): State<StocksState>,
    payload: Result<Json<CreateStock>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = payload.map_err(from_json_rejection)?;
    let stock = payload.into_stock()?;
    let id = stock.id.clone();
    state.store.insert(stock).await?;
    debug!(%id, "stock created");
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn list_stocks(State(state): State<StocksState>) -> Result<Json<Vec<Stock>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

async fn get_stock(
    State(state): State<StocksState>,
    Path(id): Path<String>,
) -> Result<Json<Stock>, ApiError> {
    match state.store.find(&id).await? {
        Some(stock) => Ok(Json(stock)),
        None => Err(ApiError::not_found()),
    }
}

async fn update_stock(
    State(state): State<StocksState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStock>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload.map_err(from_json_rejection)?;
    if payload.id != id {
        return Err(ApiError::bad_request("not allowed to change id"));
    }
    let stock = payload.into_stock()?;
    if !state.store.update(stock).await? {
        return Err(ApiError::not_found());
    }
    Ok(Json(json!({ "id": id })))
}

async fn delete_stock(
    State(state): State<StocksState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete(&id).await? {
        return Err(ApiError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn stock_value(
    State(state): State<StocksState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let stock = state.store.find(&id).await?.ok_or_else(ApiError::not_found)?;
    let price = state.oracle.price(&stock.symbol).await?;
    Ok(Json(json!({
        "symbol": stock.symbol,
        "ticker": round2(price),
        "stock value": round2(position_value(&stock, price)),
    })))
}

/// Total market value of every position in this store. Fails as a whole if
/// any price fetch fails; a partial sum would be worse than no answer.
async fn portfolio_value(State(state): State<StocksState>) -> Result<Json<Value>, ApiError> {
    let stocks = state.store.list().await?;
    let mut total = 0.0;
    for stock in &stocks {
        let price = state.oracle.price(&stock.symbol).await?;
        total += position_value(stock, price);
    }
    Ok(Json(json!({
        "date": chrono::Local::now().format("%d-%m-%Y").to_string(),
        "portfolio value": round2(total),
    })))
}
