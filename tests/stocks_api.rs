//! Stocks service integration tests: CRUD surface and request validation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use stock_portfolio::api::stocks::{stocks_router, StocksState};
use stock_portfolio::pricing::HttpPriceOracle;
use stock_portfolio::store::{MemoryStore, StockStore};

/// Spawn an app on a random port and return its base url.
async fn spawn_app(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Stub price provider serving fixed prices at /stockprice?ticker=.
async fn spawn_oracle(prices: &[(&str, f64)]) -> String {
    let prices: Arc<HashMap<String, f64>> =
        Arc::new(prices.iter().map(|(s, p)| (s.to_string(), *p)).collect());
    let app = Router::new().route(
        "/stockprice",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let prices = prices.clone();
            async move {
                let ticker = params.get("ticker").cloned().unwrap_or_default();
                match prices.get(&ticker) {
                    Some(price) => {
                        (StatusCode::OK, Json(json!({ "price": price }))).into_response()
                    }
                    None => (
                        StatusCode::NOT_FOUND,
                        Json(json!({ "error": "unknown ticker" })),
                    )
                        .into_response(),
                }
            }
        }),
    );
    spawn_app(app).await
}

async fn spawn_stocks(oracle_url: &str) -> String {
    let store: Arc<dyn StockStore> = Arc::new(MemoryStore::new());
    let oracle =
        Arc::new(HttpPriceOracle::new(oracle_url, "test-key", Duration::from_secs(5)).unwrap());
    spawn_app(stocks_router(StocksState { store, oracle })).await
}

fn sample_stocks() -> Vec<serde_json::Value> {
    vec![
        json!({ "symbol": "NVDA", "purchase price": 134.66, "shares": 7 }),
        json!({ "symbol": "AAPL", "purchase price": 183.63, "shares": 19 }),
        json!({ "symbol": "GOOG", "purchase price": 140.12, "shares": 14 }),
    ]
}

#[tokio::test]
async fn post_three_stocks_then_list_returns_three_with_distinct_ids() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for stock in sample_stocks() {
        let res = client
            .post(format!("{}/stocks", base_url))
            .json(&stock)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 201);
        let json: serde_json::Value = res.json().await.unwrap();
        ids.push(json.get("id").unwrap().as_str().unwrap().to_string());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3, "ids are not unique");

    let res = client
        .get(format!("{}/stocks", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let listed: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(listed.len(), 3);
    for stock in &listed {
        assert!(stock.get("_id").and_then(|v| v.as_str()).is_some());
    }
}

#[tokio::test]
async fn post_missing_symbol_returns_400_and_creates_nothing() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "purchase price": 134.66, "shares": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json.get("error").unwrap().as_str().unwrap().contains("symbol"));

    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/stocks", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn post_wrong_typed_shares_returns_400() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "symbol": "NVDA", "purchase price": 134.66, "shares": "seven" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn post_non_json_body_returns_415() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .header("content-type", "text/plain")
        .body("symbol=NVDA")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 415);
    let json: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        json.get("error").unwrap().as_str().unwrap(),
        "Expected json media type"
    );
}

#[tokio::test]
async fn post_duplicate_symbol_returns_400() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let stock = json!({ "symbol": "NVDA", "purchase price": 134.66, "shares": 7 });
    let r1 = client
        .post(format!("{}/stocks", base_url))
        .json(&stock)
        .send()
        .await
        .unwrap();
    assert_eq!(r1.status().as_u16(), 201);

    // Same symbol in lowercase still collides after normalization.
    let r2 = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "symbol": "nvda", "purchase price": 120.0, "shares": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(r2.status().as_u16(), 400);
    let json: serde_json::Value = r2.json().await.unwrap();
    assert!(json.get("error").unwrap().as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn post_applies_defaults_rounding_and_symbol_case() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "symbol": "nvda", "purchase price": 134.666, "shares": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 201);
    let id = res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let stock: serde_json::Value = client
        .get(format!("{}/stocks/{}", base_url, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stock["symbol"], "NVDA");
    assert_eq!(stock["name"], "NA");
    assert_eq!(stock["purchase date"], "NA");
    assert_eq!(stock["purchase price"], 134.67);
    assert_eq!(stock["shares"], 7);
}

#[tokio::test]
async fn post_non_positive_shares_returns_400() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "symbol": "NVDA", "purchase price": 134.66, "shares": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn get_unknown_stock_returns_404() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/stocks/no-such-id", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn put_replaces_all_fields() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "symbol": "NVDA", "purchase price": 134.66, "shares": 7 }))
        .send()
        .await
        .unwrap();
    let id = res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .put(format!("{}/stocks/{}", base_url, id))
        .json(&json!({
            "id": id,
            "name": "NVIDIA Corp",
            "symbol": "NVDA",
            "purchase price": 120.005,
            "purchase date": "18-06-2024",
            "shares": 10,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(
        res.json::<serde_json::Value>().await.unwrap()["id"],
        json!(id)
    );

    let stock: serde_json::Value = client
        .get(format!("{}/stocks/{}", base_url, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stock["name"], "NVIDIA Corp");
    assert_eq!(stock["purchase date"], "18-06-2024");
    assert_eq!(stock["shares"], 10);
}

#[tokio::test]
async fn put_id_mismatch_returns_400() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "symbol": "NVDA", "purchase price": 134.66, "shares": 7 }))
        .send()
        .await
        .unwrap();
    let id = res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .put(format!("{}/stocks/{}", base_url, id))
        .json(&json!({
            "id": "some-other-id",
            "name": "NA",
            "symbol": "NVDA",
            "purchase price": 134.66,
            "purchase date": "NA",
            "shares": 7,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json.get("error").unwrap().as_str().unwrap().contains("id"));
}

#[tokio::test]
async fn put_missing_field_returns_400() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "symbol": "NVDA", "purchase price": 134.66, "shares": 7 }))
        .send()
        .await
        .unwrap();
    let id = res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // No purchase date: PUT is a full replacement, every field is required.
    let res = client
        .put(format!("{}/stocks/{}", base_url, id))
        .json(&json!({
            "id": id,
            "name": "NA",
            "symbol": "NVDA",
            "purchase price": 134.66,
            "shares": 7,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn put_unknown_id_returns_404() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/stocks/no-such-id", base_url))
        .json(&json!({
            "id": "no-such-id",
            "name": "NA",
            "symbol": "NVDA",
            "purchase price": 134.66,
            "purchase date": "NA",
            "shares": 7,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_removes_stock() {
    let oracle_url = spawn_oracle(&[]).await;
    let base_url = spawn_stocks(&oracle_url).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/stocks", base_url))
        .json(&json!({ "symbol": "NVDA", "purchase price": 134.66, "shares": 7 }))
        .send()
        .await
        .unwrap();
    let id = res.json::<serde_json::Value>().await.unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .delete(format!("{}/stocks/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 204);

    let res = client
        .get(format!("{}/stocks/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);

    // Deleting again is a 404 as well.
    let res = client
        .delete(format!("{}/stocks/{}", base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 404);
}
