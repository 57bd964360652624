//! Postgres backend: pool, migrations, and row mapping.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

use super::{StockStore, StoreError};
use crate::types::stock::Stock;

/// Create a pool from a database URL and run migrations.
pub async fn create_pool_and_migrate(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

#[derive(Debug, FromRow)]
struct StockRow {
    id: String,
    name: String,
    symbol: String,
    purchase_price: f64,
    purchase_date: String,
    shares: i64,
}

impl From<StockRow> for Stock {
    fn from(row: StockRow) -> Self {
        Stock {
            id: row.id,
            name: row.name,
            symbol: row.symbol,
            purchase_price: row.purchase_price,
            purchase_date: row.purchase_date,
            shares: row.shares,
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        Ok(Self::new(create_pool_and_migrate(database_url).await?))
    }
}

/// Map the symbol unique-index violation to DuplicateSymbol.
fn map_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateSymbol,
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl StockStore for PgStore {
    async fn insert(&self, stock: Stock) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO stocks (id, name, symbol, purchase_price, purchase_date, shares) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&stock.id)
        .bind(&stock.name)
        .bind(&stock.symbol)
        .bind(stock.purchase_price)
        .bind(&stock.purchase_date)
        .bind(stock.shares)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Stock>, StoreError> {
        let rows = sqlx::query_as::<_, StockRow>(
            "SELECT id, name, symbol, purchase_price, purchase_date, shares \
             FROM stocks ORDER BY inserted_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Stock::from).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<Stock>, StoreError> {
        let row = sqlx::query_as::<_, StockRow>(
            "SELECT id, name, symbol, purchase_price, purchase_date, shares \
             FROM stocks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Stock::from))
    }

    async fn update(&self, stock: Stock) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE stocks SET name = $2, symbol = $3, purchase_price = $4, \
             purchase_date = $5, shares = $6 WHERE id = $1",
        )
        .bind(&stock.id)
        .bind(&stock.name)
        .bind(&stock.symbol)
        .bind(stock.purchase_price)
        .bind(&stock.purchase_date)
        .bind(stock.shares)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM stocks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
