//! Storage layer: the StockStore contract plus in-memory and Postgres backends.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::stock::Stock;

pub use memory::MemoryStore;
pub use postgres::{create_pool_and_migrate, PgStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Stock symbol already exists")]
    DuplicateSymbol,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Document-store contract for stock positions. Symbols are unique per
/// store; insert and update reject a symbol already held by another record.
#[async_trait]
pub trait StockStore: Send + Sync {
    async fn insert(&self, stock: Stock) -> Result<(), StoreError>;

    /// All records, in insertion order.
    async fn list(&self) -> Result<Vec<Stock>, StoreError>;

    async fn find(&self, id: &str) -> Result<Option<Stock>, StoreError>;

    /// Replace the record with `stock.id`. Returns false when no such record.
    async fn update(&self, stock: Stock) -> Result<bool, StoreError>;

    /// Returns false when no such record.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}
