//! In-memory backend: the default store and the one integration tests run on.

use std::sync::Arc;
use tokio::sync::RwLock;

use async_trait::async_trait;

use super::{StockStore, StoreError};
use crate::types::stock::Stock;

#[derive(Clone, Default)]
pub struct MemoryStore {
    stocks: Arc<RwLock<Vec<Stock>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockStore for MemoryStore {
    async fn insert(&self, stock: Stock) -> Result<(), StoreError> {
        let mut guard = self.stocks.write().await;
        if guard.iter().any(|s| s.symbol == stock.symbol) {
            return Err(StoreError::DuplicateSymbol);
        }
        guard.push(stock);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Stock>, StoreError> {
        Ok(self.stocks.read().await.clone())
    }

    async fn find(&self, id: &str) -> Result<Option<Stock>, StoreError> {
        Ok(self.stocks.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn update(&self, stock: Stock) -> Result<bool, StoreError> {
        let mut guard = self.stocks.write().await;
        if guard.iter().any(|s| s.symbol == stock.symbol && s.id != stock.id) {
            return Err(StoreError::DuplicateSymbol);
        }
        match guard.iter_mut().find(|s| s.id == stock.id) {
            Some(slot) => {
                *slot = stock;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut guard = self.stocks.write().await;
        let before = guard.len();
        guard.retain(|s| s.id != id);
        Ok(guard.len() < before)
    }
}
