use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::gains::round2;

/// One purchased stock lot. Serialized field names follow the wire format
/// (`_id`, `purchase price`, `purchase date`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "purchase price")]
    pub purchase_price: f64,
    #[serde(rename = "purchase date")]
    pub purchase_date: String,
    pub shares: i64,
}

/// Body of `POST /stocks`. `name` and `purchase date` default to "NA".
#[derive(Debug, Deserialize)]
pub struct CreateStock {
    pub symbol: String,
    #[serde(rename = "purchase price")]
    pub purchase_price: f64,
    pub shares: i64,
    pub name: Option<String>,
    #[serde(rename = "purchase date")]
    pub purchase_date: Option<String>,
}

/// Body of `PUT /stocks/{id}`: full replacement, every field required.
#[derive(Debug, Deserialize)]
pub struct UpdateStock {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(rename = "purchase price")]
    pub purchase_price: f64,
    #[serde(rename = "purchase date")]
    pub purchase_date: String,
    pub shares: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field symbol must be a non-empty string")]
    EmptySymbol,
    #[error("field purchase price must be non-negative")]
    NegativePrice,
    #[error("field shares must be a positive integer")]
    NonPositiveShares,
}

fn validate(symbol: &str, purchase_price: f64, shares: i64) -> Result<(), ValidationError> {
    if symbol.trim().is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    if purchase_price < 0.0 {
        return Err(ValidationError::NegativePrice);
    }
    if shares <= 0 {
        return Err(ValidationError::NonPositiveShares);
    }
    Ok(())
}

impl CreateStock {
    /// Build a record with a fresh id. Symbol is upper-cased and the
    /// purchase price rounded to 2 fractional digits on write.
    pub fn into_stock(self) -> Result<Stock, ValidationError> {
        validate(&self.symbol, self.purchase_price, self.shares)?;
        Ok(Stock {
            id: Uuid::new_v4().to_string(),
            name: self.name.unwrap_or_else(|| "NA".to_string()),
            symbol: self.symbol.to_uppercase(),
            purchase_price: round2(self.purchase_price),
            purchase_date: self.purchase_date.unwrap_or_else(|| "NA".to_string()),
            shares: self.shares,
        })
    }
}

impl UpdateStock {
    /// Build the replacement record, keeping the existing id.
    pub fn into_stock(self) -> Result<Stock, ValidationError> {
        validate(&self.symbol, self.purchase_price, self.shares)?;
        Ok(Stock {
            id: self.id,
            name: self.name,
            symbol: self.symbol.to_uppercase(),
            purchase_price: round2(self.purchase_price),
            purchase_date: self.purchase_date,
            shares: self.shares,
        })
    }
}
