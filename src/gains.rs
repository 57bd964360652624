//! Share-count filtering and gain math: ShareBounds, capital_gain, position_value.
//! Testable without HTTP.

use crate::types::stock::Stock;

/// Optional strict bounds on a position's share count. Both sides are
/// independent; when both are present they apply as a conjunction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareBounds {
    pub greater_than: Option<i64>,
    pub less_than: Option<i64>,
}

impl ShareBounds {
    pub fn accepts(&self, shares: i64) -> bool {
        self.greater_than.is_none_or(|bound| shares > bound)
            && self.less_than.is_none_or(|bound| shares < bound)
    }

    /// Retain the positions satisfying both active bounds, preserving order.
    pub fn apply(&self, mut stocks: Vec<Stock>) -> Vec<Stock> {
        stocks.retain(|stock| self.accepts(stock.shares));
        stocks
    }
}

/// Signed capital gain: (current_price - purchase_price) * shares.
/// Negative when the current price is below the purchase price.
pub fn capital_gain(stock: &Stock, current_price: f64) -> f64 {
    (current_price - stock.purchase_price) * stock.shares as f64
}

/// Market value of a position: current_price * shares.
pub fn position_value(stock: &Stock, current_price: f64) -> f64 {
    current_price * stock.shares as f64
}

/// Round half away from zero to 2 fractional digits.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
