//! HTTP layer: routers for the stocks service and the capital gains service.

pub mod capital_gains;
pub mod error;
pub mod stocks;
