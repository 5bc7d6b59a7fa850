//! Error types for order construction and submission.

use thiserror::Error;

use crate::types::OrderId;

/// Errors surfaced by order constructors and [`crate::OrderBook::process`].
///
/// Market-condition outcomes (FOK infeasible, IOC leftover, thin liquidity) are
/// not errors; they are reported through [`crate::ExecutionReport`] fields.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum OrderBookError {
    #[error("invalid order quantity")]
    InvalidQuantity,

    #[error("invalid order price")]
    InvalidPrice,

    #[error("invalid time in force")]
    InvalidTimeInForce,

    #[error("order {0} already exists")]
    OrderExists(OrderId),
}
