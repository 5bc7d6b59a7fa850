//! Per-submission execution results.
//!
//! [`ExecutionReport`] is the outcome of one [`crate::OrderBook::process`]
//! call: the final snapshot of the submitted order, one [`TradeLeg`] per
//! counterparty fill, the ids canceled or activated along the way, and the
//! processed/left accounting. Decimals serialize as strings.

use rust_decimal::Decimal;

use crate::order::Order;
use crate::types::{OrderId, Role};

/// One side of one fill: the counterparty order, how much traded and at what
/// price, and whether that order was making or taking.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TradeLeg {
    pub order_id: OrderId,
    pub role: Role,
    pub price: Decimal,
    pub quantity: Decimal,
    pub is_quote: bool,
}

impl TradeLeg {
    pub(crate) fn new(order: &Order, quantity: Decimal, price: Decimal) -> Self {
        Self {
            order_id: order.id().clone(),
            role: order.role(),
            price,
            quantity,
            is_quote: order.is_quote(),
        }
    }
}

/// Result of processing one order.
///
/// `quantity` is the submitted (original) quantity and always equals
/// `processed + left`, for every outcome including zero-trade ones.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExecutionReport {
    /// Final snapshot of the submitted order (role and cancel flag reflect
    /// the outcome).
    pub order: Order,
    /// Maker legs consumed by this submission, in match order.
    pub trades: Vec<TradeLeg>,
    /// Ids canceled during this call (OCO cascades, IOC remainders, kills).
    pub canceled: Vec<OrderId>,
    /// Stop orders activated by trades printed during this call.
    pub activated: Vec<OrderId>,
    /// Original quantity of the submitted order.
    pub quantity: Decimal,
    /// Quantity that traded.
    pub processed: Decimal,
    /// Quantity that did not trade (resting, canceled, or unfillable).
    pub left: Decimal,
    /// Whether a remainder ended up resting on the book.
    pub stored: bool,
}

impl ExecutionReport {
    pub(crate) fn new(order: &Order) -> Self {
        Self {
            order: order.clone(),
            trades: Vec::new(),
            canceled: Vec::new(),
            activated: Vec::new(),
            quantity: order.original_quantity(),
            processed: Decimal::ZERO,
            left: order.original_quantity(),
            stored: false,
        }
    }

    /// Trade leg for a given counterparty id, if this submission crossed it.
    pub fn trade(&self, id: &OrderId) -> Option<&TradeLeg> {
        self.trades.iter().find(|leg| &leg.order_id == id)
    }

    pub(crate) fn add_trade(&mut self, leg: TradeLeg) {
        self.trades.push(leg);
    }

    pub(crate) fn append_canceled(&mut self, id: OrderId) {
        self.canceled.push(id);
    }

    pub(crate) fn append_activated(&mut self, id: OrderId) {
        self.activated.push(id);
    }

    /// Records the unfilled remainder; `processed` follows by conservation.
    pub(crate) fn set_left(&mut self, left: Decimal) {
        self.left = left;
        self.processed = self.quantity - left;
    }
}
