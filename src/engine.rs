//! Single-entry matching engine facade.
//!
//! Wraps [`OrderBook`] so callers get one submission point with structured
//! logging and an optional audit trail, without touching the book internals.

use log::info;
use rust_decimal::Decimal;
use serde_json::json;

use crate::audit::{AuditEvent, AuditSink};
use crate::errors::OrderBookError;
use crate::execution::ExecutionReport;
use crate::order::Order;
use crate::order_book::{Depth, MarketCost, OrderBook};
use crate::types::{OrderId, Side};

/// Matching engine for one instrument.
///
/// Use [`Engine::submit`] to send orders; the engine runs matching and
/// returns the [`ExecutionReport`]. Use [`Engine::cancel`] for resting or
/// pending orders, and the query methods for read-only snapshots.
pub struct Engine {
    book: OrderBook,
    audit: Option<Box<dyn AuditSink>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            book: OrderBook::new(),
            audit: None,
        }
    }

    /// Engine whose book uses an explicit decimal scale for quote-mode
    /// conversions.
    pub fn with_scale(scale: u32) -> Self {
        Self {
            book: OrderBook::with_scale(scale),
            audit: None,
        }
    }

    /// Routes audit events (order_submit, order_cancel) to the given sink.
    pub fn set_audit(&mut self, sink: impl AuditSink + 'static) {
        self.audit = Some(Box::new(sink));
    }

    /// Submits an order: runs matching to completion and returns the report.
    pub fn submit(&mut self, order: Order) -> Result<ExecutionReport, OrderBookError> {
        info!(
            "order submitted id={} type={:?} side={:?} quantity={} price={}",
            order.id(),
            order.order_type(),
            order.side(),
            order.quantity(),
            order.price()
        );
        let resource = json!({
            "order_id": order.id().as_str(),
            "order_type": order.order_type(),
            "side": order.side(),
        });

        match self.book.process(order) {
            Ok(report) => {
                for leg in &report.trades {
                    info!(
                        "trade maker={} price={} quantity={}",
                        leg.order_id, leg.price, leg.quantity
                    );
                }
                info!(
                    "execution id={} processed={} left={} stored={} canceled={} activated={}",
                    report.order.id(),
                    report.processed,
                    report.left,
                    report.stored,
                    report.canceled.len(),
                    report.activated.len()
                );
                self.emit_audit("order_submit", Some(resource), "success");
                Ok(report)
            }
            Err(err) => {
                info!("order rejected: {}", err);
                self.emit_audit("order_submit", Some(resource), "rejected");
                Err(err)
            }
        }
    }

    /// Cancels a resting or pending order by id. Unknown ids are a no-op and
    /// return `None`.
    pub fn cancel(&mut self, id: &OrderId) -> Option<Order> {
        let canceled = self.book.cancel_order(id);
        let resource = json!({ "order_id": id.as_str() });
        match &canceled {
            Some(order) => {
                info!("order canceled id={} left={}", order.id(), order.quantity());
                self.emit_audit("order_cancel", Some(resource), "success");
            }
            None => {
                self.emit_audit("order_cancel", Some(resource), "not_found");
            }
        }
        canceled
    }

    /// Resident order (resting or pending stop) by id.
    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.book.order(id)
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.book.best_bid()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.book.best_ask()
    }

    /// Depth snapshot per side, best level first.
    pub fn depth(&self) -> Depth {
        self.book.depth()
    }

    /// Cost to fill `quantity` for an aggressor on `side` at current depth.
    pub fn market_cost(&self, side: Side, quantity: Decimal) -> MarketCost {
        self.book.market_cost(side, quantity)
    }

    pub fn resting_count(&self) -> usize {
        self.book.resting_count()
    }

    pub fn stop_count(&self) -> usize {
        self.book.stop_count()
    }

    fn emit_audit(&self, action: &str, resource: Option<serde_json::Value>, outcome: &str) {
        if let Some(sink) = &self.audit {
            sink.emit(&AuditEvent::now("engine", action, resource, outcome));
        }
    }
}
