//! Pending stop orders, grouped by exact trigger price.
//!
//! Activation is keyed on equality: a stop order fires only when a trade
//! prints at exactly its trigger price. A trade sequence that jumps over the
//! trigger leaves the order pending.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::order::Order;
use crate::order_queue::OrderQueue;
use crate::types::OrderId;

/// Trigger-price index of pending stop orders.
#[derive(Clone, Debug, Default)]
pub struct StopBook {
    prices: HashMap<Decimal, OrderQueue>,
    triggers: HashMap<OrderId, Decimal>,
}

impl StopBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending stop orders.
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn contains(&self, id: &OrderId) -> bool {
        self.triggers.contains_key(id)
    }

    /// Inserts a stop order under its trigger price. Idempotent: a duplicate
    /// id is ignored, not rejected. Returns whether the order was inserted.
    pub fn append(&mut self, order: &Order) -> bool {
        if self.triggers.contains_key(order.id()) {
            return false;
        }
        let price = order.stop_price();
        self.prices
            .entry(price)
            .or_insert_with(|| OrderQueue::new(price))
            .append(order);
        self.triggers.insert(order.id().clone(), price);
        true
    }

    /// Pops every order whose trigger equals `price` exactly, in arrival
    /// order. Returns their ids; the caller converts and re-books them.
    pub fn activate(&mut self, price: Decimal) -> Vec<OrderId> {
        let Some(mut queue) = self.prices.remove(&price) else {
            return Vec::new();
        };
        let ids = queue.drain();
        for id in &ids {
            self.triggers.remove(id);
        }
        ids
    }

    /// Removes a single pending order (manual cancel or OCO cascade).
    /// Returns false if the id is not pending.
    pub fn remove(&mut self, order: &Order) -> bool {
        let Some(price) = self.triggers.remove(order.id()) else {
            return false;
        };
        if let Some(queue) = self.prices.get_mut(&price) {
            queue.remove(order);
            if queue.is_empty() {
                self.prices.remove(&price);
            }
        }
        true
    }
}
