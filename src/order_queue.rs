//! FIFO queue of resting orders at one exact price.
//!
//! Holds order ids only; the book's registry owns the order records, so an
//! in-place partial fill is visible through every index that references the id.
//! The cached volume always equals the sum of the members' remaining
//! quantities; callers adjust it alongside every quantity mutation.

use rust_decimal::Decimal;
use std::collections::VecDeque;

use crate::order::Order;
use crate::types::OrderId;

/// One price level: arrival-ordered ids plus cached aggregate volume.
#[derive(Clone, Debug)]
pub struct OrderQueue {
    price: Decimal,
    volume: Decimal,
    orders: VecDeque<OrderId>,
}

impl OrderQueue {
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            volume: Decimal::ZERO,
            orders: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Sum of remaining quantities of all orders in the queue.
    pub fn volume(&self) -> Decimal {
        self.volume
    }

    /// Adds an order to the tail of the queue.
    pub fn append(&mut self, order: &Order) {
        self.volume += order.quantity();
        self.orders.push_back(order.id().clone());
    }

    /// The longest-resting order at this price.
    pub fn head(&self) -> Option<&OrderId> {
        self.orders.front()
    }

    /// Subtracts a partial fill from the cached volume. The filled order keeps
    /// its queue position.
    pub fn reduce_volume(&mut self, amount: Decimal) {
        self.volume -= amount;
    }

    /// Splices the order out of the queue. Levels are typically shallow, so a
    /// linear scan is fine. Returns false if the id is not a member.
    pub fn remove(&mut self, order: &Order) -> bool {
        let Some(index) = self.orders.iter().position(|id| id == order.id()) else {
            return false;
        };
        self.orders.remove(index);
        self.volume -= order.quantity();
        true
    }

    /// Pops every id front-to-back and zeroes the volume. Used for wholesale
    /// stop activation.
    pub fn drain(&mut self) -> Vec<OrderId> {
        self.volume = Decimal::ZERO;
        self.orders.drain(..).collect()
    }
}
