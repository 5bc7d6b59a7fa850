//! One side of the book: an ordered price index over FIFO level queues.
//!
//! Bids are traversed highest price first, asks lowest first. Levels are
//! created on the first resting order at a price and dropped as soon as they
//! empty; no empty level is ever retained.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::order::Order;
use crate::order_queue::OrderQueue;
use crate::types::Side;

/// Price-ordered index of [`OrderQueue`] levels for one side.
#[derive(Clone, Debug)]
pub struct OrderSide {
    side: Side,
    prices: BTreeMap<Decimal, OrderQueue>,
    num_orders: usize,
}

impl OrderSide {
    /// Index for resting buy orders (best = highest price).
    pub fn bids() -> Self {
        Self::new(Side::Buy)
    }

    /// Index for resting sell orders (best = lowest price).
    pub fn asks() -> Self {
        Self::new(Side::Sell)
    }

    fn new(side: Side) -> Self {
        Self {
            side,
            prices: BTreeMap::new(),
            num_orders: 0,
        }
    }

    /// Number of resting orders across all levels.
    pub fn len(&self) -> usize {
        self.num_orders
    }

    pub fn is_empty(&self) -> bool {
        self.num_orders == 0
    }

    /// Number of distinct price levels.
    pub fn depth(&self) -> usize {
        self.prices.len()
    }

    /// Appends a resting order to the level at its price, creating the level
    /// on first use.
    pub fn append(&mut self, order: &Order) {
        self.prices
            .entry(order.price())
            .or_insert_with(|| OrderQueue::new(order.price()))
            .append(order);
        self.num_orders += 1;
    }

    /// Removes a resting order, dropping its level if that empties it.
    /// Returns false (and changes nothing) if the order is not present.
    pub fn remove(&mut self, order: &Order) -> bool {
        let Some(queue) = self.prices.get_mut(&order.price()) else {
            return false;
        };
        if !queue.remove(order) {
            return false;
        }
        if queue.is_empty() {
            self.prices.remove(&order.price());
        }
        self.num_orders -= 1;
        true
    }

    /// Price of the best level: minimum for asks, maximum for bids.
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Buy => self.prices.keys().next_back().copied(),
            Side::Sell => self.prices.keys().next().copied(),
        }
    }

    /// Queue at the best price level.
    pub fn best_queue(&self) -> Option<&OrderQueue> {
        match self.side {
            Side::Buy => self.prices.values().next_back(),
            Side::Sell => self.prices.values().next(),
        }
    }

    /// Queue at an exact price.
    pub fn queue_at(&self, price: Decimal) -> Option<&OrderQueue> {
        self.prices.get(&price)
    }

    pub(crate) fn queue_at_mut(&mut self, price: Decimal) -> Option<&mut OrderQueue> {
        self.prices.get_mut(&price)
    }

    /// The level immediately after `price` in this side's traversal order:
    /// the next higher ask, or the next lower bid.
    pub fn next_level(&self, price: Decimal) -> Option<&OrderQueue> {
        match self.side {
            Side::Buy => self.prices.range(..price).next_back().map(|(_, q)| q),
            Side::Sell => self
                .prices
                .range((Bound::Excluded(price), Bound::Unbounded))
                .next()
                .map(|(_, q)| q),
        }
    }

    /// Levels in traversal order, best first.
    pub fn levels(&self) -> impl Iterator<Item = &OrderQueue> + '_ {
        let iter: Box<dyn Iterator<Item = &OrderQueue> + '_> = match self.side {
            Side::Buy => Box::new(self.prices.values().rev()),
            Side::Sell => Box::new(self.prices.values()),
        };
        iter
    }

    /// Non-mutating fill-feasibility scan for the FOK pre-check: accumulates
    /// volume from the best level toward `limit_price` (inclusive) and reports
    /// whether it reaches `quantity` before the price comparator fails.
    /// A buy taker accepts ask prices ≤ `limit_price`; a sell taker accepts
    /// bid prices ≥ `limit_price`.
    pub fn can_order_be_filled(
        &self,
        taker_side: Side,
        limit_price: Decimal,
        quantity: Decimal,
    ) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut volume = Decimal::ZERO;
        for level in self.levels() {
            let eligible = match taker_side {
                Side::Buy => level.price() <= limit_price,
                Side::Sell => level.price() >= limit_price,
            };
            if !eligible || volume >= quantity {
                break;
            }
            volume += level.volume();
        }
        volume >= quantity
    }
}
