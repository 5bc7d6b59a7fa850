//! The matching core: registry, both side indices, stop index and OCO links.
//!
//! [`OrderBook::process`] runs one order to completion against resting
//! liquidity: price-time priority, partial fills, FOK/IOC handling, OCO
//! cascades and stop activation. One owned order record per id lives in the
//! registry; the side and stop indices hold ids only, so in-place quantity
//! updates are visible through every reference.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{HashMap, HashSet};

use crate::errors::OrderBookError;
use crate::execution::{ExecutionReport, TradeLeg};
use crate::order::Order;
use crate::order_side::OrderSide;
use crate::stop_book::StopBook;
use crate::types::{Level, OrderId, OrderType, Side, TimeInForce};

/// Decimal places for quote-mode conversions unless overridden with
/// [`OrderBook::with_scale`].
pub const DEFAULT_SCALE: u32 = 8;

/// Depth snapshot: price levels with aggregate volume, best level first.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Depth {
    pub asks: Vec<Level>,
    pub bids: Vec<Level>,
}

/// Estimated cost of taking `quantity` from current depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketCost {
    /// Sum of price × quantity over the levels a fill would consume. A
    /// partial total when `insufficient` is set.
    pub total: Decimal,
    /// True when resting depth runs out before the quantity is covered.
    pub insufficient: bool,
}

/// Single-instrument order book with stop orders and OCO linkage.
#[derive(Clone, Debug)]
pub struct OrderBook {
    /// Registry: the one owned record per resident order id, across the side
    /// indices and the stop index.
    orders: HashMap<OrderId, Order>,
    bids: OrderSide,
    asks: OrderSide,
    stop: StopBook,
    /// Ids whose OCO partner already completed; such an order is canceled on
    /// sight or wherever it rests.
    oco: HashSet<OrderId>,
    scale: u32,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_scale(DEFAULT_SCALE)
    }

    /// Book with an explicit decimal scale for quote-mode conversions.
    pub fn with_scale(scale: u32) -> Self {
        Self {
            orders: HashMap::new(),
            bids: OrderSide::bids(),
            asks: OrderSide::asks(),
            stop: StopBook::new(),
            oco: HashSet::new(),
            scale,
        }
    }

    /// Runs one order against the book and returns what happened.
    ///
    /// `Err` is reserved for contract violations: a non-positive market
    /// quantity or a duplicate limit id. Everything the market itself decides
    /// (partial fills, FOK kills, IOC leftovers) lands in the report.
    pub fn process(&mut self, order: Order) -> Result<ExecutionReport, OrderBookError> {
        match order.order_type() {
            OrderType::Market => self.process_market(order),
            OrderType::Limit => self.process_limit(order),
            OrderType::StopLimit => Ok(self.process_stop(order)),
        }
    }

    fn process_market(&mut self, mut order: Order) -> Result<ExecutionReport, OrderBookError> {
        if order.quantity() <= Decimal::ZERO {
            return Err(OrderBookError::InvalidQuantity);
        }
        let mut report = ExecutionReport::new(&order);
        let mut remaining = order.quantity();

        while remaining > Decimal::ZERO {
            let Some(best) = self.opposing(order.side()).best_price() else {
                break;
            };
            if order.is_quote() {
                let base = self.quote_to_base(remaining, best);
                if base <= Decimal::ZERO {
                    // Quote remainder smaller than one representable base unit
                    // at this level; it stays in `left`.
                    break;
                }
                let base_left = self.drain_level(order.side(), best, base, &mut report);
                remaining = self.base_to_quote(base_left, best);
            } else {
                remaining = self.drain_level(order.side(), best, remaining, &mut report);
            }
        }

        report.set_left(remaining);
        order.set_quantity(remaining);
        if remaining > Decimal::ZERO {
            order.cancel();
            report.append_canceled(order.id().clone());
        }
        report.order = order;
        Ok(report)
    }

    fn process_limit(&mut self, mut order: Order) -> Result<ExecutionReport, OrderBookError> {
        if self.orders.contains_key(order.id()) {
            return Err(OrderBookError::OrderExists(order.id().clone()));
        }

        let mut report = ExecutionReport::new(&order);

        if self.cancel_on_arrival(&mut order) {
            report.append_canceled(order.id().clone());
            report.order = order;
            return Ok(report);
        }

        if order.time_in_force() == TimeInForce::FOK
            && !self.opposing(order.side()).can_order_be_filled(
                order.side(),
                order.price(),
                order.quantity(),
            )
        {
            order.cancel();
            report.append_canceled(order.id().clone());
            report.order = order;
            return Ok(report);
        }

        let mut remaining = order.quantity();
        while remaining > Decimal::ZERO {
            let Some(best) = self.opposing(order.side()).best_price() else {
                break;
            };
            let crosses = match order.side() {
                Side::Buy => order.price() >= best,
                Side::Sell => order.price() <= best,
            };
            if !crosses {
                break;
            }
            remaining = self.drain_level(order.side(), best, remaining, &mut report);
        }

        report.set_left(remaining);

        if remaining > Decimal::ZERO {
            order.set_quantity(remaining);
            order.set_maker();
            self.store_limit(order.clone());
            report.stored = true;
            if order.time_in_force() == TimeInForce::IOC {
                let id = order.id().clone();
                if let Some(canceled) = self.cancel_order(&id) {
                    report.append_canceled(id);
                    order = canceled;
                }
                report.stored = false;
            }
        } else {
            // Fully filled on arrival: the partner loses.
            self.mark_partner_satisfied(&order, &mut report);
        }

        report.order = order;
        Ok(report)
    }

    fn process_stop(&mut self, mut order: Order) -> ExecutionReport {
        let mut report = ExecutionReport::new(&order);
        if self.cancel_on_arrival(&mut order) {
            report.append_canceled(order.id().clone());
            report.order = order;
            return report;
        }
        // Duplicate ids are ignored, not rejected.
        if !self.orders.contains_key(order.id()) && self.stop.append(&order) {
            self.orders.insert(order.id().clone(), order.clone());
        }
        report.order = order;
        report
    }

    /// Drains the resting level at `price` against `remaining`, FIFO. Fully
    /// consumed makers leave the book (cascading their OCO partner first);
    /// a partially consumed head keeps its position. Once the level has
    /// traded, every stop order triggered at exactly this price enters the
    /// book as a limit order.
    fn drain_level(
        &mut self,
        taker_side: Side,
        price: Decimal,
        mut remaining: Decimal,
        report: &mut ExecutionReport,
    ) -> Decimal {
        let maker_side = taker_side.opposite();
        let mut touched = false;

        while remaining > Decimal::ZERO {
            let Some(head_id) = self
                .side(maker_side)
                .queue_at(price)
                .and_then(|queue| queue.head())
                .cloned()
            else {
                break;
            };
            let Some(head) = self.orders.get(&head_id) else {
                break;
            };
            touched = true;
            let head_quantity = head.quantity();

            if remaining < head_quantity {
                report.add_trade(TradeLeg::new(head, remaining, price));
                if let Some(head) = self.orders.get_mut(&head_id) {
                    head.decrease_quantity(remaining);
                }
                if let Some(queue) = self.side_mut(maker_side).queue_at_mut(price) {
                    queue.reduce_volume(remaining);
                }
                remaining = Decimal::ZERO;
            } else {
                let partner = head.oco().cloned();
                if let Some(partner) = partner {
                    self.oco.insert(partner.clone());
                    self.cancel_oco_partner(&partner, report);
                }
                let Some(maker) = self.remove_from_books(&head_id) else {
                    break;
                };
                report.add_trade(TradeLeg::new(&maker, head_quantity, price));
                remaining -= head_quantity;
            }
        }

        if touched {
            for id in self.activate_stops(price) {
                report.append_activated(id);
            }
        }
        remaining
    }

    /// Converts every stop order triggered at exactly `price` into a limit
    /// order on its side. Returns the activated ids in arrival order.
    fn activate_stops(&mut self, price: Decimal) -> Vec<OrderId> {
        let ids = self.stop.activate(price);
        let mut activated = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(mut order) = self.orders.remove(&id) else {
                continue;
            };
            order.activate();
            order.set_maker();
            activated.push(order.id().clone());
            self.store_limit(order);
        }
        activated
    }

    /// Rests a limit order: side index plus registry. The caller has already
    /// flipped the role to maker.
    fn store_limit(&mut self, order: Order) {
        match order.side() {
            Side::Buy => self.bids.append(&order),
            Side::Sell => self.asks.append(&order),
        }
        self.orders.insert(order.id().clone(), order);
    }

    /// Handles an arriving order whose own id was marked by a completed OCO
    /// partner: cancels it before any matching attempt.
    fn cancel_on_arrival(&mut self, order: &mut Order) -> bool {
        if order.oco().is_none() {
            return false;
        }
        if !self.oco.remove(order.id()) {
            return false;
        }
        order.cancel();
        true
    }

    /// Marks the completed order's partner as satisfied and cancels it
    /// wherever it currently rests.
    fn mark_partner_satisfied(&mut self, order: &Order, report: &mut ExecutionReport) {
        let Some(partner) = order.oco().cloned() else {
            return;
        };
        self.oco.insert(partner.clone());
        self.cancel_oco_partner(&partner, report);
    }

    /// A cascade miss (partner not resident) is a no-op; the satisfied mark
    /// stays and catches the partner on arrival.
    fn cancel_oco_partner(&mut self, id: &OrderId, report: &mut ExecutionReport) {
        if let Some(mut canceled) = self.remove_from_books(id) {
            canceled.cancel();
            self.oco.remove(id);
            report.append_canceled(canceled.id().clone());
        }
    }

    /// Removes an order from the registry and from whichever index holds it.
    fn remove_from_books(&mut self, id: &OrderId) -> Option<Order> {
        let order = self.orders.remove(id)?;
        match order.order_type() {
            OrderType::StopLimit => {
                self.stop.remove(&order);
            }
            _ => {
                self.side_mut(order.side()).remove(&order);
            }
        }
        Some(order)
    }

    /// Cancels a resident order by id, whichever book holds it. Unknown or
    /// already-removed ids return `None`; nothing changes.
    pub fn cancel_order(&mut self, id: &OrderId) -> Option<Order> {
        let mut order = self.remove_from_books(id)?;
        order.cancel();
        Some(order)
    }

    /// Looks up a resident order (resting or pending stop) by id.
    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    /// Number of resting limit orders across both sides.
    pub fn resting_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    /// Number of pending stop orders.
    pub fn stop_count(&self) -> usize {
        self.stop.len()
    }

    pub(crate) fn oco_marks(&self) -> usize {
        self.oco.len()
    }

    /// Depth snapshot per side, best level first.
    pub fn depth(&self) -> Depth {
        Depth {
            asks: self
                .asks
                .levels()
                .map(|q| Level {
                    price: q.price(),
                    volume: q.volume(),
                })
                .collect(),
            bids: self
                .bids
                .levels()
                .map(|q| Level {
                    price: q.price(),
                    volume: q.volume(),
                })
                .collect(),
        }
    }

    /// Total cost to fill `quantity` for an aggressor on `side` against
    /// current depth. Exhausted depth yields the partial total plus the
    /// insufficient flag instead of an error.
    pub fn market_cost(&self, side: Side, quantity: Decimal) -> MarketCost {
        let book_side = self.opposing(side);
        let mut remaining = quantity;
        let mut total = Decimal::ZERO;
        let mut level = book_side.best_queue();

        while remaining > Decimal::ZERO {
            let Some(queue) = level else {
                break;
            };
            if remaining >= queue.volume() {
                total += queue.price() * queue.volume();
                remaining -= queue.volume();
                level = book_side.next_level(queue.price());
            } else {
                total += queue.price() * remaining;
                remaining = Decimal::ZERO;
            }
        }

        MarketCost {
            total,
            insufficient: remaining > Decimal::ZERO,
        }
    }

    fn quote_to_base(&self, quantity: Decimal, price: Decimal) -> Decimal {
        (quantity / price).round_dp_with_strategy(self.scale, RoundingStrategy::ToZero)
    }

    fn base_to_quote(&self, quantity: Decimal, price: Decimal) -> Decimal {
        (quantity * price).round_dp_with_strategy(self.scale, RoundingStrategy::ToZero)
    }

    fn side(&self, side: Side) -> &OrderSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut OrderSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn opposing(&self, side: Side) -> &OrderSide {
        match side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn limit(id: &str, side: Side, qty: i64, price: i64) -> Order {
        Order::limit(id, side, dec(qty), dec(price), TimeInForce::GTC, None).unwrap()
    }

    fn limit_tif(id: &str, side: Side, qty: i64, price: i64, tif: TimeInForce) -> Order {
        Order::limit(id, side, dec(qty), dec(price), tif, None).unwrap()
    }

    fn limit_oco(id: &str, side: Side, qty: i64, price: i64, oco: &str) -> Order {
        Order::limit(id, side, dec(qty), dec(price), TimeInForce::GTC, Some(oco.into())).unwrap()
    }

    /// Bids at 50..90, asks at 100..140, `qty` each, 10 apart.
    fn add_depth(book: &mut OrderBook, prefix: &str, qty: i64) {
        for price in (50..100).step_by(10) {
            book.process(limit(&format!("{prefix}buy-{price}"), Side::Buy, qty, price))
                .unwrap();
        }
        for price in (100..150).step_by(10) {
            book.process(limit(&format!("{prefix}sell-{price}"), Side::Sell, qty, price))
                .unwrap();
        }
    }

    fn assert_conserved(report: &ExecutionReport) {
        assert_eq!(
            report.quantity,
            report.processed + report.left,
            "conservation violated: {:?}",
            report
        );
    }

    // Scenario: empty book; sell 10@10 rests; buy 5@10 takes half of it.
    #[test]
    fn partial_fill_of_resting_order() {
        let mut book = OrderBook::new();
        let rested = book.process(limit("S", Side::Sell, 10, 10)).unwrap();
        assert!(rested.stored);
        assert_eq!(rested.left, dec(10));
        assert_eq!(rested.processed, Decimal::ZERO);
        assert_conserved(&rested);

        let report = book.process(limit("B", Side::Buy, 5, 10)).unwrap();
        assert_eq!(report.processed, dec(5));
        assert_eq!(report.left, Decimal::ZERO);
        assert!(!report.stored);
        assert_eq!(report.trades.len(), 1);
        let leg = &report.trades[0];
        assert_eq!(leg.order_id, OrderId::new("S"));
        assert_eq!(leg.quantity, dec(5));
        assert_eq!(leg.price, dec(10));
        assert_eq!(leg.role, Role::Maker);
        assert_conserved(&report);

        let resting = book.order(&"S".into()).unwrap();
        assert_eq!(resting.quantity(), dec(5), "remainder visible through registry");
    }

    // Scenario: continuing, a market buy for 10 finds only 5 and cancels.
    #[test]
    fn market_order_with_thin_liquidity_cancels_remainder() {
        let mut book = OrderBook::new();
        book.process(limit("S", Side::Sell, 10, 10)).unwrap();
        book.process(limit("B", Side::Buy, 5, 10)).unwrap();

        let report = book
            .process(Order::market("M", Side::Buy, dec(10)).unwrap())
            .unwrap();
        assert_eq!(report.processed, dec(5));
        assert_eq!(report.left, dec(5));
        assert!(report.order.is_canceled());
        assert_eq!(report.canceled, vec![OrderId::new("M")]);
        assert!(!report.stored);
        assert_conserved(&report);
        assert!(book.order(&"M".into()).is_none(), "market orders never rest");
    }

    // Scenario: five ask levels totaling 10; FOK buy for 11 is infeasible.
    #[test]
    fn fok_infeasible_kills_without_trades() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "", 2);

        let report = book
            .process(limit_tif("order-b100", Side::Buy, 11, 100, TimeInForce::FOK))
            .unwrap();
        assert!(report.trades.is_empty());
        assert!(report.order.is_canceled());
        assert_eq!(report.left, dec(11));
        assert_eq!(report.processed, Decimal::ZERO);
        assert_conserved(&report);
        assert_eq!(book.best_ask(), Some(dec(100)), "book untouched");

        let report = book
            .process(limit_tif("order-s100", Side::Sell, 11, 100, TimeInForce::FOK))
            .unwrap();
        assert!(report.trades.is_empty());
        assert!(report.order.is_canceled());
        assert_eq!(report.left, dec(11));
    }

    #[test]
    fn fok_feasible_fills_entirely() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "", 2);

        let report = book
            .process(limit_tif("order-b", Side::Buy, 10, 140, TimeInForce::FOK))
            .unwrap();
        assert_eq!(report.processed, dec(10));
        assert_eq!(report.left, Decimal::ZERO);
        assert_eq!(report.trades.len(), 5);
        assert!(!report.order.is_canceled());
    }

    #[test]
    fn ioc_remainder_does_not_rest() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "", 2);

        let report = book
            .process(limit_tif("order-ioc", Side::Buy, 11, 200, TimeInForce::IOC))
            .unwrap();
        assert_eq!(report.processed, dec(10));
        assert_eq!(report.left, dec(1));
        assert_eq!(report.canceled, vec![OrderId::new("order-ioc")]);
        assert!(!report.stored);
        assert_conserved(&report);
        assert!(book.order(&"order-ioc".into()).is_none());
        assert!(book.best_ask().is_none(), "all asks consumed");
    }

    #[test]
    fn ioc_full_fill_is_not_canceled() {
        let mut book = OrderBook::new();
        book.process(limit("s1", Side::Sell, 5, 100)).unwrap();
        let report = book
            .process(limit_tif("ioc", Side::Buy, 5, 100, TimeInForce::IOC))
            .unwrap();
        assert_eq!(report.processed, dec(5));
        assert!(report.canceled.is_empty());
        assert!(!report.stored);
    }

    #[test]
    fn resting_limit_reports_left_and_stored() {
        let mut book = OrderBook::new();
        for price in (50..100).step_by(10) {
            let report = book
                .process(limit(&format!("buy-{price}"), Side::Buy, 2, price))
                .unwrap();
            assert!(report.trades.is_empty());
            assert!(report.stored);
            assert_eq!(report.left, dec(2));
            assert_eq!(report.order.role(), Role::Maker);
            assert_conserved(&report);
        }
        assert_eq!(book.best_bid(), Some(dec(90)));
        assert_eq!(book.resting_count(), 5);
    }

    #[test]
    fn limit_walks_levels_in_price_order() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "", 2);

        // Take one unit off the best ask first.
        let report = book.process(limit("order-b100", Side::Buy, 1, 100)).unwrap();
        assert_eq!(report.processed, dec(1));
        assert!(!report.stored);

        // 9 left across asks; a buy for 10 at 150 sweeps them and rests 1.
        let report = book.process(limit("order-b150", Side::Buy, 10, 150)).unwrap();
        assert_eq!(report.trades.len(), 5);
        assert_eq!(report.processed, dec(9));
        assert_eq!(report.left, dec(1));
        assert!(report.stored);
        assert_conserved(&report);
        assert_eq!(book.best_bid(), Some(dec(150)));
    }

    #[test]
    fn duplicate_limit_id_is_rejected_without_side_effects() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "", 2);
        let err = book
            .process(limit("buy-70", Side::Sell, 11, 40))
            .unwrap_err();
        assert_eq!(err, OrderBookError::OrderExists("buy-70".into()));
        assert_eq!(book.resting_count(), 10);
    }

    #[test]
    fn time_priority_within_level() {
        let mut book = OrderBook::new();
        book.process(limit("first", Side::Sell, 5, 100)).unwrap();
        book.process(limit("second", Side::Sell, 5, 100)).unwrap();

        // Partial fill hits the longest-resting order and keeps it at head.
        let report = book.process(limit("b1", Side::Buy, 3, 100)).unwrap();
        assert_eq!(report.trades[0].order_id, OrderId::new("first"));
        assert_eq!(book.order(&"first".into()).unwrap().quantity(), dec(2));

        let report = book.process(limit("b2", Side::Buy, 3, 100)).unwrap();
        assert_eq!(report.trades[0].order_id, OrderId::new("first"));
        assert_eq!(report.trades[0].quantity, dec(2));
        assert_eq!(report.trades[1].order_id, OrderId::new("second"));
        assert_eq!(report.trades[1].quantity, dec(1));
    }

    #[test]
    fn market_sell_sweeps_bids_and_cancels_leftover() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "", 2);

        let report = book
            .process(Order::market("order-sell-12", Side::Sell, dec(12)).unwrap())
            .unwrap();
        assert_eq!(report.trades.len(), 5);
        assert_eq!(report.processed, dec(10));
        assert_eq!(report.left, dec(2));
        assert!(report.order.is_canceled());
        assert_conserved(&report);
        assert!(book.best_bid().is_none());
    }

    #[test]
    fn market_buy_on_empty_book_cancels_in_full() {
        let mut book = OrderBook::new();
        let report = book
            .process(Order::market("m", Side::Buy, dec(10)).unwrap())
            .unwrap();
        assert!(report.trades.is_empty());
        assert_eq!(report.left, dec(10));
        assert_eq!(report.processed, Decimal::ZERO);
        assert!(report.order.is_canceled());
    }

    #[test]
    fn market_quote_buy_converts_through_level_price() {
        let mut book = OrderBook::new();
        book.process(limit("order-1", Side::Sell, 10, 10)).unwrap();

        let report = book
            .process(Order::market_quote("order-2", Side::Buy, dec(100)).unwrap())
            .unwrap();
        // 100 quote units at price 10 buy exactly the resting 10 base units.
        let leg = report.trade(&"order-1".into()).unwrap();
        assert_eq!(leg.quantity, dec(10));
        assert_eq!(report.left, Decimal::ZERO);
        assert_eq!(report.processed, dec(100));
        assert!(!report.order.is_canceled());
        assert_conserved(&report);
    }

    #[test]
    fn market_quote_buy_spans_levels() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "", 2);

        // 200 quote clears 2@100; the remaining 100 quote converts to a
        // partial 0.90909090 base fill at 110, which zeroes the remainder.
        let report = book
            .process(Order::market_quote("order-buy-3", Side::Buy, dec(300)).unwrap())
            .unwrap();
        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[0].quantity, dec(2));
        assert_eq!(report.trades[0].price, dec(100));
        assert_eq!(report.trades[1].price, dec(110));
        assert_eq!(report.left, Decimal::ZERO);
        assert_eq!(report.processed, dec(300));
        assert_conserved(&report);
    }

    #[test]
    fn market_zero_quantity_is_a_typed_error() {
        // Constructors reject this, but orders can also arrive deserialized.
        let json = r#"{
            "id": "m0", "order_type": "Market", "side": "Buy",
            "is_quote": false, "quantity": "0", "original_quantity": "0",
            "price": "0", "stop_price": "0", "time_in_force": "GTC",
            "oco": null, "canceled": false, "role": "Taker"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        let mut book = OrderBook::new();
        assert_eq!(
            book.process(order).unwrap_err(),
            OrderBookError::InvalidQuantity
        );
    }

    #[test]
    fn stop_order_rests_until_trigger_prints() {
        let mut book = OrderBook::new();
        let report = book
            .process(Order::stop_limit("stop-1", Side::Buy, dec(10), dec(10), dec(10), None).unwrap())
            .unwrap();
        assert!(!report.stored);
        assert!(report.trades.is_empty());
        assert_eq!(report.left, dec(10));
        assert_eq!(book.stop_count(), 1);
        assert!(book.order(&"stop-1".into()).is_some(), "visible via registry");

        // A trade at exactly 10 activates it onto the bid side.
        book.process(limit("order-limit-1", Side::Buy, 10, 10)).unwrap();
        let report = book.process(limit("order-limit-2", Side::Sell, 10, 10)).unwrap();
        assert_eq!(report.activated, vec![OrderId::new("stop-1")]);
        assert_eq!(book.stop_count(), 0);
        let activated = book.order(&"stop-1".into()).unwrap();
        assert!(activated.is_limit());
        assert_eq!(book.best_bid(), Some(dec(10)));
    }

    #[test]
    fn stop_does_not_fire_when_trigger_never_prints() {
        let mut book = OrderBook::new();
        book.process(Order::stop_limit("s", Side::Sell, dec(1), dec(90), dec(95), None).unwrap())
            .unwrap();
        book.process(limit("b", Side::Buy, 1, 100)).unwrap();
        book.process(limit("a", Side::Sell, 1, 100)).unwrap();
        // Traded at 100, trigger is 95: exact match only.
        assert_eq!(book.stop_count(), 1);
    }

    #[test]
    fn duplicate_stop_id_is_silently_ignored() {
        let mut book = OrderBook::new();
        book.process(Order::stop_limit("s", Side::Buy, dec(1), dec(10), dec(11), None).unwrap())
            .unwrap();
        let report = book
            .process(Order::stop_limit("s", Side::Buy, dec(5), dec(20), dec(21), None).unwrap())
            .unwrap();
        assert!(report.canceled.is_empty());
        assert_eq!(book.stop_count(), 1);
        assert_eq!(book.order(&"s".into()).unwrap().stop_price(), dec(11));
    }

    #[test]
    fn oco_completion_cancels_pending_stop_partner() {
        let mut book = OrderBook::new();
        book.process(limit_oco("oco-1", Side::Buy, 1, 100, "oco-2")).unwrap();
        book.process(
            Order::stop_limit("oco-2", Side::Buy, dec(1), dec(100), dec(101), Some("oco-1".into()))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(book.stop_count(), 1);

        let report = book.process(limit("simple-1", Side::Sell, 1, 100)).unwrap();
        assert_eq!(report.canceled, vec![OrderId::new("oco-2")]);
        assert_eq!(book.stop_count(), 0);
        assert!(book.order(&"oco-1".into()).is_none(), "fully matched");
        assert!(book.order(&"oco-2".into()).is_none(), "cascade-canceled");
    }

    #[test]
    fn oco_activated_stop_wins_and_cancels_resting_partner() {
        let mut book = OrderBook::new();
        book.process(
            Order::stop_limit("oco-2", Side::Buy, dec(1), dec(150), dec(101), Some("oco-1".into()))
                .unwrap(),
        )
        .unwrap();
        // Print a trade at 101 to activate the stop onto the bid side.
        book.process(limit("o1", Side::Sell, 1, 101)).unwrap();
        book.process(limit("o2", Side::Buy, 1, 101)).unwrap();

        book.process(limit_oco("oco-1", Side::Buy, 1, 100, "oco-2")).unwrap();

        // The activated oco-2 (bid at 150) fills first and cascades oco-1.
        let report = book.process(limit("simple-1", Side::Sell, 1, 100)).unwrap();
        assert!(report.trade(&"oco-2".into()).is_some());
        assert_eq!(report.canceled, vec![OrderId::new("oco-1")]);
        assert_eq!(book.oco_marks(), 0, "satisfied mark consumed by cascade");
        assert!(book.order(&"oco-1".into()).is_none());
    }

    #[test]
    fn oco_arrival_after_partner_completed_is_canceled_immediately() {
        let mut book = OrderBook::new();
        book.process(limit_oco("a", Side::Buy, 1, 100, "b")).unwrap();
        // Fill A completely; B has not arrived yet.
        book.process(limit("s", Side::Sell, 1, 100)).unwrap();

        let report = book.process(limit_oco("b", Side::Buy, 1, 90, "a")).unwrap();
        assert!(report.trades.is_empty());
        assert!(report.order.is_canceled());
        assert_eq!(report.canceled, vec![OrderId::new("b")]);
        assert!(!report.stored);
        assert_eq!(report.left, dec(1));
        assert!(book.order(&"b".into()).is_none());
    }

    #[test]
    fn oco_stop_arrival_after_partner_completed_is_canceled_immediately() {
        let mut book = OrderBook::new();
        book.process(limit_oco("a", Side::Buy, 1, 100, "b")).unwrap();
        book.process(limit("s", Side::Sell, 1, 100)).unwrap();

        let report = book
            .process(
                Order::stop_limit("b", Side::Sell, dec(1), dec(90), dec(95), Some("a".into()))
                    .unwrap(),
            )
            .unwrap();
        assert!(report.order.is_canceled());
        assert_eq!(report.canceled, vec![OrderId::new("b")]);
        assert_eq!(book.stop_count(), 0);
    }

    #[test]
    fn cancel_order_removes_from_either_book() {
        let mut book = OrderBook::new();
        book.process(limit("l", Side::Buy, 1, 100)).unwrap();
        book.process(Order::stop_limit("s", Side::Sell, dec(1), dec(90), dec(95), None).unwrap())
            .unwrap();

        let canceled = book.cancel_order(&"l".into()).unwrap();
        assert!(canceled.is_canceled());
        assert!(book.best_bid().is_none());

        let canceled = book.cancel_order(&"s".into()).unwrap();
        assert!(canceled.is_canceled());
        assert_eq!(book.stop_count(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut book = OrderBook::new();
        book.process(limit("l", Side::Buy, 1, 100)).unwrap();
        assert!(book.cancel_order(&"l".into()).is_some());
        assert!(book.cancel_order(&"l".into()).is_none());
        assert!(book.cancel_order(&"never-seen".into()).is_none());
        assert_eq!(book.resting_count(), 0);
        assert_eq!(book.depth().bids.len(), 0);
    }

    #[test]
    fn depth_lists_levels_best_first() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "", 2);
        let depth = book.depth();
        let ask_prices: Vec<Decimal> = depth.asks.iter().map(|l| l.price).collect();
        let bid_prices: Vec<Decimal> = depth.bids.iter().map(|l| l.price).collect();
        assert_eq!(ask_prices, vec![dec(100), dec(110), dec(120), dec(130), dec(140)]);
        assert_eq!(bid_prices, vec![dec(90), dec(80), dec(70), dec(60), dec(50)]);
        assert!(depth.asks.iter().all(|l| l.volume == dec(2)));
    }

    #[test]
    fn market_cost_walks_the_ladder() {
        let mut book = OrderBook::new();
        add_depth(&mut book, "05-", 10);
        add_depth(&mut book, "10-", 10);
        add_depth(&mut book, "15-", 10);

        let cost = book.market_cost(Side::Buy, dec(115));
        assert!(!cost.insufficient);
        assert_eq!(cost.total, dec(13150));

        let cost = book.market_cost(Side::Buy, dec(200));
        assert!(cost.insufficient);
        assert_eq!(cost.total, dec(18000));

        let cost = book.market_cost(Side::Sell, dec(115));
        assert!(!cost.insufficient);
        assert_eq!(cost.total, dec(8700));

        let cost = book.market_cost(Side::Sell, dec(200));
        assert!(cost.insufficient);
        assert_eq!(cost.total, dec(10500));
    }

    #[test]
    fn price_priority_across_sides() {
        let mut book = OrderBook::new();
        book.process(limit("b1", Side::Buy, 1, 90)).unwrap();
        book.process(limit("b2", Side::Buy, 1, 95)).unwrap();
        book.process(limit("a1", Side::Sell, 1, 110)).unwrap();
        book.process(limit("a2", Side::Sell, 1, 105)).unwrap();
        assert_eq!(book.best_bid(), Some(dec(95)));
        assert_eq!(book.best_ask(), Some(dec(105)));
    }

    #[test]
    fn activated_stop_can_fill_within_the_same_process_call() {
        let mut book = OrderBook::new();
        // Pending sell stop: trigger 100, limit 100.
        book.process(Order::stop_limit("stop", Side::Sell, dec(5), dec(100), dec(100), None).unwrap())
            .unwrap();
        book.process(limit("a", Side::Sell, 5, 100)).unwrap();

        // Buy 10@100: drains the ask level (printing 100, activating the
        // stop onto the ask side) and keeps draining into the activated order.
        let report = book.process(limit("big", Side::Buy, 10, 100)).unwrap();
        assert_eq!(report.activated, vec![OrderId::new("stop")]);
        assert_eq!(report.processed, dec(10));
        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[1].order_id, OrderId::new("stop"));
        assert!(book.order(&"stop".into()).is_none(), "activated and filled");
    }
}
