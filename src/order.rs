//! The order record.
//!
//! Identity and type fields are fixed at construction; remaining quantity, the
//! cancel flag and the maker/taker role mutate as the order moves through the
//! book. Constructors validate their input and return `Err` instead of
//! producing an order the book could not honor.

use rust_decimal::Decimal;

use crate::errors::OrderBookError;
use crate::types::{OrderId, OrderType, Role, Side, TimeInForce};

/// A single order. Create with [`Order::market`], [`Order::market_quote`],
/// [`Order::limit`] or [`Order::stop_limit`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Order {
    id: OrderId,
    order_type: OrderType,
    side: Side,
    is_quote: bool,
    quantity: Decimal,
    original_quantity: Decimal,
    price: Decimal,
    stop_price: Decimal,
    time_in_force: TimeInForce,
    oco: Option<OrderId>,
    canceled: bool,
    role: Role,
}

impl Order {
    /// Market order: takes the best available liquidity until filled or the
    /// opposing side is empty. Never rests.
    pub fn market(
        id: impl Into<OrderId>,
        side: Side,
        quantity: Decimal,
    ) -> Result<Order, OrderBookError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderBookError::InvalidQuantity);
        }
        Ok(Order {
            id: id.into(),
            order_type: OrderType::Market,
            side,
            is_quote: false,
            quantity,
            original_quantity: quantity,
            price: Decimal::ZERO,
            stop_price: Decimal::ZERO,
            time_in_force: TimeInForce::default(),
            oco: None,
            canceled: false,
            role: Role::Taker,
        })
    }

    /// Market order with `quantity` denominated in the counter (quote)
    /// currency instead of base units.
    pub fn market_quote(
        id: impl Into<OrderId>,
        side: Side,
        quantity: Decimal,
    ) -> Result<Order, OrderBookError> {
        let mut order = Order::market(id, side, quantity)?;
        order.is_quote = true;
        Ok(order)
    }

    /// Limit order at `price`, optionally linked to an OCO partner.
    pub fn limit(
        id: impl Into<OrderId>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
        oco: Option<OrderId>,
    ) -> Result<Order, OrderBookError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderBookError::InvalidQuantity);
        }
        if price <= Decimal::ZERO {
            return Err(OrderBookError::InvalidPrice);
        }
        Ok(Order {
            id: id.into(),
            order_type: OrderType::Limit,
            side,
            is_quote: false,
            quantity,
            original_quantity: quantity,
            price,
            stop_price: Decimal::ZERO,
            time_in_force,
            oco,
            canceled: false,
            role: Role::Taker,
        })
    }

    /// Stop-limit order: rests in the stop book until a trade prints at
    /// exactly `stop_price`, then enters the book as a limit order at `price`.
    pub fn stop_limit(
        id: impl Into<OrderId>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
        oco: Option<OrderId>,
    ) -> Result<Order, OrderBookError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderBookError::InvalidQuantity);
        }
        if price <= Decimal::ZERO || stop_price <= Decimal::ZERO {
            return Err(OrderBookError::InvalidPrice);
        }
        Ok(Order {
            id: id.into(),
            order_type: OrderType::StopLimit,
            side,
            is_quote: false,
            quantity,
            original_quantity: quantity,
            price,
            stop_price,
            time_in_force: TimeInForce::default(),
            oco,
            canceled: false,
            role: Role::Taker,
        })
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// True if the quantity is denominated in the counter currency.
    pub fn is_quote(&self) -> bool {
        self.is_quote
    }

    /// Remaining (unfilled) quantity.
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Quantity at construction time.
    pub fn original_quantity(&self) -> Decimal {
        self.original_quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn stop_price(&self) -> Decimal {
        self.stop_price
    }

    pub fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    /// Id of the linked one-cancels-other partner, if any.
    pub fn oco(&self) -> Option<&OrderId> {
        self.oco.as_ref()
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market
    }

    pub fn is_limit(&self) -> bool {
        self.order_type == OrderType::Limit
    }

    pub fn is_stop(&self) -> bool {
        self.order_type == OrderType::StopLimit
    }

    pub(crate) fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
    }

    pub(crate) fn decrease_quantity(&mut self, amount: Decimal) {
        self.quantity -= amount;
    }

    pub(crate) fn cancel(&mut self) {
        self.canceled = true;
    }

    pub(crate) fn set_maker(&mut self) {
        self.role = Role::Maker;
    }

    /// Converts an activated stop-limit order into a plain limit order.
    pub(crate) fn activate(&mut self) {
        self.stop_price = Decimal::ZERO;
        self.order_type = OrderType::Limit;
    }
}
