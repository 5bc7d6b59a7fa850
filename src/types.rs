//! Core types for the order book (identifiers, enums, depth levels).
//!
//! [`OrderId`] wraps the caller-assigned string id. [`Side`], [`OrderType`],
//! [`TimeInForce`] and [`Role`] define the order vocabulary; [`Level`] is one
//! rung of a depth snapshot.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::errors::OrderBookError;

/// Unique order identifier, assigned by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for OrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an aggressor on `self` takes liquidity from.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type: market (take best available), limit (with price), or
/// stop-limit (a limit order pending until its trigger price trades).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    StopLimit,
}

/// Time-in-force: how long the order stays active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TimeInForce {
    /// Good-Till-Cancel: rest on book until filled or canceled.
    #[default]
    GTC,
    /// Immediate-or-Cancel: fill what you can immediately; cancel the rest.
    IOC,
    /// Fill-or-Kill: fill entirely immediately or cancel.
    FOK,
}

impl FromStr for TimeInForce {
    type Err = OrderBookError;

    /// Parses a time-in-force token. The empty token means GTC.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "GTC" => Ok(TimeInForce::GTC),
            "IOC" => Ok(TimeInForce::IOC),
            "FOK" => Ok(TimeInForce::FOK),
            _ => Err(OrderBookError::InvalidTimeInForce),
        }
    }
}

/// Which side of a trade an order was on: resting (maker) or aggressing (taker).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Role {
    Maker,
    Taker,
}

/// One price level of a depth snapshot: price and aggregate resting volume.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Level {
    pub price: Decimal,
    pub volume: Decimal,
}
