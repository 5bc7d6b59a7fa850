//! # tidebook
//!
//! Price-time priority order book for a single instrument: market, limit and
//! stop-limit orders, FOK/IOC time-in-force, one-cancels-other linkage,
//! exact-trigger stop activation, depth and cost queries.
//!
//! ## Entry point
//!
//! Use [`Engine`] as the single entry point: create with [`Engine::new`], then
//! [`Engine::submit`] and [`Engine::cancel`]. [`OrderBook`] is the underlying
//! matching core if you don't need logging or audit.
//!
//! ## Example
//!
//! ```rust
//! use tidebook::{Engine, Order, Side, TimeInForce};
//! use rust_decimal::Decimal;
//!
//! let mut engine = Engine::new();
//! let sell = Order::limit(
//!     "s1",
//!     Side::Sell,
//!     Decimal::from(10),
//!     Decimal::from(100),
//!     TimeInForce::GTC,
//!     None,
//! )
//! .unwrap();
//! let report = engine.submit(sell).unwrap();
//! assert!(report.stored);
//!
//! let buy = Order::limit(
//!     "b1",
//!     Side::Buy,
//!     Decimal::from(4),
//!     Decimal::from(100),
//!     TimeInForce::GTC,
//!     None,
//! )
//! .unwrap();
//! let report = engine.submit(buy).unwrap();
//! assert_eq!(report.trades.len(), 1);
//! assert_eq!(report.processed, Decimal::from(4));
//! assert_eq!(report.left, Decimal::ZERO);
//! ```
//!
//! The book is single-threaded by design: each `submit` runs to completion
//! and represents one state transition. Serialize concurrent callers
//! externally; the order of submissions defines the trade sequence.

pub mod audit;
pub mod engine;
pub mod errors;
pub mod execution;
pub mod market_data_gen;
pub mod order;
pub mod order_book;
pub mod order_queue;
pub mod order_side;
pub mod stop_book;
pub mod types;

pub use audit::{AuditEvent, AuditSink, InMemoryAuditSink, StdoutAuditSink};
pub use engine::Engine;
pub use errors::OrderBookError;
pub use execution::{ExecutionReport, TradeLeg};
pub use market_data_gen::{replay_into_engine, Generator, GeneratorConfig};
pub use order::Order;
pub use order_book::{Depth, MarketCost, OrderBook, DEFAULT_SCALE};
pub use order_queue::OrderQueue;
pub use order_side::OrderSide;
pub use stop_book::StopBook;
pub use types::{Level, OrderId, OrderType, Role, Side, TimeInForce};
