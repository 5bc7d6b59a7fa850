//! Synthetic order-flow generator.
//!
//! Deterministic, configurable order stream for replay tests, property tests
//! and benchmarks. Same seed ⇒ same sequence of orders.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::engine::Engine;
use crate::errors::OrderBookError;
use crate::order::Order;
use crate::types::{Side, TimeInForce};

/// Configuration for the synthetic order generator.
/// All ranges are inclusive. Same config + seed produces the same stream.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed ⇒ same order stream.
    pub seed: u64,
    /// Number of orders to generate when collecting the full stream.
    pub num_orders: usize,
    /// Probability of Buy (0.0..=1.0). Sell otherwise.
    pub buy_ratio: f64,
    /// Probability of a limit order, then of a stop-limit; market otherwise.
    /// The two should sum to at most 1.0.
    pub limit_ratio: f64,
    pub stop_ratio: f64,
    /// Probability that a market order is quote-denominated.
    pub quote_ratio: f64,
    /// Price range (inclusive) for limit prices and stop triggers.
    pub price_min: i64,
    pub price_max: i64,
    /// Quantity range (inclusive), whole units.
    pub quantity_min: u64,
    pub quantity_max: u64,
    /// Time-in-force for limit orders: probability of GTC, then IOC, then FOK
    /// (should sum to 1.0).
    pub tif_gtc_ratio: f64,
    pub tif_ioc_ratio: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_orders: 1000,
            buy_ratio: 0.5,
            limit_ratio: 0.8,
            stop_ratio: 0.1,
            quote_ratio: 0.2,
            price_min: 95,
            price_max: 105,
            quantity_min: 1,
            quantity_max: 100,
            tif_gtc_ratio: 0.8,
            tif_ioc_ratio: 0.1,
        }
    }
}

/// Deterministic order stream. Create with [`Generator::new`]; pull orders
/// with [`Generator::next_order`] or collect with [`Generator::all_orders`].
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_seq: u64,
}

impl Generator {
    /// Builds a generator with the given config. Same config (including seed)
    /// ⇒ same stream.
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            rng,
            config,
            next_seq: 1,
        }
    }

    /// Generates the next order. Advances internal state (sequence, RNG).
    pub fn next_order(&mut self) -> Order {
        let id = format!("gen-{}", self.next_seq);
        self.next_seq += 1;

        let side = if self.rng.gen::<f64>() < self.config.buy_ratio {
            Side::Buy
        } else {
            Side::Sell
        };
        let quantity = Decimal::from(
            self.rng
                .gen_range(self.config.quantity_min.max(1)..=self.config.quantity_max.max(1)),
        );
        let price_of = |rng: &mut StdRng, config: &GeneratorConfig| {
            Decimal::from(rng.gen_range(config.price_min.max(1)..=config.price_max.max(1)))
        };

        let kind = self.rng.gen::<f64>();
        if kind < self.config.limit_ratio {
            let price = price_of(&mut self.rng, &self.config);
            let r = self.rng.gen::<f64>();
            let tif = if r < self.config.tif_gtc_ratio {
                TimeInForce::GTC
            } else if r < self.config.tif_gtc_ratio + self.config.tif_ioc_ratio {
                TimeInForce::IOC
            } else {
                TimeInForce::FOK
            };
            Order::limit(id, side, quantity, price, tif, None)
                .expect("generated limit order has positive quantity and price")
        } else if kind < self.config.limit_ratio + self.config.stop_ratio {
            let price = price_of(&mut self.rng, &self.config);
            let trigger = price_of(&mut self.rng, &self.config);
            Order::stop_limit(id, side, quantity, price, trigger, None)
                .expect("generated stop order has positive quantity and prices")
        } else if self.rng.gen::<f64>() < self.config.quote_ratio {
            Order::market_quote(id, side, quantity)
                .expect("generated market order has positive quantity")
        } else {
            Order::market(id, side, quantity)
                .expect("generated market order has positive quantity")
        }
    }

    /// Returns exactly `n` orders, advancing the generator state.
    pub fn take_orders(&mut self, n: usize) -> Vec<Order> {
        (0..n).map(|_| self.next_order()).collect()
    }

    /// Returns the full stream of orders as defined by `config.num_orders`.
    pub fn all_orders(&mut self) -> Vec<Order> {
        let n = self.config.num_orders;
        self.take_orders(n)
    }
}

/// Replays a sequence of orders into the engine. Returns total trade-leg and
/// report counts, or the first submission error.
pub fn replay_into_engine(
    engine: &mut Engine,
    orders: impl IntoIterator<Item = Order>,
) -> Result<(usize, usize), OrderBookError> {
    let mut total_trades = 0usize;
    let mut total_reports = 0usize;
    for order in orders {
        let report = engine.submit(order)?;
        total_trades += report.trades.len();
        total_reports += 1;
    }
    Ok((total_trades, total_reports))
}
