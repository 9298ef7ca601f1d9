//! Simulated price feed.
//!
//! Random walk with a uniform per-tick delta and a hard floor. The feed
//! keeps ticking while a round is active but leaves the price untouched,
//! so a round always settles against a price that only moved while idle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::FeedConfig;
use crate::types::SessionState;

pub struct PriceFeed<R = StdRng> {
    rng: R,
    max_delta: f64,
    floor: f64,
}

impl PriceFeed<StdRng> {
    /// Build a feed from config. Seeded when `seed` is set, otherwise
    /// drawn from OS entropy.
    pub fn new(config: &FeedConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> PriceFeed<R> {
    pub fn with_rng(config: &FeedConfig, rng: R) -> Self {
        Self {
            rng,
            max_delta: config.max_delta,
            floor: config.price_floor,
        }
    }

    /// Advance the price by one tick. Returns the new price, or `None` when
    /// the feed is paused by an active round.
    pub fn tick(&mut self, state: &mut SessionState) -> Option<f64> {
        if state.round.is_active() {
            return None;
        }

        let delta = if self.max_delta > 0.0 {
            self.rng.gen_range(-self.max_delta..=self.max_delta)
        } else {
            0.0
        };
        let price = (state.current_price + delta).max(self.floor);
        state.current_price = price;

        debug!(delta = format!("{delta:+.2}"), price = format!("{price:.2}"), "Price tick");
        Some(price)
    }
}
