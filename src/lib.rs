//! PricePulse — simulated price-direction prediction mini-game
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod engine;
pub mod surface;
pub mod rewards;
pub mod withdrawal;
pub mod invite;
pub mod dashboard;
