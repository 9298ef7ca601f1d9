//! Core engine: the price feed, the round state machine, and the
//! scheduler-driven loop that owns the session.

pub mod feed;
pub mod round;
pub mod scheduler;
pub mod game;
pub mod runner;
