//! Console surface: renders game updates through `tracing`.
//!
//! Used when the dashboard is disabled, so a headless run still shows the
//! price drifting and rounds resolving in the log.

use tracing::{debug, info};

use super::{CountdownDisplay, DisplaySurface, OutcomeDisplay, PredictionControls};
use crate::types::{format_usd, Outcome};

#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl DisplaySurface for ConsoleSurface {
    fn render(&self, tokens: u64, points: u64, price: f64) {
        debug!(tokens, points, price = %format_usd(price), "Display");
    }
}

impl PredictionControls for ConsoleSurface {
    fn set_enabled(&self, enabled: bool) {
        debug!(enabled, "Prediction controls");
    }
}

impl CountdownDisplay for ConsoleSurface {
    fn set_value(&self, seconds: u32) {
        debug!(seconds, "Countdown");
    }
}

impl OutcomeDisplay for ConsoleSurface {
    fn show(&self, outcome: Outcome) {
        info!(%outcome, "Round result");
    }

    fn clear(&self) {
        debug!("Round result cleared");
    }
}
