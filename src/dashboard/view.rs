//! The dashboard's copy of what the player sees.
//!
//! `DashboardSurface` implements every presentation collaborator by writing
//! into a `watch` channel; route handlers read the latest `GameView` from
//! the receiving side.

use serde::Serialize;
use tokio::sync::watch;

use crate::surface::{CountdownDisplay, DisplaySurface, OutcomeDisplay, PredictionControls};
use crate::types::{format_usd, Outcome};

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct GameView {
    pub tokens: u64,
    pub points: u64,
    pub price: f64,
    pub price_display: String,
    pub controls_enabled: bool,
    pub countdown: u32,
    pub outcome: Option<Outcome>,
    pub outcome_message: Option<String>,
}

pub struct DashboardSurface {
    view: watch::Sender<GameView>,
    reward_points: u64,
    penalty_points: u64,
}

impl DashboardSurface {
    /// Create the surface and the receiver handed to the HTTP handlers.
    pub fn channel(reward_points: u64, penalty_points: u64) -> (Self, watch::Receiver<GameView>) {
        let (tx, rx) = watch::channel(GameView::default());
        let surface = Self {
            view: tx,
            reward_points,
            penalty_points,
        };
        (surface, rx)
    }
}

impl DisplaySurface for DashboardSurface {
    fn render(&self, tokens: u64, points: u64, price: f64) {
        self.view.send_modify(|v| {
            v.tokens = tokens;
            v.points = points;
            v.price = price;
            v.price_display = format_usd(price);
        });
    }
}

impl PredictionControls for DashboardSurface {
    fn set_enabled(&self, enabled: bool) {
        self.view.send_modify(|v| v.controls_enabled = enabled);
    }
}

impl CountdownDisplay for DashboardSurface {
    fn set_value(&self, seconds: u32) {
        self.view.send_modify(|v| v.countdown = seconds);
    }
}

impl OutcomeDisplay for DashboardSurface {
    fn show(&self, outcome: Outcome) {
        let message = outcome.message(self.reward_points, self.penalty_points);
        self.view.send_modify(|v| {
            v.outcome = Some(outcome);
            v.outcome_message = Some(message);
        });
    }

    fn clear(&self) {
        self.view.send_modify(|v| {
            v.outcome = None;
            v.outcome_message = None;
        });
    }
}
