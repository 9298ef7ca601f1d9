//! The game: sole owner of the session state.
//!
//! Wires the price feed and round manager to the presentation collaborators
//! and the scheduler. Every mutation goes through one of the handlers here,
//! called either from a timer tick or from a player action.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

use super::feed::PriceFeed;
use super::round::{CountdownStep, RoundManager};
use super::scheduler::{Scheduler, Tick};
use crate::config::AppConfig;
use crate::surface::Surface;
use crate::types::{Direction, GameError, Ledger, Outcome, SessionState, SessionStats, Settlement};

pub struct Game<S, R = StdRng> {
    state: SessionState,
    feed: PriceFeed<R>,
    rounds: RoundManager,
    surface: Surface,
    scheduler: S,
    stats: SessionStats,
    outcome_display: Duration,
    showing_outcome: Option<Outcome>,
}

impl<S: Scheduler> Game<S, StdRng> {
    /// Build a fresh session from config.
    pub fn new(config: &AppConfig, surface: Surface, scheduler: S) -> Self {
        Self::with_feed(config, PriceFeed::new(&config.feed), surface, scheduler)
    }
}

impl<S: Scheduler, R: Rng> Game<S, R> {
    pub fn with_feed(config: &AppConfig, feed: PriceFeed<R>, surface: Surface, scheduler: S) -> Self {
        let state = SessionState::new(
            Ledger::new(config.game.initial_tokens, config.game.initial_points),
            config.game.initial_price,
            config.round.duration_secs,
        );
        let game = Self {
            state,
            feed,
            rounds: RoundManager::new(&config.round),
            surface,
            scheduler,
            stats: SessionStats::default(),
            outcome_display: config.round.outcome_display(),
            showing_outcome: None,
        };
        game.refresh_display();
        game.surface.set_countdown(game.state.countdown_remaining);
        game.surface.set_controls_enabled(true);
        game
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// The outcome banner currently shown, if any.
    pub fn showing_outcome(&self) -> Option<Outcome> {
        self.showing_outcome
    }

    /// Route a timer tick to its handler.
    pub fn handle_tick(&mut self, tick: Tick) {
        match tick {
            Tick::Price => self.price_tick(),
            Tick::Countdown => {
                self.countdown_tick();
            }
            Tick::ClearOutcome => self.clear_outcome(),
        }
    }

    /// Price feed tick. Skipped (not stopped) while a round is active.
    pub fn price_tick(&mut self) {
        if self.feed.tick(&mut self.state).is_some() {
            self.refresh_display();
        }
    }

    /// Player prediction. Disallowed attempts change nothing and produce no
    /// visible effect; the error is only for the caller's logs.
    pub fn start_round(&mut self, direction: Direction) -> Result<(), GameError> {
        if let Err(e) = self.rounds.start(&mut self.state, direction) {
            debug!(error = %e, prediction = %direction, "Prediction ignored");
            return Err(e);
        }

        self.surface.set_controls_enabled(false);
        self.showing_outcome = None;
        self.surface.clear_outcome();
        self.scheduler.start_countdown();
        self.refresh_display();
        Ok(())
    }

    /// Countdown tick. Settles the round when the countdown runs out.
    pub fn countdown_tick(&mut self) -> Option<Settlement> {
        match self.rounds.countdown_tick(&mut self.state) {
            CountdownStep::Idle => None,
            CountdownStep::Running(seconds) => {
                self.surface.set_countdown(seconds);
                None
            }
            CountdownStep::Settled(settlement) => {
                self.surface.set_countdown(0);
                self.after_settlement(settlement);
                Some(settlement)
            }
        }
    }

    /// Settle the active round immediately against the current price.
    pub fn settle_round(&mut self) -> Option<Settlement> {
        let settlement = self.rounds.settle(&mut self.state)?;
        self.after_settlement(settlement);
        Some(settlement)
    }

    /// External reward (task completion).
    pub fn grant_tokens(&mut self, amount: u64) {
        self.state.ledger.grant_tokens(amount);
        info!(amount, tokens = self.state.ledger.tokens, "Tokens granted");
        self.refresh_display();
    }

    /// Outcome banner expiry.
    pub fn clear_outcome(&mut self) {
        self.hide_outcome();
    }

    fn after_settlement(&mut self, settlement: Settlement) {
        self.scheduler.stop_countdown();
        self.stats.record(settlement.outcome);
        info!(
            result = %settlement.outcome.message(self.rounds.reward_points(), self.rounds.penalty_points()),
            stats = %self.stats,
            "Round complete"
        );

        self.surface.show_outcome(settlement.outcome);
        self.showing_outcome = Some(settlement.outcome);
        self.scheduler.schedule_outcome_clear(self.outcome_display);

        self.surface.set_controls_enabled(true);
        self.surface.set_countdown(self.state.countdown_remaining);
        self.refresh_display();
    }

    fn hide_outcome(&mut self) {
        if self.showing_outcome.take().is_some() {
            self.surface.clear_outcome();
        }
    }

    fn refresh_display(&self) {
        let ledger = &self.state.ledger;
        self.surface.render(ledger.tokens, ledger.points, self.state.current_price);
    }
}
