//! The game loop.
//!
//! One task owns the `Game`. It waits on whichever comes first: a scheduler
//! tick, a player command, or shutdown. Handlers run to completion before
//! the next event is taken, so there is never concurrent mutation.

use std::future::Future;

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::game::Game;
use super::scheduler::{Scheduler, Tick};
use crate::types::{Direction, SessionStats};

/// Player-side actions delivered to the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Predict(Direction),
    GrantTokens(u64),
}

/// Why the loop stopped, and where the session ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub ticks: u64,
    pub commands: u64,
    pub tokens: u64,
    pub points: u64,
    pub final_price: f64,
    pub stats: SessionStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    SchedulerExhausted,
}

enum Event {
    Tick(Option<Tick>),
    Command(Option<Command>),
    Shutdown,
}

/// Apply a single command. Disallowed predictions are dropped silently.
pub fn apply_command<S: Scheduler, R: Rng>(game: &mut Game<S, R>, command: Command) {
    match command {
        Command::Predict(direction) => {
            let _ = game.start_round(direction);
        }
        Command::GrantTokens(amount) => game.grant_tokens(amount),
    }
}

/// Drive the game until shutdown resolves or the scheduler runs dry.
///
/// Closing the command channel does not stop the loop; timers keep running.
pub async fn run<S, R, F>(
    game: &mut Game<S, R>,
    mut commands: mpsc::Receiver<Command>,
    shutdown: F,
) -> RunSummary
where
    S: Scheduler,
    R: Rng,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut commands_open = true;
    let mut ticks = 0u64;
    let mut handled = 0u64;

    let reason = loop {
        // Shutdown first, then player actions, then timers.
        let event = tokio::select! {
            biased;
            _ = &mut shutdown => Event::Shutdown,
            cmd = commands.recv(), if commands_open => Event::Command(cmd),
            tick = game.scheduler_mut().next_tick() => Event::Tick(tick),
        };

        match event {
            Event::Tick(Some(tick)) => {
                ticks += 1;
                game.handle_tick(tick);
            }
            Event::Tick(None) => break StopReason::SchedulerExhausted,
            Event::Command(Some(command)) => {
                handled += 1;
                debug!(?command, "Command received");
                apply_command(game, command);
            }
            Event::Command(None) => {
                debug!("Command channel closed, continuing on timers only");
                commands_open = false;
            }
            Event::Shutdown => {
                info!("Shutdown signal received.");
                break StopReason::Shutdown;
            }
        }
    };

    let state = game.state();
    let summary = RunSummary {
        reason,
        ticks,
        commands: handled,
        tokens: state.ledger.tokens,
        points: state.ledger.points,
        final_price: state.current_price,
        stats: *game.stats(),
    };
    info!(
        reason = ?summary.reason,
        ticks = summary.ticks,
        state = %state,
        stats = %summary.stats,
        "Game loop stopped"
    );
    summary
}
