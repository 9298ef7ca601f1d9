//! Scheduler abstraction.
//!
//! The game is driven by three timer sources: the price feed (periodic,
//! never cancelled), the round countdown (periodic, only while a round
//! runs), and the one-off outcome banner expiry. `Scheduler` lets the game
//! arm and cancel them, and lets the runner wait for whichever fires next.
//! `IntervalScheduler` does this with real tokio timers; `ManualScheduler`
//! replays a scripted sequence for deterministic tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::future::pending;
use std::time::Duration;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};

/// A timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tick {
    Price,
    Countdown,
    ClearOutcome,
}

#[async_trait]
pub trait Scheduler: Send {
    /// Arm the once-per-second countdown. Re-arming restarts its phase.
    fn start_countdown(&mut self);

    fn stop_countdown(&mut self);

    /// Fire `Tick::ClearOutcome` once after `after`, replacing any pending
    /// expiry.
    fn schedule_outcome_clear(&mut self, after: Duration);

    /// Wait for the next tick. `None` means the source is exhausted.
    async fn next_tick(&mut self) -> Option<Tick>;
}

// ---------------------------------------------------------------------------
// Real-time scheduler
// ---------------------------------------------------------------------------

pub struct IntervalScheduler {
    price: Interval,
    countdown: Option<Interval>,
    countdown_period: Duration,
    outcome_deadline: Option<Instant>,
}

impl IntervalScheduler {
    /// Start the price ticker. Like a browser `setInterval`, the first tick
    /// fires one full period after creation.
    pub fn new(price_period: Duration, countdown_period: Duration) -> Self {
        Self {
            price: periodic(price_period),
            countdown: None,
            countdown_period,
            outcome_deadline: None,
        }
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_some()
    }
}

fn periodic(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_countdown(countdown: Option<&mut Interval>) {
    match countdown {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending::<()>().await,
    }
}

#[async_trait]
impl Scheduler for IntervalScheduler {
    fn start_countdown(&mut self) {
        self.countdown = Some(periodic(self.countdown_period));
    }

    fn stop_countdown(&mut self) {
        self.countdown = None;
    }

    fn schedule_outcome_clear(&mut self, after: Duration) {
        self.outcome_deadline = Some(Instant::now() + after);
    }

    async fn next_tick(&mut self) -> Option<Tick> {
        // Unbiased: price and countdown due in the same instant may fire in
        // either order.
        let fired = tokio::select! {
            _ = self.price.tick() => Tick::Price,
            _ = next_countdown(self.countdown.as_mut()) => Tick::Countdown,
            _ = until(self.outcome_deadline) => Tick::ClearOutcome,
        };
        if fired == Tick::ClearOutcome {
            self.outcome_deadline = None;
        }
        Some(fired)
    }
}

// ---------------------------------------------------------------------------
// Scripted scheduler
// ---------------------------------------------------------------------------

/// Replays a fixed tick script, dropping countdown ticks while no countdown
/// is armed and outcome-clear ticks while nothing is scheduled, the same
/// way the real timers would never deliver them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    script: VecDeque<Tick>,
    countdown_running: bool,
    outcome_pending: Option<Duration>,
    starts: u32,
    stops: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(ticks: impl IntoIterator<Item = Tick>) -> Self {
        Self {
            script: ticks.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, tick: Tick) {
        self.script.push_back(tick);
    }

    pub fn push_many(&mut self, tick: Tick, count: usize) {
        self.script.extend(std::iter::repeat(tick).take(count));
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown_running
    }

    pub fn outcome_pending(&self) -> Option<Duration> {
        self.outcome_pending
    }

    /// How many times the countdown was started and stopped.
    pub fn countdown_cycles(&self) -> (u32, u32) {
        (self.starts, self.stops)
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl Scheduler for ManualScheduler {
    fn start_countdown(&mut self) {
        self.countdown_running = true;
        self.starts += 1;
    }

    fn stop_countdown(&mut self) {
        if self.countdown_running {
            self.stops += 1;
        }
        self.countdown_running = false;
    }

    fn schedule_outcome_clear(&mut self, after: Duration) {
        self.outcome_pending = Some(after);
    }

    async fn next_tick(&mut self) -> Option<Tick> {
        while let Some(tick) = self.script.pop_front() {
            match tick {
                Tick::Countdown if !self.countdown_running => continue,
                Tick::ClearOutcome if self.outcome_pending.is_none() => continue,
                Tick::ClearOutcome => {
                    self.outcome_pending = None;
                    return Some(tick);
                }
                _ => return Some(tick),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_price_ticks_every_period() {
        let start = Instant::now();
        let mut scheduler = IntervalScheduler::new(Duration::from_secs(1), Duration::from_secs(1));

        assert_eq!(scheduler.next_tick().await, Some(Tick::Price));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(scheduler.next_tick().await, Some(Tick::Price));
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_only_while_armed() {
        let mut scheduler = IntervalScheduler::new(Duration::from_secs(1), Duration::from_secs(1));
        assert_eq!(scheduler.next_tick().await, Some(Tick::Price));

        scheduler.start_countdown();
        assert!(scheduler.countdown_running());

        // Both sources are due at the same instant; either may come first.
        let a = scheduler.next_tick().await.unwrap();
        let b = scheduler.next_tick().await.unwrap();
        let mut fired = vec![a, b];
        fired.sort_by_key(|t| *t as u8);
        assert_eq!(fired, vec![Tick::Price, Tick::Countdown]);

        scheduler.stop_countdown();
        for _ in 0..5 {
            assert_eq!(scheduler.next_tick().await, Some(Tick::Price));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcome_clear_fires_once() {
        let mut scheduler = IntervalScheduler::new(Duration::from_secs(1), Duration::from_secs(1));
        scheduler.schedule_outcome_clear(Duration::from_millis(2500));

        let mut ticks = Vec::new();
        for _ in 0..6 {
            ticks.push(scheduler.next_tick().await.unwrap());
        }
        assert_eq!(ticks.iter().filter(|t| **t == Tick::ClearOutcome).count(), 1);
        assert_eq!(ticks[2], Tick::ClearOutcome);
    }

    #[test]
    fn test_manual_drops_unarmed_ticks() {
        let mut scheduler = ManualScheduler::with_script([
            Tick::Countdown,
            Tick::ClearOutcome,
            Tick::Price,
        ]);
        assert_eq!(tokio_test::block_on(scheduler.next_tick()), Some(Tick::Price));
        assert_eq!(tokio_test::block_on(scheduler.next_tick()), None);
        assert_eq!(scheduler.remaining(), 0);
    }

    #[tokio::test]
    async fn test_manual_delivers_armed_ticks() {
        let mut scheduler = ManualScheduler::new();
        scheduler.start_countdown();
        scheduler.schedule_outcome_clear(Duration::from_secs(3));
        scheduler.push(Tick::Countdown);
        scheduler.push_many(Tick::ClearOutcome, 2);

        assert_eq!(scheduler.next_tick().await, Some(Tick::Countdown));
        assert_eq!(scheduler.next_tick().await, Some(Tick::ClearOutcome));
        assert_eq!(scheduler.outcome_pending(), None);
        assert_eq!(scheduler.next_tick().await, None);

        scheduler.stop_countdown();
        scheduler.stop_countdown();
        assert_eq!(scheduler.countdown_cycles(), (1, 1));
    }
}
