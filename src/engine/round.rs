//! Round manager: the Idle -> Active -> Idle state machine and the
//! points ledger rules applied at settlement.

use tracing::{debug, info};

use crate::config::RoundConfig;
use crate::types::{ActiveRound, Direction, GameError, Outcome, RoundState, SessionState, Settlement};

#[derive(Debug, Clone)]
pub struct RoundManager {
    duration_secs: u32,
    reward_points: u64,
    penalty_points: u64,
}

/// What a countdown tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownStep {
    /// No round is running; the tick was ignored.
    Idle,
    /// Seconds left after the decrement.
    Running(u32),
    /// The countdown hit zero and the round was settled.
    Settled(Settlement),
}

impl RoundManager {
    pub fn new(config: &RoundConfig) -> Self {
        Self {
            duration_secs: config.duration_secs,
            reward_points: config.reward_points,
            penalty_points: config.penalty_points,
        }
    }

    pub fn reward_points(&self) -> u64 {
        self.reward_points
    }

    pub fn penalty_points(&self) -> u64 {
        self.penalty_points
    }

    /// Idle -> Active. Spends one token and snapshots the current price.
    ///
    /// On error the state is left exactly as it was.
    pub fn start(&self, state: &mut SessionState, direction: Direction) -> Result<(), GameError> {
        if state.round.is_active() {
            return Err(GameError::RoundInProgress);
        }
        if !state.ledger.spend_token() {
            return Err(GameError::InsufficientTokens {
                needed: 1,
                available: state.ledger.tokens,
            });
        }

        state.round = RoundState::Active(ActiveRound {
            prediction: direction,
            start_price: state.current_price,
        });
        state.countdown_remaining = self.duration_secs;

        info!(
            prediction = %direction,
            start_price = format!("{:.2}", state.current_price),
            tokens_left = state.ledger.tokens,
            "Round started"
        );
        Ok(())
    }

    /// One second of countdown. Settles the round when it reaches zero.
    pub fn countdown_tick(&self, state: &mut SessionState) -> CountdownStep {
        if !state.round.is_active() {
            debug!("Countdown tick while idle, ignored");
            return CountdownStep::Idle;
        }

        state.countdown_remaining = state.countdown_remaining.saturating_sub(1);
        if state.countdown_remaining > 0 {
            return CountdownStep::Running(state.countdown_remaining);
        }

        match self.settle(state) {
            Some(settlement) => CountdownStep::Settled(settlement),
            None => CountdownStep::Idle,
        }
    }

    /// Active -> Idle. Scores the prediction against the current price and
    /// resets the round. Returns `None` if no round was running.
    pub fn settle(&self, state: &mut SessionState) -> Option<Settlement> {
        let RoundState::Active(round) = state.round else {
            return None;
        };

        let end_price = state.current_price;
        let outcome = Outcome::judge(round.prediction, round.start_price, end_price);
        let points_delta = match outcome {
            Outcome::Correct => {
                state.ledger.award(self.reward_points);
                i64::try_from(self.reward_points).unwrap_or(i64::MAX)
            }
            Outcome::Incorrect => {
                let removed = state.ledger.penalize(self.penalty_points);
                -i64::try_from(removed).unwrap_or(i64::MAX)
            }
        };

        state.round = RoundState::Idle;
        state.countdown_remaining = self.duration_secs;

        let settlement = Settlement {
            prediction: round.prediction,
            start_price: round.start_price,
            end_price,
            outcome,
            points_delta,
            points_after: state.ledger.points,
        };
        info!(settlement = %settlement, "Round settled");
        Some(settlement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ledger;

    fn manager() -> RoundManager {
        RoundManager::new(&RoundConfig::default())
    }

    fn state(tokens: u64, points: u64, price: f64) -> SessionState {
        SessionState::new(Ledger::new(tokens, points), price, 30)
    }

    /// Start a round at `start`, move the price to `end`, settle.
    fn play(points: u64, direction: Direction, start: f64, end: f64) -> (SessionState, Settlement) {
        let rounds = manager();
        let mut s = state(1, points, start);
        rounds.start(&mut s, direction).unwrap();
        s.current_price = end;
        let settlement = rounds.settle(&mut s).unwrap();
        (s, settlement)
    }

    #[test]
    fn test_start_spends_token_and_snapshots() {
        let rounds = manager();
        let mut s = state(5, 100, 43_000.0);
        rounds.start(&mut s, Direction::Up).unwrap();

        assert_eq!(s.ledger.tokens, 4);
        assert_eq!(s.countdown_remaining, 30);
        assert_eq!(s.round.prediction(), Some(Direction::Up));
        assert_eq!(s.round.start_price(), Some(43_000.0));
    }

    #[test]
    fn test_start_rejected_while_active() {
        let rounds = manager();
        let mut s = state(5, 100, 43_000.0);
        rounds.start(&mut s, Direction::Up).unwrap();
        s.countdown_remaining = 12;
        let before = s.clone();

        assert_eq!(rounds.start(&mut s, Direction::Down), Err(GameError::RoundInProgress));
        assert_eq!(s, before);
    }

    #[test]
    fn test_start_rejected_without_tokens() {
        let rounds = manager();
        let mut s = state(0, 100, 43_000.0);
        let before = s.clone();

        assert_eq!(
            rounds.start(&mut s, Direction::Up),
            Err(GameError::InsufficientTokens { needed: 1, available: 0 })
        );
        assert_eq!(s, before);
    }

    #[test]
    fn test_correct_up_awards_points() {
        let (s, settlement) = play(1250, Direction::Up, 100.0, 105.0);
        assert_eq!(settlement.outcome, Outcome::Correct);
        assert_eq!(settlement.points_delta, 10);
        assert_eq!(s.ledger.points, 1260);
    }

    #[test]
    fn test_incorrect_up_penalizes_points() {
        let (s, settlement) = play(1250, Direction::Up, 100.0, 95.0);
        assert_eq!(settlement.outcome, Outcome::Incorrect);
        assert_eq!(settlement.points_delta, -3);
        assert_eq!(s.ledger.points, 1247);
    }

    #[test]
    fn test_unchanged_price_is_incorrect() {
        for direction in [Direction::Up, Direction::Down] {
            let (s, settlement) = play(10, direction, 100.0, 100.0);
            assert_eq!(settlement.outcome, Outcome::Incorrect);
            assert_eq!(s.ledger.points, 7);
        }
    }

    #[test]
    fn test_penalty_floors_at_zero() {
        let (s, settlement) = play(2, Direction::Down, 100.0, 101.0);
        assert_eq!(settlement.outcome, Outcome::Incorrect);
        assert_eq!(settlement.points_delta, -2);
        assert_eq!(s.ledger.points, 0);

        let (s, settlement) = play(0, Direction::Down, 100.0, 101.0);
        assert_eq!(settlement.points_delta, 0);
        assert_eq!(s.ledger.points, 0);
    }

    #[test]
    fn test_settle_always_returns_to_idle() {
        for (direction, end) in [(Direction::Up, 110.0), (Direction::Up, 90.0), (Direction::Down, 100.0)] {
            let (s, _) = play(50, direction, 100.0, end);
            assert_eq!(s.round, RoundState::Idle);
            assert_eq!(s.round.prediction(), None);
            assert_eq!(s.round.start_price(), None);
            assert_eq!(s.countdown_remaining, 30);
        }
    }

    #[test]
    fn test_settle_while_idle_is_noop() {
        let rounds = manager();
        let mut s = state(5, 100, 43_000.0);
        let before = s.clone();
        assert_eq!(rounds.settle(&mut s), None);
        assert_eq!(s, before);
    }

    #[test]
    fn test_countdown_runs_to_settlement() {
        let rounds = manager();
        let mut s = state(1, 100, 40_000.0);
        rounds.start(&mut s, Direction::Down).unwrap();
        s.current_price = 39_990.0;

        for expected in (1..30).rev() {
            assert_eq!(rounds.countdown_tick(&mut s), CountdownStep::Running(expected));
        }
        match rounds.countdown_tick(&mut s) {
            CountdownStep::Settled(settlement) => {
                assert_eq!(settlement.outcome, Outcome::Correct);
                assert_eq!(settlement.points_after, 110);
            }
            other => panic!("expected settlement, got {other:?}"),
        }
        assert_eq!(s.round, RoundState::Idle);
        assert_eq!(rounds.countdown_tick(&mut s), CountdownStep::Idle);
        assert_eq!(s.countdown_remaining, 30);
    }
}
