//! Shared types for the PricePulse game.
//!
//! These types form the data model used across all modules: the session
//! ledger, the round state machine's states, settlement results, and the
//! domain error type. Engine, surface and dashboard modules all depend on
//! them without depending on each other.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Predicted price direction for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// Attempt to parse a string into a Direction (case-insensitive).
impl std::str::FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(GameError::UnknownDirection(other.to_string())),
        }
    }
}

/// Result of a settled round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    /// Judge a prediction against the observed price movement.
    ///
    /// Strict comparison: an unchanged price is Incorrect for both
    /// directions.
    pub fn judge(prediction: Direction, start_price: f64, end_price: f64) -> Self {
        let delta = end_price - start_price;
        let correct = match prediction {
            Direction::Up => delta > 0.0,
            Direction::Down => delta < 0.0,
        };
        if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }
}

impl Outcome {
    /// Short player-facing message, e.g. "Correct! +10 Points".
    pub fn message(&self, reward: u64, penalty: u64) -> String {
        match self {
            Outcome::Correct => format!("Correct! +{reward} Points"),
            Outcome::Incorrect => format!("Wrong! -{penalty} Points"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Correct => write!(f, "CORRECT"),
            Outcome::Incorrect => write!(f, "INCORRECT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Round state
// ---------------------------------------------------------------------------

/// The prediction and price snapshot held while a round is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveRound {
    pub prediction: Direction,
    pub start_price: f64,
}

/// Round state machine. Prediction and start price only exist while Active.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RoundState {
    #[default]
    Idle,
    Active(ActiveRound),
}

impl RoundState {
    pub fn is_active(&self) -> bool {
        matches!(self, RoundState::Active(_))
    }

    pub fn prediction(&self) -> Option<Direction> {
        match self {
            RoundState::Active(round) => Some(round.prediction),
            RoundState::Idle => None,
        }
    }

    pub fn start_price(&self) -> Option<f64> {
        match self {
            RoundState::Active(round) => Some(round.start_price),
            RoundState::Idle => None,
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundState::Idle => write!(f, "IDLE"),
            RoundState::Active(round) => write!(
                f,
                "ACTIVE ({} from {})",
                round.prediction,
                format_usd(round.start_price)
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Token and point balances. Both are unsigned, so neither can go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub tokens: u64,
    pub points: u64,
}

impl Ledger {
    pub fn new(tokens: u64, points: u64) -> Self {
        Self { tokens, points }
    }

    /// Spend one token to enter a round. Returns false (and changes
    /// nothing) if the balance is empty.
    pub fn spend_token(&mut self) -> bool {
        match self.tokens.checked_sub(1) {
            Some(remaining) => {
                self.tokens = remaining;
                true
            }
            None => false,
        }
    }

    /// Credit tokens from an external reward.
    pub fn grant_tokens(&mut self, amount: u64) {
        self.tokens = self.tokens.saturating_add(amount);
    }

    /// Credit points for a correct prediction.
    pub fn award(&mut self, points: u64) {
        self.points = self.points.saturating_add(points);
    }

    /// Debit points for an incorrect prediction, floored at zero.
    /// Returns the amount actually removed.
    pub fn penalize(&mut self, points: u64) -> u64 {
        let removed = points.min(self.points);
        self.points -= removed;
        removed
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The single mutable game session. Created once at startup, owned by the
/// engine, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub ledger: Ledger,
    pub current_price: f64,
    pub round: RoundState,
    pub countdown_remaining: u32,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | tokens={} | points={} | price={} | countdown={}s",
            self.round,
            self.ledger.tokens,
            self.ledger.points,
            format_usd(self.current_price),
            self.countdown_remaining,
        )
    }
}

impl SessionState {
    pub fn new(ledger: Ledger, initial_price: f64, round_duration_secs: u32) -> Self {
        Self {
            ledger,
            current_price: initial_price,
            round: RoundState::Idle,
            countdown_remaining: round_duration_secs,
        }
    }
}

/// Running tally of settled rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub rounds_played: u64,
    pub correct: u64,
    pub incorrect: u64,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl SessionStats {
    pub fn record(&mut self, outcome: Outcome) {
        self.rounds_played += 1;
        match outcome {
            Outcome::Correct => {
                self.correct += 1;
                self.current_streak += 1;
                self.best_streak = self.best_streak.max(self.current_streak);
            }
            Outcome::Incorrect => {
                self.incorrect += 1;
                self.current_streak = 0;
            }
        }
    }

    /// Win rate as a percentage. Returns 0.0 if no rounds were played.
    pub fn win_rate(&self) -> f64 {
        if self.rounds_played == 0 {
            0.0
        } else {
            (self.correct as f64 / self.rounds_played as f64) * 100.0
        }
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rounds={} (W{}/L{}) | win_rate={:.1}% | streak={} (best {})",
            self.rounds_played,
            self.correct,
            self.incorrect,
            self.win_rate(),
            self.current_streak,
            self.best_streak,
        )
    }
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Everything that happened when a round was settled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub prediction: Direction,
    pub start_price: f64,
    pub end_price: f64,
    pub outcome: Outcome,
    /// Signed change actually applied to the point balance.
    pub points_delta: i64,
    pub points_after: u64,
}

impl Settlement {
    pub fn price_change(&self) -> f64 {
        self.end_price - self.start_price
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} predicted {}: {} -> {} ({:+.2}) | points {:+} = {}",
            self.outcome,
            self.prediction,
            format_usd(self.start_price),
            format_usd(self.end_price),
            self.price_change(),
            self.points_delta,
            self.points_after,
        )
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format a price as US dollars with thousands separators and two decimals,
/// e.g. `43567.891` becomes `$43,567.89`.
pub fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Disallowed transitions of the round state machine.
///
/// These never surface to the player: the engine reports them so callers
/// can log them, and the runner drops them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("A round is already in progress")]
    RoundInProgress,

    #[error("Insufficient tokens: need {needed}, have {available}")]
    InsufficientTokens { needed: u64, available: u64 },

    #[error("Unknown direction: {0}")]
    UnknownDirection(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Direction tests --

    #[test]
    fn test_direction_display_and_parse() {
        assert_eq!(format!("{}", Direction::Up), "UP");
        assert_eq!(format!("{}", Direction::Down), "DOWN");
        assert_eq!("Up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("down".parse::<Direction>().unwrap(), Direction::Down);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(GameError::UnknownDirection(_))
        ));
    }

    #[test]
    fn test_direction_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
        let parsed: Direction = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(parsed, Direction::Down);
    }

    // -- Outcome tests --

    #[test]
    fn test_judge_up_price_rose() {
        assert_eq!(Outcome::judge(Direction::Up, 100.0, 105.0), Outcome::Correct);
        assert_eq!(Outcome::judge(Direction::Down, 100.0, 105.0), Outcome::Incorrect);
    }

    #[test]
    fn test_judge_price_fell() {
        assert_eq!(Outcome::judge(Direction::Up, 100.0, 95.0), Outcome::Incorrect);
        assert_eq!(Outcome::judge(Direction::Down, 100.0, 95.0), Outcome::Correct);
    }

    #[test]
    fn test_judge_unchanged_price_is_incorrect_both_ways() {
        assert_eq!(Outcome::judge(Direction::Up, 100.0, 100.0), Outcome::Incorrect);
        assert_eq!(Outcome::judge(Direction::Down, 100.0, 100.0), Outcome::Incorrect);
    }

    // -- RoundState tests --

    #[test]
    fn test_round_state_accessors() {
        let idle = RoundState::Idle;
        assert!(!idle.is_active());
        assert_eq!(idle.prediction(), None);
        assert_eq!(idle.start_price(), None);

        let active = RoundState::Active(ActiveRound {
            prediction: Direction::Down,
            start_price: 40_000.0,
        });
        assert!(active.is_active());
        assert_eq!(active.prediction(), Some(Direction::Down));
        assert_eq!(active.start_price(), Some(40_000.0));
    }

    // -- Ledger tests --

    #[test]
    fn test_spend_token() {
        let mut ledger = Ledger::new(1, 0);
        assert!(ledger.spend_token());
        assert_eq!(ledger.tokens, 0);
        assert!(!ledger.spend_token());
        assert_eq!(ledger.tokens, 0);
    }

    #[test]
    fn test_penalize_floors_at_zero() {
        let mut ledger = Ledger::new(0, 2);
        assert_eq!(ledger.penalize(3), 2);
        assert_eq!(ledger.points, 0);
        assert_eq!(ledger.penalize(3), 0);
        assert_eq!(ledger.points, 0);
    }

    #[test]
    fn test_award_and_grant() {
        let mut ledger = Ledger::new(0, 0);
        ledger.award(10);
        ledger.grant_tokens(5);
        assert_eq!(ledger, Ledger::new(5, 10));

        ledger.grant_tokens(u64::MAX);
        assert_eq!(ledger.tokens, u64::MAX);
    }

    // -- SessionState / stats tests --

    #[test]
    fn test_session_display() {
        let mut state = SessionState::new(Ledger::new(50, 1250), 43_567.89, 30);
        assert_eq!(
            state.to_string(),
            "IDLE | tokens=50 | points=1250 | price=$43,567.89 | countdown=30s"
        );

        state.round = RoundState::Active(ActiveRound {
            prediction: Direction::Up,
            start_price: 43_567.89,
        });
        assert!(state.to_string().starts_with("ACTIVE (UP from $43,567.89)"));
    }

    #[test]
    fn test_stats_streaks() {
        let mut stats = SessionStats::default();
        stats.record(Outcome::Correct);
        stats.record(Outcome::Correct);
        stats.record(Outcome::Incorrect);
        stats.record(Outcome::Correct);

        assert_eq!(stats.rounds_played, 4);
        assert_eq!(stats.correct, 3);
        assert_eq!(stats.incorrect, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.best_streak, 2);
        assert!((stats.win_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_outcome_message() {
        assert_eq!(Outcome::Correct.message(10, 3), "Correct! +10 Points");
        assert_eq!(Outcome::Incorrect.message(10, 3), "Wrong! -3 Points");
    }

    #[test]
    fn test_settlement_display() {
        let settlement = Settlement {
            prediction: Direction::Up,
            start_price: 100.0,
            end_price: 105.0,
            outcome: Outcome::Correct,
            points_delta: 10,
            points_after: 1260,
        };
        assert!((settlement.price_change() - 5.0).abs() < 1e-10);
        assert_eq!(
            settlement.to_string(),
            "CORRECT predicted UP: $100.00 -> $105.00 (+5.00) | points +10 = 1260"
        );
    }

    // -- Formatting tests --

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(43_567.891), "$43,567.89");
        assert_eq!(format_usd(30_000.0), "$30,000.00");
        assert_eq!(format_usd(999.999), "$1,000.00");
        assert_eq!(format_usd(1_234_567.5), "$1,234,567.50");
        assert_eq!(format_usd(5.0), "$5.00");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(-1_500.25), "-$1,500.25");
    }
}
