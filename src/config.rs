//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section falls back to the built-in game constants, so an empty
//! (or absent) file yields a playable configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub feed: FeedConfig,
    pub round: RoundConfig,
    pub rewards: RewardsConfig,
    pub withdrawal: WithdrawalConfig,
    pub invite: InviteConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub name: String,
    pub initial_tokens: u64,
    pub initial_points: u64,
    pub initial_price: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "PRICEPULSE-001".to_string(),
            initial_tokens: 50,
            initial_points: 1250,
            initial_price: 43_567.89,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub tick_interval_ms: u64,
    /// Half-width of the uniform per-tick price delta.
    pub max_delta: f64,
    pub price_floor: f64,
    /// Fixed RNG seed for reproducible price paths.
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            max_delta: 50.0,
            price_floor: 30_000.0,
            seed: None,
        }
    }
}

impl FeedConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RoundConfig {
    pub duration_secs: u32,
    pub reward_points: u64,
    pub penalty_points: u64,
    pub outcome_display_secs: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            reward_points: 10,
            penalty_points: 3,
            outcome_display_secs: 3,
        }
    }
}

impl RoundConfig {
    pub fn outcome_display(&self) -> Duration {
        Duration::from_secs(self.outcome_display_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RewardsConfig {
    pub tasks: Vec<TaskConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TaskConfig {
    pub id: String,
    pub title: String,
    #[serde(default = "default_task_reward")]
    pub reward: u64,
}

fn default_task_reward() -> u64 {
    1
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WithdrawalConfig {
    pub min_points: u64,
    /// Points that convert into one `unit_value` of the payout currency.
    pub points_per_unit: u64,
    pub unit_value: f64,
    pub currency: String,
}

impl Default for WithdrawalConfig {
    fn default() -> Self {
        Self {
            min_points: 1000,
            points_per_unit: 1000,
            unit_value: 0.1,
            currency: "TON".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InviteConfig {
    pub base_url: String,
    pub referral_code: String,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://t.me/pricepulse_bot".to_string(),
            referral_code: "PULSE2024".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

/// Configuration values that would break the game's invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("round.duration_secs must be at least 1")]
    ZeroRoundDuration,

    #[error("feed.tick_interval_ms must be at least 1")]
    ZeroTickInterval,

    #[error("feed.max_delta must be finite and non-negative, got {0}")]
    InvalidMaxDelta(f64),

    #[error("feed.price_floor must be finite, got {0}")]
    InvalidFloor(f64),

    #[error("game.initial_price {price} is below the price floor {floor}")]
    PriceBelowFloor { price: f64, floor: f64 },

    #[error("withdrawal.points_per_unit must be at least 1")]
    ZeroPointsPerUnit,

    #[error("duplicate reward task id: {0}")]
    DuplicateTask(String),
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let config = Self::read(path)?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    /// Either way the result is validated.
    pub fn load_or_default(path: &str) -> Result<Self> {
        let config = if Path::new(path).exists() {
            Self::read(path)?
        } else {
            warn!(path, "Config file not found, using built-in defaults");
            Self::default()
        };
        config
            .validate()
            .with_context(|| format!("Invalid config: {path}"))?;
        Ok(config)
    }

    fn read(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Check the values the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round.duration_secs == 0 {
            return Err(ConfigError::ZeroRoundDuration);
        }
        if self.feed.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if !self.feed.max_delta.is_finite() || self.feed.max_delta < 0.0 {
            return Err(ConfigError::InvalidMaxDelta(self.feed.max_delta));
        }
        if !self.feed.price_floor.is_finite() {
            return Err(ConfigError::InvalidFloor(self.feed.price_floor));
        }
        if !(self.game.initial_price >= self.feed.price_floor) {
            return Err(ConfigError::PriceBelowFloor {
                price: self.game.initial_price,
                floor: self.feed.price_floor,
            });
        }
        if self.withdrawal.points_per_unit == 0 {
            return Err(ConfigError::ZeroPointsPerUnit);
        }

        let mut seen = std::collections::HashSet::new();
        for task in &self.rewards.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(ConfigError::DuplicateTask(task.id.clone()));
            }
        }
        Ok(())
    }
}
