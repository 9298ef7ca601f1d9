//! Simulated withdrawals.
//!
//! Converts points into the payout currency and validates a request against
//! the current point balance. Nothing is transferred and no points are
//! deducted; an accepted request just produces a receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::WithdrawalConfig;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WithdrawalError {
    #[error("Wallet address is required")]
    MissingAddress,

    #[error("Minimum withdrawal is {min} points, requested {requested}")]
    BelowMinimum { min: u64, requested: u64 },

    #[error("Insufficient points: requested {requested}, have {available}")]
    ExceedsBalance { requested: u64, available: u64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRequest {
    pub wallet_address: String,
    pub points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub points: u64,
    pub amount: f64,
    pub currency: String,
    /// Amount with 4 decimals and currency, e.g. "0.1250 TON".
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalReceipt {
    pub id: Uuid,
    pub wallet_address: String,
    pub points: u64,
    pub amount: f64,
    pub currency: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WithdrawalDesk {
    config: WithdrawalConfig,
}

impl WithdrawalDesk {
    pub fn new(config: WithdrawalConfig) -> Self {
        Self { config }
    }

    pub fn quote(&self, points: u64) -> Quote {
        let units = points as f64 / self.config.points_per_unit as f64;
        let amount = units * self.config.unit_value;
        Quote {
            points,
            amount,
            currency: self.config.currency.clone(),
            display: format!("{amount:.4} {}", self.config.currency),
        }
    }

    /// Validate a request against the player's current point balance.
    pub fn submit(
        &self,
        request: &WithdrawalRequest,
        available_points: u64,
    ) -> Result<WithdrawalReceipt, WithdrawalError> {
        let address = request.wallet_address.trim();
        if address.is_empty() {
            return Err(WithdrawalError::MissingAddress);
        }
        if request.points < self.config.min_points {
            return Err(WithdrawalError::BelowMinimum {
                min: self.config.min_points,
                requested: request.points,
            });
        }
        if request.points > available_points {
            return Err(WithdrawalError::ExceedsBalance {
                requested: request.points,
                available: available_points,
            });
        }

        let quote = self.quote(request.points);
        let receipt = WithdrawalReceipt {
            id: Uuid::new_v4(),
            wallet_address: address.to_string(),
            points: request.points,
            amount: quote.amount,
            currency: quote.currency,
            submitted_at: Utc::now(),
        };
        info!(
            id = %receipt.id,
            points = receipt.points,
            amount = %quote.display,
            "Withdrawal request submitted"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desk() -> WithdrawalDesk {
        WithdrawalDesk::new(WithdrawalConfig::default())
    }

    fn request(address: &str, points: u64) -> WithdrawalRequest {
        WithdrawalRequest {
            wallet_address: address.to_string(),
            points,
        }
    }

    #[test]
    fn test_quote() {
        let quote = desk().quote(1250);
        assert!((quote.amount - 0.125).abs() < 1e-12);
        assert_eq!(quote.display, "0.1250 TON");
        assert_eq!(desk().quote(0).display, "0.0000 TON");
    }

    #[test]
    fn test_submit_accepts_valid_request() {
        let receipt = desk().submit(&request(" UQabc123 ", 1000), 1250).unwrap();
        assert_eq!(receipt.wallet_address, "UQabc123");
        assert_eq!(receipt.points, 1000);
        assert!((receipt.amount - 0.1).abs() < 1e-12);
        assert_eq!(receipt.currency, "TON");
    }

    #[test]
    fn test_submit_rejections() {
        let desk = desk();
        assert_eq!(
            desk.submit(&request("  ", 1000), 5000).unwrap_err(),
            WithdrawalError::MissingAddress
        );
        assert_eq!(
            desk.submit(&request("UQ1", 999), 5000).unwrap_err(),
            WithdrawalError::BelowMinimum { min: 1000, requested: 999 }
        );
        assert_eq!(
            desk.submit(&request("UQ1", 2000), 1250).unwrap_err(),
            WithdrawalError::ExceedsBalance { requested: 2000, available: 1250 }
        );
    }
}
