//! Economy error types

use thiserror::Error;

use super::account::{Currency, UserId};
use crate::save::StorageError;

/// Failures surfaced by engine operations
#[derive(Debug, Error)]
pub enum EconomyError {
    #[error("invalid amount {amount}: must be greater than zero")]
    InvalidAmount { amount: i64 },

    #[error("no economy account for user {0}")]
    AccountNotFound(UserId),

    #[error("economy account for user {0} already exists")]
    AccountExists(UserId),

    #[error("not enough EXP: requested {requested}, available {available}")]
    InsufficientExp { requested: u64, available: u64 },

    #[error("not enough {currency}: need {required}, have {available}")]
    InsufficientFunds { currency: Currency, required: u64, available: u64 },

    #[error("unknown reward: {0}")]
    UnknownReward(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EconomyError {
    /// How much is missing for an insufficient EXP or funds failure
    pub fn shortfall(&self) -> Option<u64> {
        match self {
            EconomyError::InsufficientExp { requested, available } => Some(requested - available),
            EconomyError::InsufficientFunds { required, available, .. } => Some(required - available),
            _ => None,
        }
    }

    /// Text to show the user
    pub fn user_message(&self) -> String {
        match self {
            EconomyError::InsufficientExp { .. } => {
                format!("You need {} more EXP for that.", self.shortfall().unwrap_or(0))
            }
            EconomyError::InsufficientFunds { currency, .. } => {
                format!("You need {} more {}.", self.shortfall().unwrap_or(0), currency)
            }
            EconomyError::UnknownReward(_) => "That reward is no longer available.".to_string(),
            EconomyError::Storage(_) => "Couldn't save your progress. Please try again.".to_string(),
            EconomyError::InvalidAmount { .. }
            | EconomyError::AccountNotFound(_)
            | EconomyError::AccountExists(_) => "Something went wrong.".to_string(),
        }
    }
}
