use thiserror::Error;

use crate::domain::{Cents, InvalidPin, ParseCentsError, format_cents};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid PIN format: must be exactly 4 digits")]
    InvalidFormat,

    #[error("Invalid recipient: a phone number is required")]
    InvalidRecipient,

    #[error("Insufficient funds: balance {}, required {}", format_cents(*balance), format_cents(*required))]
    InsufficientFunds { balance: Cents, required: Cents },

    #[error("Amount {} exceeds the per-transfer limit of {}", format_cents(*requested), format_cents(*limit))]
    OverLimit { limit: Cents, requested: Cents },

    #[error("Incorrect PIN ({attempts_remaining} attempt(s) remaining)")]
    AuthRejected { attempts_remaining: u32 },

    #[error("Account locked after too many incorrect PIN attempts")]
    AuthLocked,
}

impl LedgerError {
    /// Returns true if the session cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::AuthLocked)
    }
}

impl From<ParseCentsError> for LedgerError {
    fn from(err: ParseCentsError) -> Self {
        LedgerError::InvalidAmount(err.to_string())
    }
}

impl From<InvalidPin> for LedgerError {
    fn from(_: InvalidPin) -> Self {
        LedgerError::InvalidFormat
    }
}
