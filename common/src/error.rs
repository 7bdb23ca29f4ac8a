//! Error types for Passbook ledger operations.

use crate::{AccountName, Amount};
use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Amount argument is negative.
    #[error("Invalid amount: must not be negative, got {amount}")]
    InvalidAmount { amount: Amount },

    /// Amount exceeds the balance of the account being debited.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    /// No account with this name exists.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountName),

    /// Crediting the amount would overflow the balance.
    #[error("Balance overflow: {balance} + {amount}")]
    BalanceOverflow { balance: Amount, amount: Amount },

    /// Recorded history does not replay to the recorded balances.
    #[error("Integrity violation in account {account}: {detail}")]
    IntegrityViolation { account: AccountName, detail: String },

    /// Persistence read/write failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence encode/decode failure.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Check if this error is a rejected request that left all state untouched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount { .. }
                | LedgerError::InsufficientFunds { .. }
                | LedgerError::AccountNotFound(_)
                | LedgerError::BalanceOverflow { .. }
        )
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount { .. } => "INVALID_AMOUNT",
            LedgerError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            LedgerError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            LedgerError::BalanceOverflow { .. } => "BALANCE_OVERFLOW",
            LedgerError::IntegrityViolation { .. } => "INTEGRITY_VIOLATION",
            LedgerError::Io(_) => "IO_ERROR",
            LedgerError::Encoding(_) => "ENCODING_ERROR",
            LedgerError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
