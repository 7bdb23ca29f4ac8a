//! Passbook Common Types
//!
//! Shared types used across the Passbook workspace: the account name
//! identifier, the amount type and the ledger error.

pub mod identifiers;
pub mod error;

pub use identifiers::*;
pub use error::*;

/// Whole-unit signed amount used for balances and ledger entries.
pub type Amount = i64;
