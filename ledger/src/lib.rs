//! Passbook Ledger
//!
//! In-memory bank-account ledger: named accounts, deposits, withdrawals,
//! transfers, history replay and whole-bank persistence.
//!
//! # Example
//!
//! ```rust
//! use passbook_ledger::Bank;
//!
//! let mut bank = Bank::new();
//! bank.create_account("A").deposit(200)?;
//! bank.create_account("B");
//!
//! assert_eq!(bank.transfer("A", "B", 200)?, (0, 200));
//!
//! for step in bank.get_account("B")?.history_reader() {
//!     println!("{} -> {} (more: {})", step.amount, step.resulting_balance, step.has_more);
//! }
//! # Ok::<(), passbook_ledger::LedgerError>(())
//! ```

pub mod account;
pub mod bank;
pub mod config;
pub mod history;
pub mod journal;
#[cfg(feature = "persistence")]
pub mod store;

pub use account::{transfer, Account};
pub use bank::Bank;
pub use config::LedgerConfig;
pub use history::{HistoryReader, HistoryStep};
pub use journal::{EntryType, LedgerEntry};
#[cfg(feature = "persistence")]
pub use store::FileStore;

pub use passbook_common::{AccountName, Amount, LedgerError, Result};
