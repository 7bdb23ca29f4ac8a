//! Ledger entries recorded on every balance mutation.

use passbook_common::Amount;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    /// Credit entry (increases the balance).
    Credit,
    /// Debit entry (decreases the balance).
    Debit,
}

/// A single entry in an account's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Signed amount. Positive for credits, negative for debits.
    pub amount: Amount,
    /// Balance immediately after this entry was applied.
    pub resulting_balance: Amount,
}

impl LedgerEntry {
    /// Create a credit entry.
    pub fn credit(amount: Amount, resulting_balance: Amount) -> Self {
        Self {
            amount,
            resulting_balance,
        }
    }

    /// Create a debit entry. `amount` is the unsigned withdrawn amount.
    pub fn debit(amount: Amount, resulting_balance: Amount) -> Self {
        Self {
            amount: -amount,
            resulting_balance,
        }
    }

    /// Get the entry type.
    ///
    /// Zero-amount entries count as credits.
    pub fn kind(&self) -> EntryType {
        if self.amount < 0 {
            EntryType::Debit
        } else {
            EntryType::Credit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kinds() {
        let credit = LedgerEntry::credit(100, 100);
        let debit = LedgerEntry::debit(40, 60);

        assert_eq!(credit.kind(), EntryType::Credit);
        assert_eq!(debit.kind(), EntryType::Debit);
        assert_eq!(debit.amount, -40);
        assert_eq!(LedgerEntry::credit(0, 60).kind(), EntryType::Credit);
    }
}
