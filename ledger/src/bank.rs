//! Account registry.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use passbook_common::{AccountName, Amount, LedgerError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::account::{self, Account};

/// Owns every account, keyed by name.
///
/// The bank is a plain value: construct it at startup and pass it to
/// whatever needs it. Lookups hand out borrows of the stored account, so
/// all callers observe the same balance and history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bank {
    accounts: BTreeMap<AccountName, Account>,
}

impl Bank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh account, replacing any existing account of that name.
    pub fn create_account(&mut self, name: impl Into<AccountName>) -> &mut Account {
        match self.accounts.entry(name.into()) {
            Entry::Occupied(mut occupied) => {
                let fresh = Account::new(occupied.key().clone());
                let previous = occupied.insert(fresh);
                warn!(
                    account = %occupied.key(),
                    discarded_balance = previous.balance(),
                    discarded_entries = previous.history().len(),
                    "Replaced existing account"
                );
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => {
                debug!(account = %vacant.key(), "Account created");
                let account = Account::new(vacant.key().clone());
                vacant.insert(account)
            }
        }
    }

    /// Look up an account by name.
    pub fn get_account(&self, name: &str) -> Result<&Account> {
        self.accounts
            .get(name)
            .ok_or_else(|| LedgerError::AccountNotFound(AccountName::new(name)))
    }

    /// Look up an account by name for mutation.
    pub fn get_account_mut(&mut self, name: &str) -> Result<&mut Account> {
        self.accounts
            .get_mut(name)
            .ok_or_else(|| LedgerError::AccountNotFound(AccountName::new(name)))
    }

    /// Check whether an account exists.
    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if the bank has no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Iterate over accounts in name order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Sum of all balances.
    pub fn total_funds(&self) -> i128 {
        self.accounts.values().map(|a| i128::from(a.balance())).sum()
    }

    /// Deposit into the named account.
    pub fn deposit(&mut self, name: &str, amount: Amount) -> Result<Amount> {
        self.get_account_mut(name)?.deposit(amount)
    }

    /// Withdraw from the named account.
    pub fn withdraw(&mut self, name: &str, amount: Amount) -> Result<Amount> {
        self.get_account_mut(name)?.withdraw(amount)
    }

    /// Transfer between two named accounts and return both new balances.
    ///
    /// Nothing is mutated unless both names resolve. Transferring
    /// from an account to itself debits and then credits the same account:
    /// the balance is unchanged and two entries are recorded.
    pub fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<(Amount, Amount)> {
        if from == to {
            let account = self.get_account_mut(from)?;
            account.check_debit(amount)?;
            account.apply_debit(amount);
            let balance = account.apply_credit(amount);
            return Ok((balance, balance));
        }

        let (key, mut source) = self
            .accounts
            .remove_entry(from)
            .ok_or_else(|| LedgerError::AccountNotFound(AccountName::new(from)))?;

        let result = match self.accounts.get_mut(to) {
            Some(dest) => account::transfer(&mut source, dest, amount),
            None => Err(LedgerError::AccountNotFound(AccountName::new(to))),
        };

        self.accounts.insert(key, source);
        result
    }

    /// Verify every account's history against its balance.
    pub fn verify_integrity(&self) -> Result<()> {
        for (name, account) in &self.accounts {
            if name != account.name() {
                return Err(LedgerError::IntegrityViolation {
                    account: name.clone(),
                    detail: format!("stored under a different name than {}", account.name()),
                });
            }
            account.verify_history()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::LedgerEntry;

    #[test]
    fn test_create_and_get() {
        let mut bank = Bank::new();
        assert!(bank.is_empty());

        bank.create_account("Pike").deposit(100).unwrap();

        let pike = bank.get_account("Pike").unwrap();
        assert_eq!(pike.name().as_str(), "Pike");
        assert_eq!(pike.balance(), 100);
        assert_eq!(bank.len(), 1);
        assert!(bank.contains("Pike"));
    }

    #[test]
    fn test_get_missing_account() {
        let bank = Bank::new();
        match bank.get_account("Nobody").unwrap_err() {
            LedgerError::AccountNotFound(name) => assert_eq!(name.as_str(), "Nobody"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_create_overwrites() {
        let mut bank = Bank::new();
        bank.create_account("Pike").deposit(100).unwrap();

        let fresh = bank.create_account("Pike");
        assert_eq!(fresh.balance(), 0);
        assert!(fresh.history().is_empty());
        assert_eq!(bank.get_account("Pike").unwrap().balance(), 0);
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn test_lookups_share_state() {
        let mut bank = Bank::new();
        bank.create_account("Pike");

        bank.get_account_mut("Pike").unwrap().deposit(10).unwrap();
        bank.deposit("Pike", 5).unwrap();

        assert_eq!(bank.get_account("Pike").unwrap().balance(), 15);
    }

    #[test]
    fn test_named_transfer() {
        let mut bank = Bank::new();
        bank.create_account("A");
        bank.create_account("B");
        bank.deposit("A", 200).unwrap();

        assert_eq!(bank.transfer("A", "B", 200).unwrap(), (0, 200));
        assert!(matches!(
            bank.transfer("A", "B", 200).unwrap_err(),
            LedgerError::InsufficientFunds { .. }
        ));
        assert_eq!(bank.get_account("A").unwrap().balance(), 0);
        assert_eq!(bank.get_account("B").unwrap().balance(), 200);
    }

    #[test]
    fn test_transfer_to_missing_account_changes_nothing() {
        let mut bank = Bank::new();
        bank.create_account("A").deposit(50).unwrap();

        assert!(matches!(
            bank.transfer("A", "Ghost", 10).unwrap_err(),
            LedgerError::AccountNotFound(_)
        ));
        assert!(matches!(
            bank.transfer("Ghost", "A", 10).unwrap_err(),
            LedgerError::AccountNotFound(_)
        ));

        let a = bank.get_account("A").unwrap();
        assert_eq!(a.balance(), 50);
        assert_eq!(a.history().len(), 1);
    }

    #[test]
    fn test_self_transfer() {
        let mut bank = Bank::new();
        bank.create_account("A").deposit(80).unwrap();

        assert_eq!(bank.transfer("A", "A", 30).unwrap(), (80, 80));
        assert_eq!(
            bank.get_account("A").unwrap().history(),
            &[
                LedgerEntry::credit(80, 80),
                LedgerEntry::debit(30, 50),
                LedgerEntry::credit(30, 80),
            ]
        );

        assert!(matches!(
            bank.transfer("A", "A", 81).unwrap_err(),
            LedgerError::InsufficientFunds { .. }
        ));
        assert_eq!(bank.get_account("A").unwrap().history().len(), 3);
    }

    #[test]
    fn test_total_funds_and_integrity() {
        let mut bank = Bank::new();
        bank.create_account("A").deposit(120).unwrap();
        bank.create_account("B").deposit(30).unwrap();
        bank.transfer("A", "B", 20).unwrap();
        bank.withdraw("B", 10).unwrap();

        assert_eq!(bank.total_funds(), 140);
        assert!(bank.verify_integrity().is_ok());

        let names: Vec<_> = bank.accounts().map(|a| a.name().as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_verify_integrity_rejects_name_mismatch() {
        let mut bank = Bank::new();
        bank.create_account("Pike").deposit(100).unwrap();
        assert!(bank.verify_integrity().is_ok());

        bank.accounts
            .insert(AccountName::new("Thompson"), Account::new("Griesemer"));
        match bank.verify_integrity().unwrap_err() {
            LedgerError::IntegrityViolation { account, .. } => {
                assert_eq!(account.as_str(), "Thompson")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
