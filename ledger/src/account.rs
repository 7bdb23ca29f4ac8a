//! Accounts and the balance mutations applied to them.

use chrono::{DateTime, Utc};
use passbook_common::{AccountName, Amount, LedgerError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::HistoryReader;
use crate::journal::LedgerEntry;

/// A named account with a balance and its transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    name: AccountName,
    balance: Amount,
    history: Vec<LedgerEntry>,
    opened_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance and no history.
    pub fn new(name: impl Into<AccountName>) -> Self {
        Self {
            name: name.into(),
            balance: 0,
            history: Vec::new(),
            opened_at: Utc::now(),
        }
    }

    /// Account name.
    pub fn name(&self) -> &AccountName {
        &self.name
    }

    /// Current balance.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Recorded entries, oldest first.
    pub fn history(&self) -> &[LedgerEntry] {
        &self.history
    }

    /// When the account was created.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Add `amount` to the balance and return the new balance.
    pub fn deposit(&mut self, amount: Amount) -> Result<Amount> {
        self.check_credit(amount)?;
        Ok(self.apply_credit(amount))
    }

    /// Remove `amount` from the balance and return the new balance.
    ///
    /// On [`LedgerError::InsufficientFunds`] the error carries the
    /// unchanged balance as `available`.
    pub fn withdraw(&mut self, amount: Amount) -> Result<Amount> {
        self.check_debit(amount)?;
        Ok(self.apply_debit(amount))
    }

    /// Start a replay over a snapshot of the current history.
    pub fn history_reader(&self) -> HistoryReader {
        HistoryReader::new(self.history.clone())
    }

    /// Replay the history from zero and compare against recorded balances.
    ///
    /// Neither the balance nor any recorded intermediate balance may be
    /// negative.
    pub fn verify_history(&self) -> Result<()> {
        if self.balance < 0 {
            return Err(self.integrity_violation(format!("negative balance {}", self.balance)));
        }

        let mut running: Amount = 0;

        for (index, entry) in self.history.iter().enumerate() {
            running = running.checked_add(entry.amount).ok_or_else(|| {
                self.integrity_violation(format!("entry {} overflows the running sum", index))
            })?;

            if running != entry.resulting_balance {
                return Err(self.integrity_violation(format!(
                    "entry {} records balance {}, replay gives {}",
                    index, entry.resulting_balance, running
                )));
            }

            if running < 0 {
                return Err(self.integrity_violation(format!(
                    "entry {} leaves a negative balance {}",
                    index, running
                )));
            }
        }

        if running != self.balance {
            return Err(self.integrity_violation(format!(
                "balance is {}, replay gives {}",
                self.balance, running
            )));
        }

        Ok(())
    }

    pub(crate) fn check_credit(&self, amount: Amount) -> Result<()> {
        check_amount(amount)?;

        if self.balance.checked_add(amount).is_none() {
            debug!(account = %self.name, amount, balance = self.balance, "Credit rejected: overflow");
            return Err(LedgerError::BalanceOverflow {
                balance: self.balance,
                amount,
            });
        }

        Ok(())
    }

    pub(crate) fn check_debit(&self, amount: Amount) -> Result<()> {
        check_amount(amount)?;

        if amount > self.balance {
            debug!(
                account = %self.name,
                amount,
                balance = self.balance,
                "Debit rejected: insufficient funds"
            );
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }

        Ok(())
    }

    /// Caller must have passed `check_credit`.
    pub(crate) fn apply_credit(&mut self, amount: Amount) -> Amount {
        self.balance += amount;
        self.history.push(LedgerEntry::credit(amount, self.balance));
        debug!(account = %self.name, amount, balance = self.balance, "Credited");
        self.balance
    }

    /// Caller must have passed `check_debit`.
    pub(crate) fn apply_debit(&mut self, amount: Amount) -> Amount {
        self.balance -= amount;
        self.history.push(LedgerEntry::debit(amount, self.balance));
        debug!(account = %self.name, amount, balance = self.balance, "Debited");
        self.balance
    }

    fn integrity_violation(&self, detail: String) -> LedgerError {
        LedgerError::IntegrityViolation {
            account: self.name.clone(),
            detail,
        }
    }
}

/// Move `amount` from `source` to `dest` and return both new balances.
///
/// Either both accounts change or neither does.
pub fn transfer(source: &mut Account, dest: &mut Account, amount: Amount) -> Result<(Amount, Amount)> {
    source.check_debit(amount)?;
    dest.check_credit(amount)?;

    let source_balance = source.apply_debit(amount);
    let dest_balance = dest.apply_credit(amount);

    Ok((source_balance, dest_balance))
}

fn check_amount(amount: Amount) -> Result<()> {
    if amount < 0 {
        debug!(amount, "Rejected negative amount");
        return Err(LedgerError::InvalidAmount { amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with(name: &str, balance: Amount) -> Account {
        let mut account = Account::new(name);
        account.deposit(balance).unwrap();
        account
    }

    #[test]
    fn test_new_account() {
        let account = Account::new("Griesemer");
        assert_eq!(account.name().as_str(), "Griesemer");
        assert_eq!(account.balance(), 0);
        assert!(account.history().is_empty());
    }

    #[test]
    fn test_deposit() {
        let mut thompson = Account::new("Thompson");
        assert_eq!(thompson.deposit(60).unwrap(), 60);
        assert_eq!(thompson.deposit(39).unwrap(), 99);
        assert_eq!(
            thompson.history(),
            &[LedgerEntry::credit(60, 60), LedgerEntry::credit(39, 99)]
        );
    }

    #[test]
    fn test_negative_deposit_rejected() {
        let mut pike = account_with("Pike", 42);

        let err = pike.deposit(-1).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { amount: -1 }));
        assert_eq!(pike.balance(), 42);
        assert_eq!(pike.history(), &[LedgerEntry::credit(42, 42)]);
    }

    #[test]
    fn test_deposit_overflow_rejected() {
        let mut account = account_with("Pike", Amount::MAX);

        let err = account.deposit(1).unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow { .. }));
        assert_eq!(account.balance(), Amount::MAX);
        assert_eq!(account.history().len(), 1);
    }

    #[test]
    fn test_withdraw() {
        let mut griesemer = account_with("Griesemer", 100);
        assert_eq!(griesemer.withdraw(100).unwrap(), 0);

        let mut pike = account_with("Pike", 100);
        assert_eq!(pike.withdraw(42).unwrap(), 58);
        assert_eq!(pike.history().last(), Some(&LedgerEntry::debit(42, 58)));
    }

    #[test]
    fn test_withdraw_rejections_keep_balance() {
        let mut pike = account_with("Pike", 58);
        assert!(matches!(
            pike.withdraw(-1).unwrap_err(),
            LedgerError::InvalidAmount { .. }
        ));

        let mut thompson = account_with("Thompson", 100);
        match thompson.withdraw(101).unwrap_err() {
            LedgerError::InsufficientFunds {
                requested,
                available,
            } => {
                assert_eq!(requested, 101);
                assert_eq!(available, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(thompson.balance(), 100);
        assert_eq!(thompson.history().len(), 1);
    }

    #[test]
    fn test_transfer() {
        let mut griesemer = account_with("Griesemer", 100);
        let mut pike = account_with("Pike", 100);

        assert_eq!(transfer(&mut griesemer, &mut pike, 100).unwrap(), (0, 200));
        assert_eq!(griesemer.history().last(), Some(&LedgerEntry::debit(100, 0)));
        assert_eq!(pike.history().last(), Some(&LedgerEntry::credit(100, 200)));

        assert!(transfer(&mut griesemer, &mut pike, 100).is_err());
        assert_eq!((griesemer.balance(), pike.balance()), (0, 200));
    }

    #[test]
    fn test_transfer_rejections_touch_neither_account() {
        let mut pike = account_with("Pike", 200);
        let mut thompson = account_with("Thompson", 100);

        assert!(matches!(
            transfer(&mut pike, &mut thompson, 300).unwrap_err(),
            LedgerError::InsufficientFunds { .. }
        ));
        assert!(matches!(
            transfer(&mut pike, &mut thompson, -100).unwrap_err(),
            LedgerError::InvalidAmount { .. }
        ));

        let mut full = account_with("Full", Amount::MAX);
        assert!(matches!(
            transfer(&mut pike, &mut full, 1).unwrap_err(),
            LedgerError::BalanceOverflow { .. }
        ));

        assert_eq!((pike.balance(), thompson.balance()), (200, 100));
        assert_eq!(pike.history().len(), 1);
        assert_eq!(thompson.history().len(), 1);
        assert_eq!(full.history().len(), 1);
    }

    #[test]
    fn test_history_reader_is_snapshot() {
        let mut account = account_with("Pike", 100);
        let reader = account.history_reader();

        account.deposit(10).unwrap();

        assert_eq!(reader.count(), 1);
        assert_eq!(account.history_reader().count(), 2);
    }

    #[test]
    fn test_verify_history() {
        let mut account = account_with("Pike", 100);
        account.withdraw(30).unwrap();
        assert!(account.verify_history().is_ok());

        account.balance = 71;
        assert!(matches!(
            account.verify_history().unwrap_err(),
            LedgerError::IntegrityViolation { .. }
        ));

        account.balance = 70;
        account.history[0].resulting_balance = 99;
        assert!(account.verify_history().is_err());
    }

    #[test]
    fn test_verify_history_rejects_negative_balances() {
        let mut overdrawn = Account::new("Pike");
        overdrawn.balance = -5;
        overdrawn.history.push(LedgerEntry::debit(5, -5));
        assert!(matches!(
            overdrawn.verify_history().unwrap_err(),
            LedgerError::IntegrityViolation { .. }
        ));

        // Dips below zero mid-history, recovers by the end.
        let mut dipped = Account::new("Thompson");
        dipped.balance = 10;
        dipped.history.push(LedgerEntry::debit(5, -5));
        dipped.history.push(LedgerEntry::credit(15, 10));
        assert!(matches!(
            dipped.verify_history().unwrap_err(),
            LedgerError::IntegrityViolation { .. }
        ));
    }
}
