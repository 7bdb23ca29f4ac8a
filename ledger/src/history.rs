//! Forward-only replay of an account's history.

use std::iter::FusedIterator;

use passbook_common::Amount;

use crate::journal::LedgerEntry;

/// One step of a history replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStep {
    /// Signed amount of the entry.
    pub amount: Amount,
    /// Balance after the entry was applied.
    pub resulting_balance: Amount,
    /// False exactly on the last entry of the snapshot.
    pub has_more: bool,
}

/// Single-pass cursor over a point-in-time copy of an account's history.
///
/// Mutations made to the account after the reader was created are not
/// visible through it. Once exhausted it keeps returning `None`; create a
/// new reader to replay again.
#[derive(Debug, Clone)]
pub struct HistoryReader {
    entries: Vec<LedgerEntry>,
    position: usize,
}

impl HistoryReader {
    pub(crate) fn new(entries: Vec<LedgerEntry>) -> Self {
        Self {
            entries,
            position: 0,
        }
    }

    /// Number of entries not yet read.
    pub fn remaining(&self) -> usize {
        self.entries.len() - self.position
    }
}

impl Iterator for HistoryReader {
    type Item = HistoryStep;

    fn next(&mut self) -> Option<HistoryStep> {
        let entry = self.entries.get(self.position)?;
        self.position += 1;

        Some(HistoryStep {
            amount: entry.amount,
            resulting_balance: entry.resulting_balance,
            has_more: self.position < self.entries.len(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HistoryReader {}

impl FusedIterator for HistoryReader {}
