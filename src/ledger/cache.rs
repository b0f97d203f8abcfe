//! The in-memory transaction list the projections are computed over.
//!
//! Write handlers apply their changes here optimistically, immediately after
//! the store accepts them; the change-feed reconciler applies the echoed
//! event a second time. The merge policy makes the second application a
//! no-op: inserts are suppressed by ID, updates replace in place, deletes
//! remove by ID.

use crate::{
    database_id::TransactionId,
    feed::{ChangeEvent, ChangeKind, Table},
    transaction::Transaction,
};

/// The flat, newest-first transaction list plus a revision counter.
///
/// The revision increments on every effective mutation, so callers can key
/// caches of derived views by it instead of recomputing unconditionally.
#[derive(Debug, Default)]
pub struct TransactionCache {
    transactions: Vec<Transaction>,
    revision: u64,
}

impl TransactionCache {
    /// Create a cache holding `transactions`, assumed newest first.
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            revision: 0,
        }
    }

    /// A copy of the current list, for projections to consume without
    /// holding the cache lock.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    /// The identity of the current list; changes whenever the list does.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add `transaction` at the front unless a row with its ID is already
    /// present. Returns whether the list changed.
    pub fn insert(&mut self, transaction: Transaction) -> bool {
        let exists = self
            .transactions
            .iter()
            .any(|existing| existing.id == transaction.id);
        if exists {
            return false;
        }

        self.transactions.insert(0, transaction);
        self.revision += 1;
        true
    }

    /// Replace the row with `transaction`'s ID in place. Returns whether a
    /// row was replaced.
    pub fn update(&mut self, transaction: Transaction) -> bool {
        match self
            .transactions
            .iter_mut()
            .find(|existing| existing.id == transaction.id)
        {
            Some(existing) => {
                *existing = transaction;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Replace the whole list, newest first.
    ///
    /// Used after writes that change joined fields on many rows at once,
    /// e.g. renaming or deleting a category. Always counts as a mutation.
    pub fn replace(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
        self.revision += 1;
    }

    /// Remove the row with `id`. Returns whether a row was removed.
    pub fn remove(&mut self, id: TransactionId) -> bool {
        let length_before = self.transactions.len();
        self.transactions.retain(|existing| existing.id != id);

        let removed = self.transactions.len() != length_before;
        if removed {
            self.revision += 1;
        }
        removed
    }

    /// Fold a change event into the list.
    ///
    /// Events for other tables are ignored, as are payloads that do not
    /// parse as transactions (logged and skipped, never an error). Returns
    /// whether the list changed.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        if event.table != Table::Transaction {
            return false;
        }

        match event.kind {
            ChangeKind::Insert => match parse_row(event.after.as_ref()) {
                Some(transaction) => self.insert(transaction),
                None => false,
            },
            ChangeKind::Update => match parse_row(event.after.as_ref()) {
                Some(transaction) => self.update(transaction),
                None => false,
            },
            ChangeKind::Delete => match parse_row(event.before.as_ref()) {
                Some(transaction) => self.remove(transaction.id),
                None => false,
            },
        }
    }
}

fn parse_row(value: Option<&serde_json::Value>) -> Option<Transaction> {
    let value = value?;

    match serde_json::from_value(value.clone()) {
        Ok(transaction) => Some(transaction),
        Err(error) => {
            tracing::warn!("could not parse change event row payload: {error}");
            None
        }
    }
}
