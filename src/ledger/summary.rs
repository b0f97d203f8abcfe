//! Derives the top-level dashboard summary from the transaction ledger.

use serde::Serialize;

use crate::transaction::{PaymentMethod, Transaction, TransactionKind};

/// The lifetime income, expense, and net balance across all transactions.
///
/// Transfers are excluded from the expense total: moving money between
/// sources is not a net outflow from the household. No date windowing is
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    /// Sum of all income amounts.
    pub income: f64,
    /// Sum of all non-transfer expense amounts.
    pub expense: f64,
    /// `income - expense`.
    pub balance: f64,
}

/// Project the transaction list into a [Summary].
pub fn project_summary(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => summary.income += transaction.amount,
            TransactionKind::Expense => {
                if transaction.payment_method != PaymentMethod::Transfer {
                    summary.expense += transaction.amount;
                }
            }
        }
    }

    summary.balance = summary.income - summary.expense;

    summary
}
