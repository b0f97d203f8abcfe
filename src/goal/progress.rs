//! Derives a savings goal's progress from the transaction ledger.
//!
//! A goal with auto-update enabled and a linked category never trusts its
//! stored `current_amount`; its progress is recomputed from the flat
//! transaction list on every read. The stored amount only serves as the
//! manual baseline for goals without auto-tracking, and as the value the
//! update-progress dialog overwrites.

use serde::Serialize;

use crate::{
    goal::SavingsGoal,
    transaction::{PaymentMethod, Transaction, TransactionKind},
};

/// The outcome of the auto-progress calculation for one goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    /// The progress derived from the ledger, clamped to zero. Zero when
    /// auto-tracking is off.
    pub auto_calculated_amount: f64,
    /// Whether the derived amount should replace the stored baseline.
    pub should_auto_update: bool,
}

/// Derive a goal's progress from the transaction list.
///
/// Goals without auto-update or a linked category report zero and leave the
/// caller to fall back to the stored `current_amount`.
///
/// Goals linked to a category whose name contains "salary" (in any casing)
/// model "money left from salary after all spending": income in the linked
/// category minus every non-transfer expense, across all categories. Any
/// other linked category is scoped strictly to itself: income minus expense
/// within that one category.
///
/// The result is clamped to zero; progress is never negative.
pub fn auto_progress(goal: &SavingsGoal, transactions: &[Transaction]) -> GoalProgress {
    let linked_category_id = match (goal.auto_update, goal.linked_category_id) {
        (true, Some(linked_category_id)) => linked_category_id,
        _ => {
            return GoalProgress {
                auto_calculated_amount: 0.0,
                should_auto_update: false,
            };
        }
    };

    let linked_name = goal.linked_category_name.as_deref().unwrap_or_default();

    let total = if linked_name.to_lowercase().contains("salary") {
        let salary_income: f64 = transactions
            .iter()
            .filter(|transaction| {
                transaction.kind == TransactionKind::Income
                    && transaction.category_id == Some(linked_category_id)
            })
            .map(|transaction| transaction.amount)
            .sum();

        let all_expenses: f64 = transactions
            .iter()
            .filter(|transaction| {
                transaction.kind == TransactionKind::Expense
                    && transaction.payment_method != PaymentMethod::Transfer
            })
            .map(|transaction| transaction.amount)
            .sum();

        salary_income - all_expenses
    } else {
        transactions
            .iter()
            .filter(|transaction| transaction.category_id == Some(linked_category_id))
            .map(|transaction| match transaction.kind {
                TransactionKind::Income => transaction.amount,
                TransactionKind::Expense => -transaction.amount,
            })
            .sum()
    };

    GoalProgress {
        auto_calculated_amount: total.max(0.0),
        should_auto_update: true,
    }
}

/// The percentage of the target reached, clamped to `[0, 100]`.
///
/// A target of zero or less reports 0 rather than dividing by zero.
pub fn progress_percent(current_amount: f64, target_amount: f64) -> f64 {
    if target_amount <= 0.0 {
        return 0.0;
    }

    (current_amount / target_amount * 100.0).min(100.0)
}

/// How much is still missing from the target, never negative.
pub fn remaining_amount(current_amount: f64, target_amount: f64) -> f64 {
    (target_amount - current_amount).max(0.0)
}

/// A goal as returned by the API: the stored row plus its derived progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalView {
    /// The stored goal.
    #[serde(flatten)]
    pub goal: SavingsGoal,
    /// The progress derived from the ledger.
    pub auto_calculated_amount: f64,
    /// Whether the derived amount replaces the stored baseline.
    pub should_auto_update: bool,
    /// The amount progress is measured from: the derived amount for
    /// auto-tracked goals, the stored baseline otherwise. The
    /// update-progress dialog pre-fills this value.
    pub effective_amount: f64,
    /// [progress_percent] of the effective amount.
    pub progress_percent: f64,
    /// [remaining_amount] of the effective amount.
    pub remaining_amount: f64,
}

/// Combine a stored goal with its derived progress.
pub fn goal_view(goal: SavingsGoal, transactions: &[Transaction]) -> GoalView {
    let progress = auto_progress(&goal, transactions);
    let effective_amount = if progress.should_auto_update {
        progress.auto_calculated_amount
    } else {
        goal.current_amount
    };

    GoalView {
        progress_percent: progress_percent(effective_amount, goal.target_amount),
        remaining_amount: remaining_amount(effective_amount, goal.target_amount),
        auto_calculated_amount: progress.auto_calculated_amount,
        should_auto_update: progress.should_auto_update,
        effective_amount,
        goal,
    }
}
