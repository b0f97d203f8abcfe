//! Groups transactions into per-date display buckets.

use serde::Serialize;
use time::{Date, format_description::FormatItem, macros::format_description};

use crate::transaction::Transaction;

/// The transactions that fall on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateGroup {
    /// The calendar date the bucket is keyed by.
    pub date: Date,
    /// The date formatted for display, e.g. "October 5, 2025".
    pub label: String,
    /// The bucket's transactions, in the order they appeared in the input.
    pub transactions: Vec<Transaction>,
}

const DATE_LABEL_FORMAT: &[FormatItem<'_>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Bucket transactions by calendar date for display segmentation.
///
/// Buckets appear in the order each date is first seen in the input, which
/// keeps a newest-first list rendering newest-first. Purely a display
/// concern; nothing downstream consumes the buckets.
pub fn group_by_date(transactions: Vec<Transaction>) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();

    for transaction in transactions {
        let group = match groups
            .iter_mut()
            .find(|group| group.date == transaction.date)
        {
            Some(group) => group,
            None => {
                groups.push(DateGroup {
                    date: transaction.date,
                    label: format_date_label(transaction.date),
                    transactions: Vec::new(),
                });
                groups.last_mut().expect("group just added")
            }
        };

        group.transactions.push(transaction);
    }

    groups
}

fn format_date_label(date: Date) -> String {
    date.format(DATE_LABEL_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod group_by_date_tests {
    use time::macros::date;

    use crate::ledger::test_fixtures::{dated, expense, income, titled};

    use super::group_by_date;

    #[test]
    fn buckets_preserve_first_occurrence_order() {
        let transactions = vec![
            dated(titled(expense(17.99, None), "Netflix"), date!(2025 - 10 - 05)),
            dated(titled(income(10_548.12, None), "Salary"), date!(2025 - 10 - 05)),
            dated(titled(expense(347.50, None), "Car payment"), date!(2025 - 10 - 04)),
            // Out-of-order date: joins its existing bucket, not a new one.
            dated(titled(expense(27.19, None), "Food"), date!(2025 - 10 - 05)),
        ];

        let groups = group_by_date(transactions);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, date!(2025 - 10 - 05));
        assert_eq!(groups[1].date, date!(2025 - 10 - 04));

        let titles: Vec<_> = groups[0]
            .transactions
            .iter()
            .map(|transaction| transaction.title.as_str())
            .collect();
        assert_eq!(titles, ["Netflix", "Salary", "Food"]);
    }

    #[test]
    fn labels_are_human_readable() {
        let transactions = vec![dated(expense(1.0, None), date!(2025 - 10 - 05))];

        let groups = group_by_date(transactions);

        assert_eq!(groups[0].label, "October 5, 2025");
    }

    #[test]
    fn empty_input_produces_no_buckets() {
        assert!(group_by_date(Vec::new()).is_empty());
    }
}
