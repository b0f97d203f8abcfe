//! Transaction fixtures shared by the projection tests.

use std::sync::atomic::{AtomicI64, Ordering};

use time::{Date, macros::date, macros::datetime};

use crate::{
    database_id::CategoryId,
    transaction::{PaymentMethod, Source, Transaction, TransactionKind},
};

// Fixture IDs start well above anything a test database will hand out, so
// fixture rows never collide with real rows in caches that mix both.
static NEXT_ID: AtomicI64 = AtomicI64::new(10_001);

fn base(kind: TransactionKind, amount: f64, source: Option<Source>) -> Transaction {
    Transaction {
        id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        title: String::new(),
        description: String::new(),
        amount,
        kind,
        payment_method: PaymentMethod::Cash,
        source,
        category_id: None,
        category_name: None,
        currency: "PKR".to_owned(),
        date: date!(2025 - 10 - 05),
        created_at: datetime!(2025-10-05 12:00 UTC),
        updated_at: datetime!(2025-10-05 12:00 UTC),
    }
}

pub(crate) fn income(amount: f64, source: Option<Source>) -> Transaction {
    base(TransactionKind::Income, amount, source)
}

pub(crate) fn expense(amount: f64, source: Option<Source>) -> Transaction {
    base(TransactionKind::Expense, amount, source)
}

pub(crate) fn transfer(amount: f64, from: Source, description: &str) -> Transaction {
    let mut transaction = base(TransactionKind::Expense, amount, Some(from));
    transaction.payment_method = PaymentMethod::Transfer;
    transaction.description = description.to_owned();
    transaction
}

pub(crate) fn in_category(
    mut transaction: Transaction,
    category_id: CategoryId,
    category_name: &str,
) -> Transaction {
    transaction.category_id = Some(category_id);
    transaction.category_name = Some(category_name.to_owned());
    transaction
}

pub(crate) fn dated(mut transaction: Transaction, date: Date) -> Transaction {
    transaction.date = date;
    transaction
}

pub(crate) fn titled(mut transaction: Transaction, title: &str) -> Transaction {
    transaction.title = title.to_owned();
    transaction
}
