//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brought money in or took money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money earned, credited to a source.
    Income,
    /// Money spent, debited from a source.
    Expense,
}

impl TransactionKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

/// How an expense was paid.
///
/// Only meaningful for expenses. A transfer between sources is stored as a
/// single expense with [PaymentMethod::Transfer], never as a double-entry
/// pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid with cash.
    #[default]
    Cash,
    /// Paid on credit.
    Credit,
    /// A movement of funds between two sources.
    Transfer,
}

impl PaymentMethod {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Transfer => "transfer",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "cash" => Some(PaymentMethod::Cash),
            "credit" => Some(PaymentMethod::Credit),
            "transfer" => Some(PaymentMethod::Transfer),
            _ => None,
        }
    }
}

/// A notional bucket of money whose balance is derived from the ledger, not
/// stored.
///
/// For income this is where the money landed; for expenses and transfers it
/// is where the money was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Physical cash on hand.
    Wallet,
    /// A bank account.
    Bank,
    /// A digital wallet such as a mobile payments app.
    DigitalWallet,
}

impl Source {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Source::Wallet => "wallet",
            Source::Bank => "bank",
            Source::DigitalWallet => "digital_wallet",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "wallet" => Some(Source::Wallet),
            "bank" => Some(Source::Bank),
            "digital_wallet" => Some(Source::DigitalWallet),
            _ => None,
        }
    }

    /// The human-readable name used in transfer titles and descriptions.
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Wallet => "Wallet",
            Source::Bank => "Bank",
            Source::DigitalWallet => "Digital Wallet",
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

macro_rules! impl_text_column {
    ($type:ty) => {
        impl ToSql for $type {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $type {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()
                    .and_then(|text| Self::parse(text).ok_or(FromSqlError::InvalidType))
            }
        }
    };
}

impl_text_column!(TransactionKind);
impl_text_column!(PaymentMethod);
impl_text_column!(Source);

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The category name is denormalized onto each row by the list queries so
/// that read-side projections (filters, goal progress) can work from the
/// flat transaction list alone.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short human-readable label for the transaction.
    pub title: String,
    /// A text description of what the transaction was for.
    ///
    /// For transfers, this encodes the destination source, e.g.
    /// "Transfer from Wallet to Bank".
    pub description: String,
    /// The amount of money spent or earned in this transaction. Never
    /// negative.
    pub amount: f64,
    /// Whether this transaction is an income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// How an expense was paid. [PaymentMethod::Transfer] marks a transfer.
    pub payment_method: PaymentMethod,
    /// The source the money landed in (income) or was drawn from (expense).
    ///
    /// Aggregation treats an absent source as [Source::Wallet].
    #[serde(rename = "income_source")]
    pub source: Option<Source>,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// The name of the transaction's category, joined onto the row.
    pub category_name: Option<String>,
    /// The currency code for the amount.
    pub currency: String,
    /// When the transaction happened.
    #[serde(rename = "transaction_date")]
    pub date: Date,
    /// When the transaction row was created.
    pub created_at: OffsetDateTime,
    /// When the transaction row was last updated.
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(kind: TransactionKind, amount: f64, date: Date, title: &str) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            description: String::new(),
            amount,
            kind,
            payment_method: PaymentMethod::default(),
            source: None,
            category_id: None,
            currency: default_currency(),
            date,
        }
    }
}

fn default_currency() -> String {
    "PKR".to_owned()
}

/// A builder for creating [Transaction] instances.
///
/// This is also the request body for the create and update endpoints, so
/// optional fields carry the same defaults the entry form applied: payment
/// method defaults to cash and the currency defaults to "PKR".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBuilder {
    /// A short human-readable label for the transaction.
    pub title: String,
    /// A text description of what the transaction was for.
    #[serde(default)]
    pub description: String,
    /// The monetary amount of the transaction. Must not be negative.
    pub amount: f64,
    /// Whether this transaction is an income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// How an expense was paid.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// The source the money landed in (income) or was drawn from (expense).
    #[serde(default, rename = "income_source")]
    pub source: Option<Source>,
    /// The category of the transaction, e.g. "Groceries", "Salary".
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The currency code for the amount.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// When the transaction happened.
    #[serde(rename = "transaction_date")]
    pub date: Date,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the payment method for the transaction.
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }

    /// Set the source for the transaction.
    pub fn source(mut self, source: Option<Source>) -> Self {
        self.source = source;
        self
    }

    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.amount < 0.0 {
            return Err(Error::NegativeAmount(self.amount));
        }

        let today = OffsetDateTime::now_utc().date();
        if self.date > today {
            return Err(Error::FutureDate(self.date));
        }

        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const JOINED_SELECT: &str = "SELECT \"transaction\".id, title, \"transaction\".description, \
     amount, kind, payment_method, source, category_id, category.name, currency, date, \
     \"transaction\".created_at, updated_at \
     FROM \"transaction\" LEFT JOIN category ON \"transaction\".category_id = category.id";

/// Create a new transaction in the database from a builder.
///
/// Amounts must not be negative and dates must be no later than today.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the amount is negative,
/// - or [Error::FutureDate] if the date is in the future,
/// - or [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let now = OffsetDateTime::now_utc();

    connection
        .execute(
            "INSERT INTO \"transaction\" \
             (title, description, amount, kind, payment_method, source, category_id, currency, \
              date, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            (
                &builder.title,
                &builder.description,
                builder.amount,
                builder.kind,
                builder.payment_method,
                builder.source,
                builder.category_id,
                &builder.currency,
                builder.date,
                now,
                now,
            ),
        )
        .map_err(|error| map_category_constraint(error, builder.category_id))?;

    get_transaction(connection.last_insert_rowid(), connection)
}

/// Retrieve a transaction from the database by its `id`, with its category
/// name joined on.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{JOINED_SELECT} WHERE \"transaction\".id = :id"))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all transactions, newest first, with category names joined on.
///
/// This is the flat list every read-side projection consumes.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{JOINED_SELECT} ORDER BY \"transaction\".created_at DESC, \"transaction\".id DESC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the transaction `id` with the contents of `builder`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a valid transaction,
/// - or any error from the same validations as [create_transaction].
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\" SET \
             title = ?1, description = ?2, amount = ?3, kind = ?4, payment_method = ?5, \
             source = ?6, category_id = ?7, currency = ?8, date = ?9, updated_at = ?10 \
             WHERE id = ?11",
            (
                &builder.title,
                &builder.description,
                builder.amount,
                builder.kind,
                builder.payment_method,
                builder.source,
                builder.category_id,
                &builder.currency,
                builder.date,
                OffsetDateTime::now_utc(),
                id,
            ),
        )
        .map_err(|error| map_category_constraint(error, builder.category_id))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    get_transaction(id, connection)
}

/// Delete the transaction `id` and return the deleted row.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = get_transaction(id, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        error => error,
    })?;

    connection.execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])?;

    Ok(transaction)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                amount REAL NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                payment_method TEXT NOT NULL DEFAULT 'cash'
                    CHECK (payment_method IN ('cash', 'credit', 'transfer')),
                source TEXT CHECK (source IN ('wallet', 'bank', 'digital_wallet')),
                category_id INTEGER,
                currency TEXT NOT NULL DEFAULT 'PKR',
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Composite index used by the date-windowed projections.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_category ON \"transaction\"(date, category_id);",
        (),
    )?;

    Ok(())
}

/// Map a joined database row to a Transaction.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        kind: row.get(4)?,
        payment_method: row.get(5)?,
        source: row.get(6)?,
        category_id: row.get(7)?,
        category_name: row.get(8)?,
        currency: row.get(9)?,
        date: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn map_category_constraint(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidCategory(category_id),
        error => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
