//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, category::create_category_table, goal::create_goal_table,
    transaction::create_transaction_table,
};

/// Create the tables for the domain models.
///
/// Tables are created inside a single exclusive transaction so that a
/// half-initialized database is never observable.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is some other
/// SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign keys are off by default in SQLite.
    connection.pragma_update(None, "foreign_keys", true)?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_category_table(&sql_transaction)?;
    create_transaction_table(&sql_transaction)?;
    create_goal_table(&sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}
