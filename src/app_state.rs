//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error, db::initialize, feed::ChangeFeed, ledger::TransactionCache,
    transaction::get_all_transactions,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The feed of row-level change events, published on every write.
    pub change_feed: ChangeFeed,

    /// The in-memory transaction list the read-side projections consume.
    pub ledger: Arc<Mutex<TransactionCache>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models, and perform the initial fetch of the transaction
    /// list into the ledger cache.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the initial
    /// fetch fails.
    pub fn new(db_connection: Connection) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let transactions = get_all_transactions(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            change_feed: ChangeFeed::new(),
            ledger: Arc::new(Mutex::new(TransactionCache::new(transactions))),
        })
    }
}
