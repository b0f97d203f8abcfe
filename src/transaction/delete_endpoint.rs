//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState,
    database_id::TransactionId,
    feed::{ChangeFeed, Table},
    ledger::TransactionCache,
    transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The in-memory list write handlers update optimistically.
    pub ledger: Arc<Mutex<TransactionCache>>,
    /// The feed that announces every successful write.
    pub change_feed: ChangeFeed,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ledger: state.ledger.clone(),
            change_feed: state.change_feed.clone(),
        }
    }
}

/// A route handler for deleting a transaction, returns the deleted row.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let transaction = {
        let connection = state.db_connection.lock().unwrap();

        match delete_transaction(transaction_id, &connection) {
            Ok(transaction) => transaction,
            Err(error) => return error.into_response(),
        }
    };

    state.ledger.lock().unwrap().remove(transaction.id);

    if let Err(error) = state.change_feed.deleted(Table::Transaction, &transaction) {
        tracing::error!("could not publish delete event: {error}");
    }

    Json(transaction).into_response()
}
