//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState,
    feed::{ChangeFeed, Table},
    ledger::TransactionCache,
    transaction::{TransactionBuilder, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The in-memory list write handlers update optimistically.
    pub ledger: Arc<Mutex<TransactionCache>>,
    /// The feed that announces every successful write.
    pub change_feed: ChangeFeed,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ledger: state.ledger.clone(),
            change_feed: state.change_feed.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// On success the new row is applied to the ledger cache ahead of the change
/// feed echo, announced on the feed, and returned as JSON.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Json(builder): Json<TransactionBuilder>,
) -> Response {
    let transaction = {
        let connection = state.db_connection.lock().unwrap();

        match create_transaction(builder, &connection) {
            Ok(transaction) => transaction,
            Err(error) => return error.into_response(),
        }
    };

    state.ledger.lock().unwrap().insert(transaction.clone());

    if let Err(error) = state.change_feed.inserted(Table::Transaction, &transaction) {
        tracing::error!("could not publish insert event: {error}");
    }

    (StatusCode::CREATED, Json(transaction)).into_response()
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use axum::{Json, extract::{FromRef, State}, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState,
        feed::{ChangeKind, Table},
        transaction::{Transaction, TransactionKind},
    };

    use super::{CreateTransactionState, create_transaction_endpoint};

    fn get_test_app_state() -> AppState {
        let connection = Connection::open_in_memory().unwrap();
        AppState::new(connection).unwrap()
    }

    #[tokio::test]
    async fn creates_and_announces_the_transaction() {
        let app_state = get_test_app_state();
        let builder = Transaction::build(
            TransactionKind::Income,
            1000.0,
            date!(2025 - 10 - 05),
            "Salary",
        );

        let response = create_transaction_endpoint(
            State(CreateTransactionState::from_ref(&app_state)),
            Json(builder),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let snapshot = app_state.ledger.lock().unwrap().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "Salary");

        let page = app_state.change_feed.events_after(0);
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].table, Table::Transaction);
        assert_eq!(page.events[0].kind, ChangeKind::Insert);
    }

    #[tokio::test]
    async fn rejects_negative_amounts_without_touching_the_cache() {
        let app_state = get_test_app_state();
        let builder = Transaction::build(
            TransactionKind::Expense,
            -5.0,
            date!(2025 - 10 - 05),
            "Backwards",
        );

        let response = create_transaction_endpoint(
            State(CreateTransactionState::from_ref(&app_state)),
            Json(builder),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app_state.ledger.lock().unwrap().snapshot().is_empty());
        assert!(app_state.change_feed.events_after(0).events.is_empty());
    }
}
