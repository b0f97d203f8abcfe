//! Defines the endpoint for updating an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    feed::{ChangeFeed, Table},
    ledger::TransactionCache,
    transaction::{
        TransactionBuilder,
        core::{get_transaction, update_transaction},
    },
};

/// The state needed to update a transaction.
#[derive(Clone)]
pub struct UpdateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The in-memory list write handlers update optimistically.
    pub ledger: Arc<Mutex<TransactionCache>>,
    /// The feed that announces every successful write.
    pub change_feed: ChangeFeed,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ledger: state.ledger.clone(),
            change_feed: state.change_feed.clone(),
        }
    }
}

/// A route handler for overwriting a transaction with new contents.
///
/// The update event carries both row versions, so the previous row is read
/// before the overwrite.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(builder): Json<TransactionBuilder>,
) -> Response {
    let (before, after) = {
        let connection = state.db_connection.lock().unwrap();

        let before = match get_transaction(transaction_id, &connection) {
            Ok(before) => before,
            Err(Error::NotFound) => return Error::UpdateMissingTransaction.into_response(),
            Err(error) => return error.into_response(),
        };

        match update_transaction(transaction_id, builder, &connection) {
            Ok(after) => (before, after),
            Err(error) => return error.into_response(),
        }
    };

    state.ledger.lock().unwrap().update(after.clone());

    if let Err(error) = state
        .change_feed
        .updated(Table::Transaction, &before, &after)
    {
        tracing::error!("could not publish update event: {error}");
    }

    Json(after).into_response()
}

#[cfg(test)]
mod update_transaction_endpoint_tests {
    use axum::{
        Json,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState,
        feed::ChangeKind,
        transaction::{Transaction, TransactionKind, core::create_transaction},
    };

    use super::{UpdateTransactionState, update_transaction_endpoint};

    fn get_test_app_state() -> AppState {
        let connection = Connection::open_in_memory().unwrap();
        AppState::new(connection).unwrap()
    }

    #[tokio::test]
    async fn overwrites_the_row_and_the_cache() {
        let app_state = get_test_app_state();
        let transaction = {
            let connection = app_state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build(TransactionKind::Expense, 5.0, date!(2025 - 10 - 04), "Tea"),
                &connection,
            )
            .unwrap()
        };
        app_state.ledger.lock().unwrap().insert(transaction.clone());

        let response = update_transaction_endpoint(
            State(UpdateTransactionState::from_ref(&app_state)),
            Path(transaction.id),
            Json(Transaction::build(
                TransactionKind::Expense,
                7.5,
                date!(2025 - 10 - 04),
                "Coffee",
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = app_state.ledger.lock().unwrap().snapshot();
        assert_eq!(snapshot[0].title, "Coffee");
        assert_eq!(snapshot[0].amount, 7.5);

        let page = app_state.change_feed.events_after(0);
        assert_eq!(page.events[0].kind, ChangeKind::Update);
        assert!(page.events[0].before.is_some());
        assert!(page.events[0].after.is_some());
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let app_state = get_test_app_state();

        let response = update_transaction_endpoint(
            State(UpdateTransactionState::from_ref(&app_state)),
            Path(1337),
            Json(Transaction::build(
                TransactionKind::Income,
                1.0,
                date!(2025 - 10 - 04),
                "Ghost",
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
