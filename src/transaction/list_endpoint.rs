//! Defines the endpoints for listing transactions, flat or grouped by date.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState,
    ledger::TransactionCache,
    transaction::{TransactionFilter, group_by_date},
};

/// The state needed to list transactions.
///
/// List reads never touch the database; they consume a snapshot of the
/// in-memory ledger cache.
#[derive(Clone)]
pub struct ListTransactionsState {
    /// The in-memory transaction list.
    pub ledger: Arc<Mutex<TransactionCache>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// The filter query parameters shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Comma-separated category names to keep. Empty means no filter.
    categories: Option<String>,
    /// Comma-separated type labels among All, Income, Expense, Transfer.
    types: Option<String>,
}

impl ListParams {
    fn filter(&self) -> Result<TransactionFilter, crate::Error> {
        TransactionFilter::parse(self.categories.as_deref(), self.types.as_deref())
    }
}

/// A route handler for the flat transaction list, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(params): Query<ListParams>,
) -> Response {
    let filter = match params.filter() {
        Ok(filter) => filter,
        Err(error) => return error.into_response(),
    };

    let snapshot = state.ledger.lock().unwrap().snapshot();

    Json(filter.apply(snapshot)).into_response()
}

/// A route handler for the transaction list bucketed by calendar date.
pub async fn get_grouped_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Query(params): Query<ListParams>,
) -> Response {
    let filter = match params.filter() {
        Ok(filter) => filter,
        Err(error) => return error.into_response(),
    };

    let snapshot = state.ledger.lock().unwrap().snapshot();

    Json(group_by_date(filter.apply(snapshot))).into_response()
}

#[cfg(test)]
mod list_transactions_endpoint_tests {
    use axum::{
        extract::{FromRef, Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        AppState,
        ledger::test_fixtures::{expense, income, transfer},
        transaction::Source,
    };

    use super::{ListParams, ListTransactionsState, get_transactions_endpoint};

    fn get_test_app_state() -> AppState {
        let connection = Connection::open_in_memory().unwrap();
        AppState::new(connection).unwrap()
    }

    fn params(categories: Option<&str>, types: Option<&str>) -> Query<ListParams> {
        Query(ListParams {
            categories: categories.map(str::to_owned),
            types: types.map(str::to_owned),
        })
    }

    #[tokio::test]
    async fn type_filter_narrows_the_list() {
        let app_state = get_test_app_state();
        {
            let mut ledger = app_state.ledger.lock().unwrap();
            ledger.insert(income(1000.0, Some(Source::Wallet)));
            ledger.insert(expense(300.0, Some(Source::Wallet)));
            ledger.insert(transfer(200.0, Source::Wallet, "Wallet → Bank"));
        }

        let response = get_transactions_endpoint(
            State(ListTransactionsState::from_ref(&app_state)),
            params(None, Some("Transfer")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_type_label_is_a_bad_request() {
        let app_state = get_test_app_state();

        let response = get_transactions_endpoint(
            State(ListTransactionsState::from_ref(&app_state)),
            params(None, Some("Budget")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
