//! Defines the JSON endpoints for category CRUD.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::core::{
        create_category, delete_category, get_all_categories, get_category, update_category,
    },
    category::{CategoryBuilder, CategoryId},
    feed::{ChangeFeed, Table},
    ledger::TransactionCache,
    transaction::get_all_transactions,
};

/// The state needed to serve the category endpoints.
#[derive(Clone)]
pub struct CategoryApiState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The in-memory transaction list, refreshed when a write changes the
    /// category names joined onto its rows.
    pub ledger: Arc<Mutex<TransactionCache>>,
    /// The feed that announces every successful write.
    pub change_feed: ChangeFeed,
}

impl FromRef<AppState> for CategoryApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ledger: state.ledger.clone(),
            change_feed: state.change_feed.clone(),
        }
    }
}

/// A route handler for listing all categories, alphabetically by name.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_categories_endpoint(State(state): State<CategoryApiState>) -> Response {
    let connection = state.db_connection.lock().unwrap();

    match get_all_categories(&connection) {
        Ok(categories) => Json(categories).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for creating a new category.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_category_endpoint(
    State(state): State<CategoryApiState>,
    Json(builder): Json<CategoryBuilder>,
) -> Response {
    let category = {
        let connection = state.db_connection.lock().unwrap();

        match create_category(builder, &connection) {
            Ok(category) => category,
            Err(error) => return error.into_response(),
        }
    };

    if let Err(error) = state.change_feed.inserted(Table::Category, &category) {
        tracing::error!("could not publish insert event: {error}");
    }

    (StatusCode::CREATED, Json(category)).into_response()
}

/// A route handler for renaming or restyling a category.
///
/// The joined `category_name` on cached transaction rows goes stale when a
/// category is renamed, so the ledger cache is reloaded from the store.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_category_endpoint(
    State(state): State<CategoryApiState>,
    Path(category_id): Path<CategoryId>,
    Json(builder): Json<CategoryBuilder>,
) -> Response {
    let (before, after) = {
        let connection = state.db_connection.lock().unwrap();

        let before = match get_category(category_id, &connection) {
            Ok(before) => before,
            Err(Error::NotFound) => return Error::UpdateMissingCategory.into_response(),
            Err(error) => return error.into_response(),
        };

        let after = match update_category(category_id, builder, &connection) {
            Ok(after) => after,
            Err(error) => return error.into_response(),
        };

        if let Err(error) = refresh_ledger(&connection, &state.ledger) {
            return error.into_response();
        }

        (before, after)
    };

    if let Err(error) = state.change_feed.updated(Table::Category, &before, &after) {
        tracing::error!("could not publish update event: {error}");
    }

    Json(after).into_response()
}

/// A route handler for deleting a category, returns the deleted row.
///
/// Transactions and goals keep their rows; the schema clears their category
/// references, so the ledger cache is reloaded from the store.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_category_endpoint(
    State(state): State<CategoryApiState>,
    Path(category_id): Path<CategoryId>,
) -> Response {
    let category = {
        let connection = state.db_connection.lock().unwrap();

        let category = match delete_category(category_id, &connection) {
            Ok(category) => category,
            Err(error) => return error.into_response(),
        };

        if let Err(error) = refresh_ledger(&connection, &state.ledger) {
            return error.into_response();
        }

        category
    };

    if let Err(error) = state.change_feed.deleted(Table::Category, &category) {
        tracing::error!("could not publish delete event: {error}");
    }

    Json(category).into_response()
}

fn refresh_ledger(
    connection: &Connection,
    ledger: &Mutex<TransactionCache>,
) -> Result<(), Error> {
    let transactions = get_all_transactions(connection)?;
    ledger.lock().unwrap().replace(transactions);

    Ok(())
}

#[cfg(test)]
mod category_endpoint_tests {
    use axum::{
        Json,
        extract::{FromRef, Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AppState,
        category::{CategoryBuilder, CategoryKind, core::create_category},
        feed::{ChangeKind, Table},
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    use super::{
        CategoryApiState, create_category_endpoint, delete_category_endpoint,
        update_category_endpoint,
    };

    fn get_test_app_state() -> AppState {
        let connection = Connection::open_in_memory().unwrap();
        AppState::new(connection).unwrap()
    }

    #[tokio::test]
    async fn creates_and_announces_the_category() {
        let app_state = get_test_app_state();

        let response = create_category_endpoint(
            State(CategoryApiState::from_ref(&app_state)),
            Json(CategoryBuilder::new("Groceries", CategoryKind::Expense)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let page = app_state.change_feed.events_after(0);
        assert_eq!(page.events[0].table, Table::Category);
        assert_eq!(page.events[0].kind, ChangeKind::Insert);
    }

    #[tokio::test]
    async fn empty_name_is_a_bad_request() {
        let app_state = get_test_app_state();

        let response = create_category_endpoint(
            State(CategoryApiState::from_ref(&app_state)),
            Json(CategoryBuilder::new("   ", CategoryKind::Both)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rename_refreshes_the_joined_names_in_the_cache() {
        let app_state = get_test_app_state();
        let category = {
            let connection = app_state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryBuilder::new("Groceries", CategoryKind::Expense),
                &connection,
            )
            .unwrap();
            let transaction = create_transaction(
                Transaction::build(TransactionKind::Expense, 27.19, date!(2025 - 10 - 04), "Food")
                    .category_id(Some(category.id)),
                &connection,
            )
            .unwrap();
            app_state.ledger.lock().unwrap().insert(transaction);
            category
        };

        let response = update_category_endpoint(
            State(CategoryApiState::from_ref(&app_state)),
            Path(category.id),
            Json(CategoryBuilder::new("Food & Drink", CategoryKind::Expense)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = app_state.ledger.lock().unwrap().snapshot();
        assert_eq!(snapshot[0].category_name.as_deref(), Some("Food & Drink"));
    }

    #[tokio::test]
    async fn delete_clears_the_joined_names_in_the_cache() {
        let app_state = get_test_app_state();
        let category = {
            let connection = app_state.db_connection.lock().unwrap();
            let category = create_category(
                CategoryBuilder::new("Streaming", CategoryKind::Expense),
                &connection,
            )
            .unwrap();
            let transaction = create_transaction(
                Transaction::build(
                    TransactionKind::Expense,
                    17.99,
                    date!(2025 - 10 - 04),
                    "Netflix",
                )
                .category_id(Some(category.id)),
                &connection,
            )
            .unwrap();
            app_state.ledger.lock().unwrap().insert(transaction);
            category
        };

        let response = delete_category_endpoint(
            State(CategoryApiState::from_ref(&app_state)),
            Path(category.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = app_state.ledger.lock().unwrap().snapshot();
        assert_eq!(snapshot[0].category_id, None);
        assert_eq!(snapshot[0].category_name, None);
    }

    #[tokio::test]
    async fn deleting_a_missing_category_is_not_found() {
        let app_state = get_test_app_state();

        let response = delete_category_endpoint(
            State(CategoryApiState::from_ref(&app_state)),
            Path(1337),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
