//! Defines the JSON endpoints for savings goals.
//!
//! Reads return [GoalView]s: the stored row combined with the progress
//! derived live from the ledger, so the client never has to run the
//! calculation itself.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::GoalId,
    feed::{ChangeFeed, Table},
    goal::{
        GoalBuilder, GoalView,
        core::{create_goal, delete_goal, get_all_goals, get_goal, set_current_amount, update_goal},
        goal_view,
    },
    ledger::TransactionCache,
};

/// The state needed to serve the savings goal endpoints.
#[derive(Clone)]
pub struct GoalApiState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The in-memory transaction list the progress calculation reads.
    pub ledger: Arc<Mutex<TransactionCache>>,
    /// The feed that announces every successful write.
    pub change_feed: ChangeFeed,
}

impl FromRef<AppState> for GoalApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ledger: state.ledger.clone(),
            change_feed: state.change_feed.clone(),
        }
    }
}

/// A route handler for listing all goals with their derived progress.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_goals_endpoint(State(state): State<GoalApiState>) -> Response {
    let goals = {
        let connection = state.db_connection.lock().unwrap();

        match get_all_goals(&connection) {
            Ok(goals) => goals,
            Err(error) => return error.into_response(),
        }
    };

    let snapshot = state.ledger.lock().unwrap().snapshot();
    let views: Vec<GoalView> = goals
        .into_iter()
        .map(|goal| goal_view(goal, &snapshot))
        .collect();

    Json(views).into_response()
}

/// A route handler for creating a new savings goal.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_goal_endpoint(
    State(state): State<GoalApiState>,
    Json(builder): Json<GoalBuilder>,
) -> Response {
    let goal = {
        let connection = state.db_connection.lock().unwrap();

        match create_goal(builder, &connection) {
            Ok(goal) => goal,
            Err(error) => return error.into_response(),
        }
    };

    if let Err(error) = state.change_feed.inserted(Table::FinancialGoal, &goal) {
        tracing::error!("could not publish insert event: {error}");
    }

    let snapshot = state.ledger.lock().unwrap().snapshot();

    (StatusCode::CREATED, Json(goal_view(goal, &snapshot))).into_response()
}

/// A route handler for overwriting a savings goal with new contents.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_goal_endpoint(
    State(state): State<GoalApiState>,
    Path(goal_id): Path<GoalId>,
    Json(builder): Json<GoalBuilder>,
) -> Response {
    let (before, after) = {
        let connection = state.db_connection.lock().unwrap();

        let before = match get_goal(goal_id, &connection) {
            Ok(before) => before,
            Err(Error::NotFound) => return Error::UpdateMissingGoal.into_response(),
            Err(error) => return error.into_response(),
        };

        match update_goal(goal_id, builder, &connection) {
            Ok(after) => (before, after),
            Err(error) => return error.into_response(),
        }
    };

    if let Err(error) = state
        .change_feed
        .updated(Table::FinancialGoal, &before, &after)
    {
        tracing::error!("could not publish update event: {error}");
    }

    let snapshot = state.ledger.lock().unwrap().snapshot();

    Json(goal_view(after, &snapshot)).into_response()
}

/// The request body for manually setting a goal's progress.
#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    /// The new manually-entered progress baseline.
    pub current_amount: f64,
}

/// A route handler for manually setting a goal's progress baseline.
///
/// The update dialog pre-fills the derived amount from the goal view, so
/// accepting it reconciles the stored baseline with the live calculation.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn set_goal_progress_endpoint(
    State(state): State<GoalApiState>,
    Path(goal_id): Path<GoalId>,
    Json(update): Json<ProgressUpdate>,
) -> Response {
    let (before, after) = {
        let connection = state.db_connection.lock().unwrap();

        let before = match get_goal(goal_id, &connection) {
            Ok(before) => before,
            Err(Error::NotFound) => return Error::UpdateMissingGoal.into_response(),
            Err(error) => return error.into_response(),
        };

        match set_current_amount(goal_id, update.current_amount, &connection) {
            Ok(after) => (before, after),
            Err(error) => return error.into_response(),
        }
    };

    if let Err(error) = state
        .change_feed
        .updated(Table::FinancialGoal, &before, &after)
    {
        tracing::error!("could not publish update event: {error}");
    }

    let snapshot = state.ledger.lock().unwrap().snapshot();

    Json(goal_view(after, &snapshot)).into_response()
}

/// A route handler for deleting a savings goal, returns the deleted row.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_goal_endpoint(
    State(state): State<GoalApiState>,
    Path(goal_id): Path<GoalId>,
) -> Response {
    let goal = {
        let connection = state.db_connection.lock().unwrap();

        match delete_goal(goal_id, &connection) {
            Ok(goal) => goal,
            Err(error) => return error.into_response(),
        }
    };

    if let Err(error) = state.change_feed.deleted(Table::FinancialGoal, &goal) {
        tracing::error!("could not publish delete event: {error}");
    }

    Json(goal).into_response()
}
