//! Calm Cashflow is a web service for tracking personal finances: transaction
//! entry, categorization, transfers between money sources, and savings-goal
//! progress.
//!
//! This library provides a JSON REST API backed by SQLite. Account balances
//! are never stored; they are derived from the transaction ledger on every
//! read (see [ledger]).

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod feed;
mod goal;
pub mod ledger;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use feed::spawn_reconciler;
pub use routing::build_router;
pub use transaction::Source;

use crate::category::CategoryId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A negative amount was used for a transaction, transfer, or goal.
    ///
    /// Amounts record magnitudes; direction comes from the transaction kind.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The specified category name already exists in the database.
    #[error("the category \"{0}\" already exists in the database")]
    DuplicateCategoryName(String),

    /// The category ID used to create a transaction or goal did not match a
    /// valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A transfer was requested between a source and itself.
    #[error("cannot transfer from a source to itself")]
    SameSourceTransfer,

    /// A transfer was requested for more money than the source holds.
    #[error("insufficient funds in {account}: {available} available")]
    InsufficientFunds {
        /// The source the transfer would draw from.
        account: Source,
        /// The derived balance of that source.
        available: f64,
    },

    /// A transaction list filter used a type label other than All, Income,
    /// Expense, or Transfer.
    #[error("\"{0}\" is not a valid transaction type label")]
    InvalidTypeLabel(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a savings goal that does not exist
    #[error("tried to update a savings goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a savings goal that does not exist
    #[error("tried to delete a savings goal that is not in the database")]
    DeleteMissingGoal,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::NegativeAmount(_)
            | Error::FutureDate(_)
            | Error::EmptyCategoryName
            | Error::DuplicateCategoryName(_)
            | Error::InvalidCategory(_)
            | Error::SameSourceTransfer
            | Error::InsufficientFunds { .. }
            | Error::InvalidTypeLabel(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingGoal
            | Error::DeleteMissingGoal => StatusCode::NOT_FOUND,
            ref error => {
                tracing::error!("An unexpected error occurred: {}", error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match status {
            // Internal errors are logged on the server and not shown to the client.
            StatusCode::INTERNAL_SERVER_ERROR => json!({
                "error": "an internal error occurred, check the server logs for more details"
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
