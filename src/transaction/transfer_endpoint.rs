//! Defines the endpoint for moving money between sources.
//!
//! A transfer is stored as a single expense row with the transfer payment
//! method; the destination only exists as the phrase this endpoint embeds in
//! the description (see [crate::ledger::transfer_destination]).

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    feed::{ChangeFeed, Table},
    ledger::{TransactionCache, derive_balances, transfer_description, transfer_title},
    transaction::{
        PaymentMethod, Source, Transaction, TransactionKind, core::create_transaction,
    },
};

/// The state needed to create a transfer.
#[derive(Clone)]
pub struct CreateTransferState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The in-memory list, read for the balance guard and updated
    /// optimistically on success.
    pub ledger: Arc<Mutex<TransactionCache>>,
    /// The feed that announces every successful write.
    pub change_feed: ChangeFeed,
}

impl FromRef<AppState> for CreateTransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ledger: state.ledger.clone(),
            change_feed: state.change_feed.clone(),
        }
    }
}

/// The request body for moving money between sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// The source to draw from.
    pub from: Source,
    /// The source to credit.
    pub to: Source,
    /// The amount to move. Must not be negative.
    pub amount: f64,
    /// The date of the transfer.
    #[serde(rename = "transaction_date")]
    pub date: Date,
    /// An optional note prepended to the generated description.
    #[serde(default)]
    pub note: Option<String>,
}

/// A route handler for moving money between two sources.
///
/// Rejects transfers from a source to itself and transfers for more than the
/// source's derived balance. On success the single expense row is created
/// with a description that the ledger aggregator can resolve back to the
/// destination.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_transfer_endpoint(
    State(state): State<CreateTransferState>,
    Json(request): Json<TransferRequest>,
) -> Response {
    if request.from == request.to {
        return Error::SameSourceTransfer.into_response();
    }

    let available = {
        let snapshot = state.ledger.lock().unwrap().snapshot();
        derive_balances(&snapshot).get(request.from)
    };

    if request.amount > available {
        return Error::InsufficientFunds {
            account: request.from,
            available,
        }
        .into_response();
    }

    let builder = Transaction::build(
        TransactionKind::Expense,
        request.amount,
        request.date,
        &transfer_title(request.from, request.to),
    )
    .description(&transfer_description(
        request.from,
        request.to,
        request.note.as_deref(),
    ))
    .payment_method(PaymentMethod::Transfer)
    .source(Some(request.from));

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
