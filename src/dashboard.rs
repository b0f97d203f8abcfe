//! Read endpoints for the derived dashboard figures.
//!
//! Both figures are pure projections of the in-memory transaction list;
//! nothing here reads the database.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};

use crate::{
    AppState,
    ledger::{SourceBalances, Summary, TransactionCache, derive_balances, project_summary},
};

/// The state needed to serve the dashboard figures.
#[derive(Clone)]
pub struct DashboardState {
    /// The in-memory transaction list the projections consume.
    pub ledger: Arc<Mutex<TransactionCache>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// A route handler for the derived per-source balances.
pub async fn get_balances_endpoint(State(state): State<DashboardState>) -> Json<SourceBalances> {
    let snapshot = state.ledger.lock().unwrap().snapshot();

    Json(derive_balances(&snapshot))
}

/// A route handler for the lifetime income/expense/balance summary.
pub async fn get_summary_endpoint(State(state): State<DashboardState>) -> Json<Summary> {
    let snapshot = state.ledger.lock().unwrap().snapshot();

    Json(project_summary(&snapshot))
}
