//! Row-level change notifications for the data store.
//!
//! Every successful write publishes one [ChangeEvent] carrying the affected
//! table, the kind of change, and the row payloads before and after the
//! change. Events are delivered two ways:
//!
//! - an in-process broadcast channel, consumed by the cache reconciler
//!   spawned with [spawn_reconciler],
//! - a bounded replay log served by the poll endpoint, for clients that
//!   want to refresh derived views without refetching the whole list.
//!
//! The log is bounded; a client that falls too far behind re-syncs with a
//! full fetch.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{AppState, Error, ledger::TransactionCache};

/// The table a change event applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// The transaction ledger.
    Transaction,
    /// Transaction categories.
    Category,
    /// Savings goals.
    FinancialGoal,
}

/// The kind of row-level change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A row was inserted; `after` holds the new row.
    Insert,
    /// A row was updated; `before` and `after` hold both versions.
    Update,
    /// A row was deleted; `before` holds the removed row.
    Delete,
}

/// A single row-level change, with the row payloads serialized as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Monotonically increasing sequence number, used as the poll cursor.
    pub seq: u64,
    /// The table the change applies to.
    pub table: Table,
    /// The kind of change.
    pub kind: ChangeKind,
    /// The row before the change (updates and deletes).
    pub before: Option<Value>,
    /// The row after the change (inserts and updates).
    pub after: Option<Value>,
}

const BROADCAST_CAPACITY: usize = 256;
const LOG_CAPACITY: usize = 1024;

struct FeedLog {
    next_seq: u64,
    events: VecDeque<ChangeEvent>,
}

/// Publishes row-level change events to in-process subscribers and the
/// bounded poll log.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
    log: Arc<Mutex<FeedLog>>,
}

impl ChangeFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);

        Self {
            sender,
            log: Arc::new(Mutex::new(FeedLog {
                next_seq: 1,
                events: VecDeque::new(),
            })),
        }
    }

    /// Publish an insert event for `row`.
    pub fn inserted<T: Serialize>(&self, table: Table, row: &T) -> Result<(), Error> {
        self.publish(table, ChangeKind::Insert, None, Some(to_value(row)?))
    }

    /// Publish an update event carrying both row versions.
    pub fn updated<T: Serialize>(&self, table: Table, before: &T, after: &T) -> Result<(), Error> {
        self.publish(
            table,
            ChangeKind::Update,
            Some(to_value(before)?),
            Some(to_value(after)?),
        )
    }

    /// Publish a delete event for `row`.
    pub fn deleted<T: Serialize>(&self, table: Table, row: &T) -> Result<(), Error> {
        self.publish(table, ChangeKind::Delete, Some(to_value(row)?), None)
    }

    fn publish(
        &self,
        table: Table,
        kind: ChangeKind,
        before: Option<Value>,
        after: Option<Value>,
    ) -> Result<(), Error> {
        let event = {
            let mut log = self.log.lock().unwrap();
            let event = ChangeEvent {
                seq: log.next_seq,
                table,
                kind,
                before,
                after,
            };
            log.next_seq += 1;
            log.events.push_back(event.clone());
            while log.events.len() > LOG_CAPACITY {
                log.events.pop_front();
            }

            event
        };

        // A send error only means there is no subscriber right now.
        let _ = self.sender.send(event);

        Ok(())
    }

    /// All logged events with a sequence number greater than `after`,
    /// together with the cursor to poll from next.
    pub fn events_after(&self, after: u64) -> EventsPage {
        let log = self.log.lock().unwrap();
        let events: Vec<ChangeEvent> = log
            .events
            .iter()
            .filter(|event| event.seq > after)
            .cloned()
            .collect();
        let cursor = events.last().map_or(after, |event| event.seq);

        EventsPage { events, cursor }
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

fn to_value<T: Serialize>(row: &T) -> Result<Value, Error> {
    serde_json::to_value(row).map_err(|error| Error::JsonSerialization(error.to_string()))
}

/// Spawn the background task that folds transaction change events back into
/// the in-memory ledger cache.
///
/// Write handlers already apply their own changes optimistically, so by the
/// time the echoed event arrives here it is usually a no-op; the cache's
/// merge policy suppresses the duplicate by ID.
pub fn spawn_reconciler(
    feed: &ChangeFeed,
    ledger: Arc<Mutex<TransactionCache>>,
) -> tokio::task::JoinHandle<()> {
    let mut receiver = feed.subscribe();

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    ledger.lock().unwrap().apply(&event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("change feed reconciler lagged, skipped {skipped} events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// A page of change events returned by the poll endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsPage {
    /// The events after the requested cursor, oldest first.
    pub events: Vec<ChangeEvent>,
    /// The cursor to pass as `after` on the next poll.
    pub cursor: u64,
}

/// The state needed to serve the events poll endpoint.
#[derive(Clone)]
pub(crate) struct EventsState {
    change_feed: ChangeFeed,
}

impl FromRef<AppState> for EventsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            change_feed: state.change_feed.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventsParams {
    #[serde(default)]
    after: u64,
}

/// A route handler that returns the change events after the `after` cursor.
pub(crate) async fn get_events_endpoint(
    State(state): State<EventsState>,
    Query(params): Query<EventsParams>,
) -> Json<EventsPage> {
    Json(state.change_feed.events_after(params.after))
}
