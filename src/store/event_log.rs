//! Append-only ticket event log, the system's source of truth.
//!
//! One JSON line per [`TicketEvent`], in arrival order. Events are never
//! edited or removed; `ts` values inside the stream are not necessarily
//! ordered because devices have skewed clocks. Appends are serialized by
//! a mutex and fsynced before returning.

use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::domain::{TicketEvent, TicketId};

use super::{DurabilityMode, StoreError, jsonl};

/// Durable, strictly ordered stream of ticket lifecycle events.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    durability: DurabilityMode,
    append_lock: Mutex<()>,
}

impl EventLog {
    /// Creates a log handle over the given stream path.
    #[must_use]
    pub fn new(path: PathBuf, durability: DurabilityMode) -> Self {
        Self {
            path,
            durability,
            append_lock: Mutex::new(()),
        }
    }

    /// Appends one event, durable before this returns.
    ///
    /// The caller validates the event at the service boundary; the log
    /// itself accepts anything well-typed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails and the store runs in
    /// fail-fast mode; in best-effort mode failures are logged and
    /// reported as success.
    pub async fn append(&self, event: &TicketEvent) -> Result<(), StoreError> {
        let _guard = self.append_lock.lock().await;
        self.durability
            .absorb("ticket event log", jsonl::append_record(&self.path, event))
    }

    /// Reads every event in arrival order.
    ///
    /// Corrupt lines are skipped; a missing stream is empty.
    #[must_use]
    pub fn read_all(&self) -> Vec<TicketEvent> {
        jsonl::read_records(&self.path)
    }

    /// Reads the events of one ticket, preserving arrival order.
    #[must_use]
    pub fn read_by_ticket(&self, ticket_id: &TicketId) -> Vec<TicketEvent> {
        self.read_all()
            .into_iter()
            .filter(|event| event.ticket_id() == ticket_id)
            .collect()
    }
}
