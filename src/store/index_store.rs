//! Ticket index store: derived per-ticket snapshots with single-writer
//! updates.
//!
//! The in-memory map is authoritative while the process runs; every
//! mutation rewrites the JSON snapshot file in full. The read-modify-write
//! of an upsert happens entirely under the store's write lock, so
//! concurrent upserts for the same ticket (or any two tickets, since the
//! snapshot file is one shared resource) cannot lose updates. A lost or
//! corrupt snapshot degrades to an empty map and is recovered by
//! [`TicketIndexStore::rebuild`] replaying the event log through the same
//! fold the incremental path uses.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::domain::{IndexEntry, IndexUpdate, TicketEvent, TicketId, now_ms};

use super::{DurabilityMode, StoreError};

/// Keyed store of the latest known state per ticket.
#[derive(Debug)]
pub struct TicketIndexStore {
    path: PathBuf,
    durability: DurabilityMode,
    entries: RwLock<HashMap<String, IndexEntry>>,
}

impl TicketIndexStore {
    /// Opens the store, loading the snapshot if one exists.
    ///
    /// A missing snapshot starts empty; a corrupt one is logged and also
    /// starts empty (recover with [`Self::rebuild`]).
    #[must_use]
    pub fn open(path: PathBuf, durability: DurabilityMode) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "corrupt index snapshot; starting empty (rebuild from the event log to recover)");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "unreadable index snapshot; starting empty");
                HashMap::new()
            }
        };
        Self {
            path,
            durability,
            entries: RwLock::new(entries),
        }
    }

    /// Merges a partial update into the ticket's entry (creating it on
    /// first sight), stamps `last_update_ts` with the current time, and
    /// rewrites the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when the snapshot write fails in
    /// fail-fast mode. The in-memory mutation is applied regardless and
    /// is not rolled back.
    pub async fn upsert(&self, ticket_id: &TicketId, update: IndexUpdate) -> Result<(), StoreError> {
        let mut map = self.entries.write().await;
        let entry = map.entry(ticket_id.as_str().to_string()).or_default();
        entry.apply(update);
        entry.last_update_ts = now_ms();
        self.persist(&map)
    }

    /// Returns the latest known entry for a ticket, if any. Absence is a
    /// valid, queryable state, not an error.
    pub async fn get(&self, ticket_id: &TicketId) -> Option<IndexEntry> {
        self.entries.read().await.get(ticket_id.as_str()).cloned()
    }

    /// Lists entries, optionally filtered by a case-insensitive substring
    /// over the searchable fields (id, station code, origin, terminal).
    ///
    /// Sorted most recently touched first (`last_update_ts` descending),
    /// ties broken by ascending ticket id for reproducibility.
    pub async fn list(&self, filter: Option<&str>) -> Vec<(String, IndexEntry)> {
        let map = self.entries.read().await;
        let needle = filter.map(str::to_lowercase);
        let mut rows: Vec<(String, IndexEntry)> = map
            .iter()
            .filter(|(id, entry)| match needle.as_deref() {
                Some(needle) => entry.matches(id, needle),
                None => true,
            })
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.1.last_update_ts
                .cmp(&a.1.last_update_ts)
                .then_with(|| a.0.cmp(&b.0))
        });
        rows
    }

    /// Number of tickets currently indexed.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` when no ticket has been indexed yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Discards the current contents and rebuilds by replaying events in
    /// log order through the same fold the incremental path uses.
    ///
    /// All rebuilt entries share one `last_update_ts` stamp, taken when
    /// the rebuild starts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when the snapshot write fails in
    /// fail-fast mode.
    pub async fn rebuild(&self, events: &[TicketEvent]) -> Result<(), StoreError> {
        let stamp = now_ms();
        let mut rebuilt: HashMap<String, IndexEntry> = HashMap::new();
        for event in events {
            let entry = rebuilt
                .entry(event.ticket_id().as_str().to_string())
                .or_default();
            entry.apply(IndexUpdate::for_event(event));
            entry.last_update_ts = stamp;
        }

        let mut map = self.entries.write().await;
        *map = rebuilt;
        self.persist(&map)
    }

    /// Rewrites the snapshot file in full. Must be called with the write
    /// (or at least a read) lock held so the serialized view is
    /// consistent.
    fn persist(&self, map: &HashMap<String, IndexEntry>) -> Result<(), StoreError> {
        let write = || -> Result<(), StoreError> {
            let json = serde_json::to_string_pretty(map)?;
            std::fs::write(&self.path, json)?;
            Ok(())
        };
        self.durability.absorb("ticket index snapshot", write())
    }
}
