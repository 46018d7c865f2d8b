//! Ticket service: validates lifecycle events, appends them to the log,
//! and keeps the derived index in step.
//!
//! Every accepted event follows the same path: validate at this boundary,
//! append to the event log (source of truth), then upsert the index with
//! the update derived from the very same event. Append and upsert happen
//! under one service-level lock, so index merge order always matches log
//! order. Queries never touch the log except for per-ticket history;
//! point and list lookups are served by the index.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::dto::{SaleRequest, StatusRequest};
use crate::domain::{IndexEntry, IndexUpdate, StatusAction, TicketEvent, TicketId, now_ms};
use crate::error::ConsoleError;
use crate::store::{EventLog, TicketIndexStore};

/// Orchestration layer for ticket lifecycle recording and queries.
#[derive(Debug)]
pub struct TicketService {
    log: Arc<EventLog>,
    index: Arc<TicketIndexStore>,
    write_lock: Mutex<()>,
}

/// Point-in-time view of one ticket: latest index snapshot plus the full
/// event history in arrival order.
#[derive(Debug, Clone)]
pub struct TicketHistory {
    /// The queried ticket.
    pub ticket_id: TicketId,
    /// Latest index entry, `None` when the ticket has never been seen.
    pub index: Option<IndexEntry>,
    /// Every event of the ticket, in arrival order.
    pub events: Vec<TicketEvent>,
}

impl TicketService {
    /// Creates a new `TicketService` over the given stores.
    #[must_use]
    pub fn new(log: Arc<EventLog>, index: Arc<TicketIndexStore>) -> Self {
        Self {
            log,
            index,
            write_lock: Mutex::new(()),
        }
    }

    /// Records a sale event.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Validation`] when the ticket id is empty,
    /// or [`ConsoleError::Persistence`] when a fail-fast store write
    /// fails.
    pub async fn record_sale(&self, req: SaleRequest, source: String) -> Result<(), ConsoleError> {
        let ticket_id = parse_ticket_id(&req.ticket_id)?;
        let event = TicketEvent::Sale {
            ticket_id: ticket_id.clone(),
            ts: req.ts.unwrap_or_else(now_ms),
            source,
            origin: req.origin.unwrap_or_default(),
            terminal: req.terminal.unwrap_or_default(),
            fare_class: req.fare_class.unwrap_or_default(),
            trips_total: req.trips_total.unwrap_or(1),
            station_code: req.station_code.unwrap_or_default(),
            station_name: req.station_name.unwrap_or_default(),
            cost: req.cost.unwrap_or(0.0),
        };
        self.apply(&ticket_id, event).await
    }

    /// Records a status event (gate crossing or trips update).
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Validation`] when the ticket id is empty
    /// or the action is not `enter`/`exit`/`update`, or
    /// [`ConsoleError::Persistence`] when a fail-fast store write fails.
    pub async fn record_status(&self, req: StatusRequest, source: String) -> Result<(), ConsoleError> {
        let ticket_id = parse_ticket_id(&req.ticket_id)?;
        let action = StatusAction::parse(req.action.trim()).ok_or_else(|| {
            ConsoleError::Validation(format!("invalid action: {:?}", req.action))
        })?;
        let event = TicketEvent::Status {
            ticket_id: ticket_id.clone(),
            ts: req.ts.unwrap_or_else(now_ms),
            source,
            action,
            station_code: req.station_code.unwrap_or_default(),
            trips_remaining: req.trips_remaining,
        };
        self.apply(&ticket_id, event).await
    }

    /// Appends a validated event and upserts the index from it.
    ///
    /// One critical section covers both steps: without it, two concurrent
    /// events for the same ticket could reach the index in the opposite
    /// order of their log appends.
    async fn apply(&self, ticket_id: &TicketId, event: TicketEvent) -> Result<(), ConsoleError> {
        let _guard = self.write_lock.lock().await;
        self.log.append(&event).await?;
        self.index
            .upsert(ticket_id, IndexUpdate::for_event(&event))
            .await?;
        tracing::debug!(ticket_id = %ticket_id, "ticket event recorded");
        Ok(())
    }

    /// Returns the latest index entry plus the full event history of one
    /// ticket.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Validation`] when the id is empty.
    pub async fn history(&self, raw_id: &str) -> Result<TicketHistory, ConsoleError> {
        let ticket_id = parse_ticket_id(raw_id)?;
        let index = self.index.get(&ticket_id).await;
        let events = self.log.read_by_ticket(&ticket_id);
        Ok(TicketHistory {
            ticket_id,
            index,
            events,
        })
    }

    /// Lists index entries, most recently touched first, optionally
    /// filtered by a substring over the searchable fields. An empty or
    /// whitespace-only query means no filter.
    pub async fn list(&self, query: Option<&str>) -> Vec<(String, IndexEntry)> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        self.index.list(query).await
    }

    /// Rebuilds the index from scratch by replaying the full event log.
    ///
    /// Recovery path for a lost or corrupt snapshot; equivalent to the
    /// incremental maintenance by construction (same fold).
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Persistence`] when the fail-fast snapshot
    /// write fails.
    pub async fn rebuild_index(&self) -> Result<usize, ConsoleError> {
        let events = self.log.read_all();
        let replayed = events.len();
        self.index.rebuild(&events).await?;
        Ok(replayed)
    }
}

fn parse_ticket_id(raw: &str) -> Result<TicketId, ConsoleError> {
    TicketId::parse(raw).ok_or_else(|| ConsoleError::Validation("ticket_id required".to_string()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EventKind, TicketStatus};
    use crate::store::DurabilityMode;

    fn make_service(dir: &tempfile::TempDir) -> TicketService {
        let log = Arc::new(EventLog::new(
            dir.path().join("events.jsonl"),
            DurabilityMode::FailFast,
        ));
        let index = Arc::new(TicketIndexStore::open(
            dir.path().join("index.json"),
            DurabilityMode::FailFast,
        ));
        TicketService::new(log, index)
    }

    fn tempdir() -> tempfile::TempDir {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir creation failed");
        };
        dir
    }

    fn sale_request(ticket_id: &str) -> SaleRequest {
        SaleRequest {
            ticket_id: ticket_id.to_string(),
            origin: Some("Northgate".to_string()),
            terminal: Some("Harbor".to_string()),
            fare_class: Some("regular".to_string()),
            trips_total: Some(2),
            station_code: Some("01-01".to_string()),
            station_name: Some("Northgate".to_string()),
            cost: Some(8.0),
            ts: None,
        }
    }

    fn status_request(ticket_id: &str, action: &str, trips_remaining: Option<u32>) -> StatusRequest {
        StatusRequest {
            ticket_id: ticket_id.to_string(),
            action: action.to_string(),
            station_code: Some("02-03".to_string()),
            trips_remaining,
            ts: None,
        }
    }

    #[tokio::test]
    async fn sale_is_indexed_as_sold() {
        let dir = tempdir();
        let service = make_service(&dir);

        let result = service.record_sale(sale_request("T-1"), "10.0.0.7".to_string()).await;
        assert!(result.is_ok());

        let history = service.history("T-1").await;
        let Ok(history) = history else {
            panic!("history should succeed");
        };
        let Some(entry) = history.index else {
            panic!("index entry should exist");
        };
        assert_eq!(entry.status, Some(TicketStatus::Sold));
        assert_eq!(entry.last_event, Some(EventKind::Sale));
    }

    #[tokio::test]
    async fn lifecycle_sequence_is_logged_and_indexed_in_order() {
        let dir = tempdir();
        let service = make_service(&dir);

        assert!(service.record_sale(sale_request("T-1"), String::new()).await.is_ok());
        assert!(
            service
                .record_status(status_request("T-1", "enter", None), String::new())
                .await
                .is_ok()
        );
        assert!(
            service
                .record_status(status_request("T-1", "exit", None), String::new())
                .await
                .is_ok()
        );

        let history = service.history("T-1").await;
        let Ok(history) = history else {
            panic!("history should succeed");
        };
        assert_eq!(history.events.len(), 3);
        let kinds: Vec<&str> = history
            .events
            .iter()
            .map(|event| match event {
                TicketEvent::Sale { .. } => "sale",
                TicketEvent::Status { action, .. } => action.as_str(),
            })
            .collect();
        assert_eq!(kinds, vec!["sale", "enter", "exit"]);

        let Some(entry) = history.index else {
            panic!("index entry should exist");
        };
        assert_eq!(entry.status, Some(TicketStatus::Exited));
        assert_eq!(entry.last_action, Some(StatusAction::Exit));
    }

    #[tokio::test]
    async fn update_without_trips_field_preserves_counter() {
        let dir = tempdir();
        let service = make_service(&dir);

        assert!(
            service
                .record_status(status_request("T-1", "update", Some(3)), String::new())
                .await
                .is_ok()
        );
        assert!(
            service
                .record_status(status_request("T-1", "enter", None), String::new())
                .await
                .is_ok()
        );

        let history = service.history("T-1").await;
        let entry = history.ok().and_then(|h| h.index);
        assert_eq!(entry.and_then(|e| e.trips_remaining), Some(3));
    }

    #[tokio::test]
    async fn duplicate_sale_appends_twice_but_indexes_once() {
        let dir = tempdir();
        let service = make_service(&dir);

        assert!(service.record_sale(sale_request("T-1"), String::new()).await.is_ok());
        assert!(service.record_sale(sale_request("T-1"), String::new()).await.is_ok());

        let history = service.history("T-1").await;
        let Ok(history) = history else {
            panic!("history should succeed");
        };
        assert_eq!(history.events.len(), 2);

        let rows = service.list(None).await;
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn invalid_action_is_rejected_without_side_effects() {
        let dir = tempdir();
        let service = make_service(&dir);

        let result = service
            .record_status(status_request("T-1", "teleport", None), String::new())
            .await;
        let Err(ConsoleError::Validation(_)) = result else {
            panic!("teleport should be a validation error");
        };

        let history = service.history("T-1").await;
        let Ok(history) = history else {
            panic!("history should succeed");
        };
        assert!(history.events.is_empty());
        assert!(history.index.is_none());
    }

    #[tokio::test]
    async fn empty_ticket_id_is_rejected() {
        let dir = tempdir();
        let service = make_service(&dir);

        let result = service.record_sale(sale_request("   "), String::new()).await;
        assert!(matches!(result, Err(ConsoleError::Validation(_))));

        let result = service.history("").await;
        assert!(matches!(result, Err(ConsoleError::Validation(_))));
    }

    #[tokio::test]
    async fn rebuild_recovers_index_from_log() {
        let dir = tempdir();
        let service = make_service(&dir);

        assert!(service.record_sale(sale_request("T-1"), String::new()).await.is_ok());
        assert!(
            service
                .record_status(status_request("T-1", "enter", None), String::new())
                .await
                .is_ok()
        );

        let replayed = service.rebuild_index().await;
        assert_eq!(replayed.ok(), Some(2));

        let history = service.history("T-1").await;
        let entry = history.ok().and_then(|h| h.index);
        assert_eq!(entry.and_then(|e| e.status), Some(TicketStatus::Entered));
    }

    #[tokio::test]
    async fn concurrent_events_keep_index_in_log_order() {
        let dir = tempdir();
        let service = Arc::new(make_service(&dir));

        let mut tasks = Vec::new();
        for n in 0..16_u32 {
            let service = Arc::clone(&service);
            tasks.push(tokio::spawn(async move {
                let action = if n % 2 == 0 { "enter" } else { "exit" };
                service
                    .record_status(status_request("T-1", action, None), String::new())
                    .await
            }));
        }
        for task in tasks {
            let Ok(result) = task.await else {
                panic!("task should not panic");
            };
            assert!(result.is_ok());
        }

        let history = service.history("T-1").await;
        let Ok(history) = history else {
            panic!("history should succeed");
        };
        assert_eq!(history.events.len(), 16);
        // The index's last action must be the action of the last logged
        // event, whatever interleaving won.
        let last_logged = history.events.last().and_then(|event| match event {
            TicketEvent::Status { action, .. } => Some(*action),
            TicketEvent::Sale { .. } => None,
        });
        assert!(last_logged.is_some());
        assert_eq!(history.index.and_then(|e| e.last_action), last_logged);
    }

    #[tokio::test]
    async fn search_matches_station_fields() {
        let dir = tempdir();
        let service = make_service(&dir);

        assert!(service.record_sale(sale_request("T-1"), String::new()).await.is_ok());
        let mut other = sale_request("T-2");
        other.origin = Some("Eastside".to_string());
        other.terminal = Some("Midtown".to_string());
        other.station_code = Some("03-01".to_string());
        assert!(service.record_sale(other, String::new()).await.is_ok());

        let rows = service.list(Some("harbor")).await;
        let ids: Vec<&str> = rows.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["T-1"]);

        // Blank query means no filter.
        let rows = service.list(Some("   ")).await;
        assert_eq!(rows.len(), 2);
    }
}
