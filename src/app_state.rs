//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{StatsService, TicketService};
use crate::store::OpsLog;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ticket lifecycle recording and queries.
    pub ticket_service: Arc<TicketService>,
    /// Telemetry ingest and rollup queries.
    pub stats_service: Arc<StatsService>,
    /// Console operations audit trail.
    pub ops_log: Arc<OpsLog>,
}
