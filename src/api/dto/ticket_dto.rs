//! Ticket-related DTOs for event recording, history, and search.
//!
//! Every request field is serde-defaulted so that a missing field reaches
//! the validation boundary (which produces a structured 400) instead of
//! failing JSON extraction.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{IndexEntry, TicketEvent};

/// Request body for `POST /api/tickets/sale`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SaleRequest {
    /// Identifier printed on the ticket. Must be non-empty.
    #[serde(default)]
    pub ticket_id: String,
    /// Origin station of the journey.
    #[serde(default)]
    pub origin: Option<String>,
    /// Destination/terminal station.
    #[serde(default)]
    pub terminal: Option<String>,
    /// Fare class (e.g. regular or express).
    #[serde(default)]
    pub fare_class: Option<String>,
    /// Number of trips purchased; defaults to 1.
    #[serde(default)]
    pub trips_total: Option<u32>,
    /// Code of the issuing station.
    #[serde(default)]
    pub station_code: Option<String>,
    /// Name of the issuing station.
    #[serde(default)]
    pub station_name: Option<String>,
    /// Amount paid; defaults to 0.
    #[serde(default)]
    pub cost: Option<f64>,
    /// Client-side event time (epoch ms); server-assigned when absent.
    #[serde(default)]
    pub ts: Option<i64>,
}

/// Request body for `POST /api/tickets/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusRequest {
    /// Identifier printed on the ticket. Must be non-empty.
    #[serde(default)]
    pub ticket_id: String,
    /// One of `enter`, `exit`, `update`.
    #[serde(default)]
    pub action: String,
    /// Station where the action took place.
    #[serde(default)]
    pub station_code: Option<String>,
    /// Remaining-trips counter, when the device reports one.
    #[serde(default)]
    pub trips_remaining: Option<u32>,
    /// Client-side event time (epoch ms); server-assigned when absent.
    #[serde(default)]
    pub ts: Option<i64>,
}

/// Generic success acknowledgement, `{"ok": true}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AckResponse {
    /// Always `true` on success responses.
    pub ok: bool,
}

impl AckResponse {
    /// The canonical success acknowledgement.
    #[must_use]
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}

/// Response body for `GET /api/tickets/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct TicketHistoryResponse {
    /// The queried ticket identifier.
    pub ticket_id: String,
    /// Latest index entry; `null` when the ticket has never been seen.
    pub index: Option<IndexEntry>,
    /// Full event history in arrival order.
    pub events: Vec<TicketEvent>,
}

/// One row of the `GET /api/tickets` listing: the identifier plus the
/// flattened index entry.
#[derive(Debug, Clone, Serialize)]
pub struct TicketRow {
    /// Ticket identifier.
    pub ticket_id: String,
    /// Latest index entry fields, flattened into the row.
    #[serde(flatten)]
    pub entry: IndexEntry,
}

/// Query parameters for `GET /api/tickets`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TicketListParams {
    /// Case-insensitive substring filter over ticket id, station code,
    /// origin, and terminal.
    #[serde(default)]
    pub q: Option<String>,
}
