//! Ticket lifecycle events.
//!
//! A [`TicketEvent`] is an immutable fact about a ticket: it was sold, it
//! crossed a gate, or its remaining-trips counter was updated. Events are
//! appended to the event log in arrival order and never edited or removed.
//! Their `ts` field is caller-supplied wall-clock time (ticket machines
//! have skewed clocks), so log order, not `ts` order, is authoritative.

use serde::{Deserialize, Serialize};

use super::ticket_id::TicketId;

/// Gate/status action carried by a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    /// Ticket entered a gate.
    Enter,
    /// Ticket exited a gate.
    Exit,
    /// Remaining-trips counter update without a gate crossing.
    Update,
}

impl StatusAction {
    /// Parses the wire representation (`enter`, `exit`, `update`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "enter" => Some(Self::Enter),
            "exit" => Some(Self::Exit),
            "update" => Some(Self::Update),
            _ => None,
        }
    }

    /// Wire representation of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Update => "update",
        }
    }
}

/// One immutable ticket lifecycle event, tagged `sale` or `status` on the
/// wire and in the persisted JSONL stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TicketEvent {
    /// A ticket was issued by a ticket machine.
    Sale {
        /// Identifier printed on the ticket.
        ticket_id: TicketId,
        /// Event time in epoch milliseconds (caller-supplied or
        /// server-assigned; not guaranteed monotonic).
        ts: i64,
        /// Best-effort client address derived from request metadata.
        #[serde(default)]
        source: String,
        /// Origin station of the purchased journey.
        #[serde(default)]
        origin: String,
        /// Destination/terminal station of the journey.
        #[serde(default)]
        terminal: String,
        /// Fare class (e.g. regular or express service).
        #[serde(default)]
        fare_class: String,
        /// Number of trips purchased.
        #[serde(default = "default_trips_total")]
        trips_total: u32,
        /// Code of the issuing station.
        #[serde(default)]
        station_code: String,
        /// Name of the issuing station.
        #[serde(default)]
        station_name: String,
        /// Amount paid.
        #[serde(default)]
        cost: f64,
    },
    /// A gate crossing or remaining-trips update.
    Status {
        /// Identifier printed on the ticket.
        ticket_id: TicketId,
        /// Event time in epoch milliseconds.
        ts: i64,
        /// Best-effort client address derived from request metadata.
        #[serde(default)]
        source: String,
        /// What happened at the gate.
        action: StatusAction,
        /// Station where the action took place.
        #[serde(default)]
        station_code: String,
        /// Remaining-trips counter, when the device reported one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trips_remaining: Option<u32>,
    },
}

impl TicketEvent {
    /// Identifier of the ticket this event belongs to.
    #[must_use]
    pub const fn ticket_id(&self) -> &TicketId {
        match self {
            Self::Sale { ticket_id, .. } | Self::Status { ticket_id, .. } => ticket_id,
        }
    }

    /// Event timestamp in epoch milliseconds.
    #[must_use]
    pub const fn ts(&self) -> i64 {
        match self {
            Self::Sale { ts, .. } | Self::Status { ts, .. } => *ts,
        }
    }
}

const fn default_trips_total() -> u32 {
    1
}
