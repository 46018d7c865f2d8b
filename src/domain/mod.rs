//! Domain layer: ticket identity, lifecycle events, the index fold, and
//! the telemetry rollup engine.
//!
//! Everything here is pure data and pure functions; durability lives in
//! [`crate::store`] and orchestration in [`crate::service`].

pub mod index_entry;
pub mod rollup;
pub mod telemetry;
pub mod ticket_event;
pub mod ticket_id;

pub use index_entry::{EventKind, IndexEntry, IndexUpdate, TicketStatus};
pub use telemetry::{GateRecord, Granularity, MachineRecord, WindowKey};
pub use ticket_event::{StatusAction, TicketEvent};
pub use ticket_id::TicketId;

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// All event and index timestamps use this representation.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
