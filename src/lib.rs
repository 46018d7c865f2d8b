//! # transit-console
//!
//! REST backend for a small transit network console. Ticket machines and
//! gates report ticket lifecycle events and raw telemetry counters; the
//! console records them durably and serves point lookups, searches, and
//! windowed rollups for reporting.
//!
//! ## Architecture
//!
//! ```text
//! Clients (ticket machines, gates, admin console)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── TicketService, StatsService (service/)
//!     │
//!     ├── Domain model: events, index fold, rollups (domain/)
//!     │
//!     └── Durable stores: JSONL event/telemetry streams,
//!         index snapshot, ops log (store/)
//! ```
//!
//! The ticket event log is the source of truth; the ticket index is a
//! derived per-ticket snapshot maintained incrementally by the same pure
//! fold a full replay uses, so a lost or corrupt index is recovered by
//! replaying the log.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
