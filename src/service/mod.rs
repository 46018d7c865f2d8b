//! Service layer: validation boundary and orchestration over the stores.

pub mod stats_service;
pub mod ticket_service;

pub use stats_service::StatsService;
pub use ticket_service::{TicketHistory, TicketService};
