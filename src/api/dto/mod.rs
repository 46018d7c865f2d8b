//! Request/response DTO types for the REST API.

pub mod log_dto;
pub mod stats_dto;
pub mod ticket_dto;

pub use log_dto::{LogListParams, OpsLogRequest};
pub use stats_dto::{GateTelemetryRequest, MachineTelemetryRequest};
pub use ticket_dto::{
    AckResponse, SaleRequest, StatusRequest, TicketHistoryResponse, TicketListParams, TicketRow,
};
