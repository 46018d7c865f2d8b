//! Console configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every durable file lives under one
//! configurable data directory; the stores receive explicit paths from
//! here and never read ambient globals.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use crate::store::DurabilityMode;

/// Top-level console configuration.
///
/// Loaded once at startup via [`ConsoleConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:23333`).
    pub listen_addr: SocketAddr,

    /// Directory holding every durable file (event log, index snapshot,
    /// telemetry streams, ops log). Created at startup if missing.
    pub data_dir: PathBuf,

    /// Write-failure policy applied by every store.
    pub durability: DurabilityMode,
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:23333".to_string())
            .parse()
            .context("LISTEN_ADDR must be a socket address such as 0.0.0.0:23333")?;

        let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        let durability = std::env::var("DURABILITY_MODE")
            .ok()
            .and_then(|v| DurabilityMode::parse(&v))
            .unwrap_or_default();

        Ok(Self {
            listen_addr,
            data_dir,
            durability,
        })
    }

    /// Path of the append-only ticket event stream.
    #[must_use]
    pub fn ticket_events_path(&self) -> PathBuf {
        self.data_dir.join("ticket_events.jsonl")
    }

    /// Path of the ticket index snapshot.
    #[must_use]
    pub fn ticket_index_path(&self) -> PathBuf {
        self.data_dir.join("ticket_index.json")
    }

    /// Path of the ticket-machine telemetry stream.
    #[must_use]
    pub fn machine_stats_path(&self) -> PathBuf {
        self.data_dir.join("stats_ticket.jsonl")
    }

    /// Path of the gate telemetry stream.
    #[must_use]
    pub fn gate_stats_path(&self) -> PathBuf {
        self.data_dir.join("stats_gate.jsonl")
    }

    /// Path of the console operations log.
    #[must_use]
    pub fn ops_log_path(&self) -> PathBuf {
        self.data_dir.join("logs.jsonl")
    }
}
