//! Durable stores: append-only JSONL streams and the index snapshot.
//!
//! Every store receives an explicit path and a [`DurabilityMode`] from
//! configuration. Appends are flushed to stable storage before returning;
//! there is no batching or background flush. Corrupt persisted records
//! are skipped on read with a warning, never treated as fatal.

pub mod event_log;
pub mod index_store;
mod jsonl;
pub mod ops_log;
pub mod telemetry_log;

pub use event_log::EventLog;
pub use index_store::TicketIndexStore;
pub use ops_log::{OpsEntry, OpsLog};
pub use telemetry_log::TelemetryLog;

/// Errors from the durable store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure (disk full, permission denied, missing path).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Record (de)serialization failure.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write-failure policy applied at every store boundary.
///
/// The source system swallowed all persistence failures; that behavior is
/// kept here as an explicit, configurable policy instead of an accident.
/// In either mode, effects accepted before the failing write (an already
/// appended log line, an in-memory index mutation) are never rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// Log failed writes at WARN and report success to the caller
    /// (availability over durability; the default).
    #[default]
    BestEffort,
    /// Propagate failed writes to the caller as persistence errors.
    FailFast,
}

impl DurabilityMode {
    /// Parses the configuration representation (`best_effort`, `fail_fast`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "best_effort" => Some(Self::BestEffort),
            "fail_fast" => Some(Self::FailFast),
            _ => None,
        }
    }

    /// Applies the policy to a write outcome.
    pub(crate) fn absorb(self, target: &str, result: Result<(), StoreError>) -> Result<(), StoreError> {
        match result {
            Ok(()) => Ok(()),
            Err(err) => match self {
                Self::FailFast => Err(err),
                Self::BestEffort => {
                    tracing::warn!(target_store = target, error = %err, "write failed; continuing (best-effort durability)");
                    Ok(())
                }
            },
        }
    }
}
