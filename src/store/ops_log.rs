//! Console operations log: an audit trail of admin actions.
//!
//! Same JSONL machinery as the event log, but for free-form console
//! actions (config edits, manual corrections). Read access is tail-only.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{DurabilityMode, StoreError, jsonl};

/// One audit-trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsEntry {
    /// RFC 3339 timestamp assigned by the server.
    pub ts: String,
    /// Best-effort client address.
    #[serde(default)]
    pub source: String,
    /// Action tag (e.g. `update_fare`); `event` when the client sent none.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-form action payload.
    #[serde(default)]
    pub detail: serde_json::Value,
}

/// Append-only audit trail of console operations.
#[derive(Debug)]
pub struct OpsLog {
    path: PathBuf,
    durability: DurabilityMode,
    append_lock: Mutex<()>,
}

impl OpsLog {
    /// Creates a handle over the given stream path.
    #[must_use]
    pub fn new(path: PathBuf, durability: DurabilityMode) -> Self {
        Self {
            path,
            durability,
            append_lock: Mutex::new(()),
        }
    }

    /// Appends one entry, durable before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails in fail-fast mode.
    pub async fn append(&self, entry: &OpsEntry) -> Result<(), StoreError> {
        let _guard = self.append_lock.lock().await;
        self.durability
            .absorb("ops log", jsonl::append_record(&self.path, entry))
    }

    /// Reads the last `max` entries in arrival order, skipping corrupt
    /// lines.
    #[must_use]
    pub fn read_last(&self, max: usize) -> Vec<OpsEntry> {
        let mut entries: Vec<OpsEntry> = jsonl::read_records(&self.path);
        let skip = entries.len().saturating_sub(max);
        entries.split_off(skip)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn entry(kind: &str) -> OpsEntry {
        OpsEntry {
            ts: "2024-01-01T00:00:00Z".to_string(),
            source: "10.0.0.1".to_string(),
            kind: kind.to_string(),
            detail: serde_json::json!({ "note": kind }),
        }
    }

    fn tempdir() -> tempfile::TempDir {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir creation failed");
        };
        dir
    }

    #[tokio::test]
    async fn read_last_returns_tail_in_order() {
        let dir = tempdir();
        let log = OpsLog::new(dir.path().join("logs.jsonl"), DurabilityMode::FailFast);

        for n in 0..5 {
            assert!(log.append(&entry(&format!("op-{n}"))).await.is_ok());
        }

        let tail = log.read_last(2);
        let kinds: Vec<&str> = tail.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["op-3", "op-4"]);
    }

    #[tokio::test]
    async fn read_last_with_large_max_returns_everything() {
        let dir = tempdir();
        let log = OpsLog::new(dir.path().join("logs.jsonl"), DurabilityMode::FailFast);
        assert!(log.append(&entry("only")).await.is_ok());
        assert_eq!(log.read_last(200).len(), 1);
    }
}
