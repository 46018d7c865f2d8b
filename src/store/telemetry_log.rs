//! Telemetry record streams, one per device family.
//!
//! Pure appenders with no derived state: devices push counter snapshots,
//! the rollup engine reduces them on read with a full scan.

use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::domain::{GateRecord, MachineRecord};

use super::{DurabilityMode, StoreError, jsonl};

/// Append-only JSONL streams for ticket-machine and gate telemetry.
#[derive(Debug)]
pub struct TelemetryLog {
    machine_path: PathBuf,
    gate_path: PathBuf,
    durability: DurabilityMode,
    append_lock: Mutex<()>,
}

impl TelemetryLog {
    /// Creates a handle over the two device-family stream paths.
    #[must_use]
    pub fn new(machine_path: PathBuf, gate_path: PathBuf, durability: DurabilityMode) -> Self {
        Self {
            machine_path,
            gate_path,
            durability,
            append_lock: Mutex::new(()),
        }
    }

    /// Appends one ticket-machine record, durable before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails in fail-fast mode.
    pub async fn append_machine(&self, record: &MachineRecord) -> Result<(), StoreError> {
        let _guard = self.append_lock.lock().await;
        self.durability.absorb(
            "machine telemetry stream",
            jsonl::append_record(&self.machine_path, record),
        )
    }

    /// Appends one gate record, durable before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails in fail-fast mode.
    pub async fn append_gate(&self, record: &GateRecord) -> Result<(), StoreError> {
        let _guard = self.append_lock.lock().await;
        self.durability.absorb(
            "gate telemetry stream",
            jsonl::append_record(&self.gate_path, record),
        )
    }

    /// Reads every ticket-machine record in arrival order.
    #[must_use]
    pub fn read_machine(&self) -> Vec<MachineRecord> {
        jsonl::read_records(&self.machine_path)
    }

    /// Reads every gate record in arrival order.
    #[must_use]
    pub fn read_gate(&self) -> Vec<GateRecord> {
        jsonl::read_records(&self.gate_path)
    }
}
