//! Host scheduler seams: counters and liveness reporting.
//!
//! The surrounding scheduler is an opaque black box; these traits are the
//! only capabilities this engine requires from it.

use std::collections::BTreeMap;

/// Rows credited to a successfully completed unit, once per run.
pub const ROWS_READ: &str = "rows_read";
/// Records written by the fan-out writer, reported once at run end.
pub const RECORDS_WRITTEN: &str = "records_written";

/// Scheduler counter API.
pub trait TaskCounters: Send {
    /// Add `delta` to the named counter.
    fn increment(&mut self, counter: &str, delta: u64);
}

/// Scheduler liveness API, driven only by the heartbeat task.
///
/// Implementations must be cheap and must never touch row or record data;
/// the heartbeat thread shares nothing with the extraction path.
pub trait LivenessProbe: Send + Sync {
    /// Report that the unit is still making progress.
    fn report_alive(&self);
}

/// In-memory counter store for hosts and tests that do not bring their own.
#[derive(Debug, Default)]
pub struct MemoryCounters {
    counts: BTreeMap<String, u64>,
}

impl MemoryCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter, zero if never incremented.
    #[must_use]
    pub fn get(&self, counter: &str) -> u64 {
        self.counts.get(counter).copied().unwrap_or(0)
    }
}

impl TaskCounters for MemoryCounters {
    fn increment(&mut self, counter: &str, delta: u64) {
        *self.counts.entry(counter.to_string()).or_insert(0) += delta;
    }
}
