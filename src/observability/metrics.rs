//! Store metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for one store instance.
///
/// Relaxed ordering throughout; counters are informational.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    loads: AtomicU64,
    recoveries: AtomicU64,
    commits: AtomicU64,
    commits_superseded: AtomicU64,
    commit_retries: AtomicU64,
    commit_failures: AtomicU64,
    lock_timeouts: AtomicU64,
    bytes_written: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_loads(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_recoveries(&self) {
        self.recoveries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful commit of `bytes` bytes
    pub fn record_commit(&self, bytes: u64) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn increment_superseded(&self) {
        self.commits_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_retries(&self) {
        self.commit_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failures(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lock_timeouts(&self) {
        self.lock_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            loads: self.loads.load(Ordering::Relaxed),
            recoveries: self.recoveries.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            commits_superseded: self.commits_superseded.load(Ordering::Relaxed),
            commit_retries: self.commit_retries.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
            lock_timeouts: self.lock_timeouts.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub loads: u64,
    pub recoveries: u64,
    pub commits: u64,
    pub commits_superseded: u64,
    pub commit_retries: u64,
    pub commit_failures: u64,
    pub lock_timeouts: u64,
    pub bytes_written: u64,
}
