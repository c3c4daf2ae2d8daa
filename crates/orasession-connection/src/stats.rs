//! Session statistics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a session's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Physical connect calls made to the driver
    pub connect_attempts: u64,
    /// Connect calls that produced a registered handle
    pub connects: u64,
    /// Session-lost recoveries (release + retry)
    pub reconnects: u64,
    /// Queries that returned a result
    pub queries_succeeded: u64,
    /// Queries that surfaced `QueryFailed`
    pub queries_failed: u64,
}

impl SessionStats {
    /// Fraction of physical connect calls that failed (0.0 when none were made)
    pub fn connect_failure_rate(&self) -> f64 {
        if self.connect_attempts == 0 {
            0.0
        } else {
            (self.connect_attempts - self.connects.min(self.connect_attempts)) as f64
                / self.connect_attempts as f64
        }
    }
}

/// Lock-free counters shared by the gate and the executor
#[derive(Debug, Default)]
pub(crate) struct AtomicSessionStats {
    connect_attempts: AtomicU64,
    connects: AtomicU64,
    reconnects: AtomicU64,
    queries_succeeded: AtomicU64,
    queries_failed: AtomicU64,
}

impl AtomicSessionStats {
    pub(crate) fn record_connect_attempt(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query_success(&self) {
        self.queries_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query_failure(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> SessionStats {
        SessionStats {
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            connects: self.connects.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            queries_succeeded: self.queries_succeeded.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
        }
    }
}
