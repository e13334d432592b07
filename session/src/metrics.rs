//! Session counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Swap session metrics.
#[derive(Default)]
pub struct DeskMetrics {
    /// Converter invocations.
    pub conversions: AtomicU64,
    /// Debounce timers superseded by a newer edit.
    pub debounce_restarts: AtomicU64,
    /// Submits that reached the executor.
    pub submits: AtomicU64,
    /// Successful swaps.
    pub successes: AtomicU64,
    /// Failed or faulted swaps.
    pub failures: AtomicU64,
    /// Submits rejected by validation.
    pub validation_rejections: AtomicU64,
    /// Completed pair swaps.
    pub pair_swaps: AtomicU64,
}

impl DeskMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversion(&self) {
        self.conversions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn debounce_restarted(&self) {
        self.debounce_restarts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn submitted(&self) {
        self.submits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn succeeded(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validation_rejected(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pair_swapped(&self) {
        self.pair_swaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Get metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            conversions: self.conversions.load(Ordering::Relaxed),
            debounce_restarts: self.debounce_restarts.load(Ordering::Relaxed),
            submits: self.submits.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            validation_rejections: self.validation_rejections.load(Ordering::Relaxed),
            pair_swaps: self.pair_swaps.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub conversions: u64,
    pub debounce_restarts: u64,
    pub submits: u64,
    pub successes: u64,
    pub failures: u64,
    pub validation_rejections: u64,
    pub pair_swaps: u64,
}

impl MetricsSnapshot {
    /// Share of executed swaps that succeeded, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.submits == 0 {
            return 0.0;
        }
        (self.successes as f64 / self.submits as f64) * 100.0
    }
}
