//! # Metrics
//!
//! Lightweight counters for monitoring store activity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector, cheap to clone and share.
#[derive(Clone, Default)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    // Write metrics
    slots_written: AtomicU64,
    slots_recreated: AtomicU64,
    values_skipped: AtomicU64,
    write_errors: AtomicU64,

    // Read metrics
    values_loaded: AtomicU64,
    loads_defaulted: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a slot created or overwritten in place
    pub fn record_write(&self) {
        self.inner.slots_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a slot deleted and recreated after a shape/dtype mismatch
    pub fn record_recreate(&self) {
        self.inner.slots_recreated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an absent value skipped on write
    pub fn record_skip(&self) {
        self.inner.values_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a per-path write failure in a batch
    pub fn record_write_error(&self) {
        self.inner.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful load
    pub fn record_load(&self) {
        self.inner.values_loaded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a load that fell back to the caller default
    pub fn record_default(&self) {
        self.inner.loads_defaulted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            slots_written: self.inner.slots_written.load(Ordering::Relaxed),
            slots_recreated: self.inner.slots_recreated.load(Ordering::Relaxed),
            values_skipped: self.inner.values_skipped.load(Ordering::Relaxed),
            write_errors: self.inner.write_errors.load(Ordering::Relaxed),
            values_loaded: self.inner.values_loaded.load(Ordering::Relaxed),
            loads_defaulted: self.inner.loads_defaulted.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub slots_written: u64,
    pub slots_recreated: u64,
    pub values_skipped: u64,
    pub write_errors: u64,
    pub values_loaded: u64,
    pub loads_defaulted: u64,
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    /// Start new timer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop timer and log duration
    pub fn stop(self) {
        let duration = self.elapsed();
        tracing::debug!(
            name = %self.name,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}
