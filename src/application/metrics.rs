//! Observability metrics for call pacing.
//!
//! Provides counters describing how triggers, invocations and coalesced
//! calls relate, for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking pacing behavior.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters, so one handle can be kept for reporting
/// while another sits inside a pacer.
#[derive(Debug, Clone)]
pub struct PacingMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Total number of trigger calls received
    triggers: AtomicU64,
    /// Total number of times the wrapped callback actually ran
    invocations: AtomicU64,
    /// Total number of pending timers replaced by a newer trigger
    coalesced: AtomicU64,
    /// Total number of timers that expired but were refused at fire time
    stale_fires: AtomicU64,
}

impl PacingMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                triggers: AtomicU64::new(0),
                invocations: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
                stale_fires: AtomicU64::new(0),
            }),
        }
    }

    /// Record a trigger call.
    pub(crate) fn record_trigger(&self) {
        self.inner.triggers.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an invocation of the wrapped callback.
    pub(crate) fn record_invocation(&self) {
        self.inner.invocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a pending timer replaced by a newer trigger.
    pub(crate) fn record_coalesced(&self) {
        self.inner.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a timer refused at fire time.
    pub(crate) fn record_stale_fire(&self) {
        self.inner.stale_fires.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of trigger calls.
    pub fn triggers(&self) -> u64 {
        self.inner.triggers.load(Ordering::Relaxed)
    }

    /// Get the total number of callback invocations.
    pub fn invocations(&self) -> u64 {
        self.inner.invocations.load(Ordering::Relaxed)
    }

    /// Get the total number of coalesced (replaced) timers.
    pub fn coalesced(&self) -> u64 {
        self.inner.coalesced.load(Ordering::Relaxed)
    }

    /// Get the total number of stale fires.
    pub fn stale_fires(&self) -> u64 {
        self.inner.stale_fires.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> PacingSnapshot {
        PacingSnapshot {
            triggers: self.triggers(),
            invocations: self.invocations(),
            coalesced: self.coalesced(),
            stale_fires: self.stale_fires(),
        }
    }

    /// Reset all metrics to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.triggers.store(0, Ordering::Relaxed);
        self.inner.invocations.store(0, Ordering::Relaxed);
        self.inner.coalesced.store(0, Ordering::Relaxed);
        self.inner.stale_fires.store(0, Ordering::Relaxed);
    }
}

impl Default for PacingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of pacing metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacingSnapshot {
    /// Total number of trigger calls received
    pub triggers: u64,
    /// Total number of times the wrapped callback actually ran
    pub invocations: u64,
    /// Total number of pending timers replaced by a newer trigger
    pub coalesced: u64,
    /// Total number of timers that expired but were refused at fire time
    pub stale_fires: u64,
}

impl PacingSnapshot {
    /// Ratio of coalesced timers to triggers (0.0 to 1.0).
    ///
    /// A high rate means bursts are being collapsed aggressively.
    /// Returns 0.0 if no triggers have been seen.
    pub fn coalesce_rate(&self) -> f64 {
        if self.triggers == 0 {
            0.0
        } else {
            self.coalesced as f64 / self.triggers as f64
        }
    }

    /// Ratio of invocations to triggers (0.0 to 1.0, barring reordering).
    ///
    /// Returns 0.0 if no triggers have been seen.
    pub fn invocation_rate(&self) -> f64 {
        if self.triggers == 0 {
            0.0
        } else {
            self.invocations as f64 / self.triggers as f64
        }
    }
}
