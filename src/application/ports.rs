//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::time::Instant;

/// Port for obtaining current time.
///
/// This abstraction allows the application layer to work with time
/// without depending on system clock implementation details.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Callback run when a timer expires.
pub type TimerCallback = Box<dyn FnOnce() + Send>;

/// Opaque handle to a scheduled timer, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub(crate) u64);

/// Port for scheduling delayed callbacks.
///
/// This is the crate's model of the host environment: one logical thread
/// where delayed callbacks run on a future turn of the scheduler, never
/// interrupting straight-line code. Infrastructure provides the concrete
/// implementation ([`TimerQueue`](crate::infrastructure::timer::TimerQueue)).
pub trait TimerScheduler: Send + Sync + Debug {
    /// Schedule a callback to run once the deadline has passed.
    ///
    /// A deadline already in the past is fine; the callback runs on the
    /// scheduler's next turn.
    ///
    /// # Arguments
    /// * `deadline` - Earliest instant the callback may run
    /// * `callback` - Work to run at expiry
    ///
    /// # Returns
    /// A handle that can be passed to [`cancel`](TimerScheduler::cancel).
    fn schedule_at(&self, deadline: Instant, callback: TimerCallback) -> TimerHandle;

    /// Cancel a scheduled timer.
    ///
    /// # Returns
    /// True if the timer was still pending, false if it already fired or
    /// was cancelled before.
    fn cancel(&self, handle: TimerHandle) -> bool;
}
