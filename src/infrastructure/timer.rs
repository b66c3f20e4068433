//! Deterministic timer queue.
//!
//! Implements the [`TimerScheduler`] port with a binary heap of deadlines
//! and lazy cancellation. The queue never spawns threads or sleeps; a host
//! drives it by calling [`TimerQueue::run_due`] with the current time, which
//! makes timer-dependent behavior fully controllable in tests and keeps the
//! single-logical-thread execution model explicit.

use crate::application::ports::{TimerCallback, TimerHandle, TimerScheduler};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::panic;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Heap entry pointing at a scheduled callback.
///
/// Cancellation removes the callback from the id map and leaves the slot
/// behind; stale slots are discarded when they surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueSlot {
    deadline: Instant,
    id: u64,
}

impl Ord for QueueSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the earliest deadline wins,
        // with the lower id (earlier schedule) first within a deadline.
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for QueueSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct QueueInner {
    heap: BinaryHeap<QueueSlot>,
    callbacks: HashMap<u64, TimerCallback>,
    next_id: u64,
}

/// Timer queue driven by explicit `run_due` calls.
///
/// Thread-safe; share it as `Arc<TimerQueue>`. Callbacks run outside the
/// internal lock, so they are free to schedule and cancel timers themselves.
///
/// # Example
/// ```
/// use cadencia::TimerQueue;
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
///
/// let queue = Arc::new(TimerQueue::new());
/// let start = Instant::now();
/// queue.schedule_at(start + Duration::from_millis(10), Box::new(|| {}));
///
/// // Nothing is due yet.
/// assert_eq!(queue.run_due(start), 0);
///
/// // Driving past the deadline fires the callback.
/// assert_eq!(queue.run_due(start + Duration::from_millis(10)), 1);
/// assert!(queue.is_empty());
/// ```
pub struct TimerQueue {
    inner: Mutex<QueueInner>,
}

impl TimerQueue {
    /// Create an empty timer queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                heap: BinaryHeap::new(),
                callbacks: HashMap::new(),
                next_id: 0,
            }),
        }
    }

    /// Schedule a callback; see [`TimerScheduler::schedule_at`].
    pub fn schedule_at(&self, deadline: Instant, callback: TimerCallback) -> TimerHandle {
        let mut inner = self.inner.lock().expect("timer queue mutex poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.heap.push(QueueSlot { deadline, id });
        inner.callbacks.insert(id, callback);
        tracing::trace!(timer_id = id, "timer scheduled");
        TimerHandle(id)
    }

    /// Cancel a scheduled timer; see [`TimerScheduler::cancel`].
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        let mut inner = self.inner.lock().expect("timer queue mutex poisoned");
        let cancelled = inner.callbacks.remove(&handle.0).is_some();
        if cancelled {
            tracing::trace!(timer_id = handle.0, "timer cancelled");
        }
        cancelled
    }

    /// Run every callback whose deadline has passed, in deadline order.
    ///
    /// Only timers that existed when the call began are considered; a
    /// callback that schedules new work for this same instant sees it run
    /// on the *next* `run_due`, the way a host event loop runs delayed work
    /// on a future turn. Cancellations performed by callbacks in this pass
    /// are honored. A panicking callback is contained and logged, and the
    /// pass continues.
    ///
    /// # Arguments
    /// * `now` - Current time; timers with `deadline <= now` are due
    ///
    /// # Returns
    /// How many callbacks actually ran.
    pub fn run_due(&self, now: Instant) -> usize {
        // Phase 1: under the lock, pop everything due into execution order.
        let due: Vec<u64> = {
            let mut inner = self.inner.lock().expect("timer queue mutex poisoned");
            let mut due = Vec::new();
            while let Some(&QueueSlot { deadline, id }) = inner.heap.peek() {
                if deadline > now {
                    break;
                }
                inner.heap.pop();
                if inner.callbacks.contains_key(&id) {
                    due.push(id);
                }
            }
            due
        };

        // Phase 2: take each callback out individually and run it unlocked.
        let mut fired = 0;
        for id in due {
            let callback = {
                let mut inner = self.inner.lock().expect("timer queue mutex poisoned");
                inner.callbacks.remove(&id)
            };
            let callback = match callback {
                Some(cb) => cb,
                // Cancelled by an earlier callback in this same pass.
                None => continue,
            };
            fired += 1;
            tracing::trace!(timer_id = id, "timer fired");
            if panic::catch_unwind(panic::AssertUnwindSafe(callback)).is_err() {
                tracing::error!(timer_id = id, "timer callback panicked");
            }
        }
        fired
    }

    /// Deadline of the earliest live timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        let mut inner = self.inner.lock().expect("timer queue mutex poisoned");
        while let Some(&QueueSlot { deadline, id }) = inner.heap.peek() {
            if inner.callbacks.contains_key(&id) {
                return Some(deadline);
            }
            // Stale slot from a cancelled timer.
            inner.heap.pop();
        }
        None
    }

    /// Number of live (not yet fired or cancelled) timers.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("timer queue mutex poisoned")
            .callbacks
            .len()
    }

    /// Check if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all pending timers without running them.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("timer queue mutex poisoned");
        inner.heap.clear();
        inner.callbacks.clear();
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.len())
            .finish()
    }
}

// Implement the TimerScheduler port
impl TimerScheduler for TimerQueue {
    fn schedule_at(&self, deadline: Instant, callback: TimerCallback) -> TimerHandle {
        TimerQueue::schedule_at(self, deadline, callback)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        TimerQueue::cancel(self, handle)
    }
}

// Implement TimerScheduler for Arc<TimerQueue> to allow it to be used directly
impl TimerScheduler for Arc<TimerQueue> {
    fn schedule_at(&self, deadline: Instant, callback: TimerCallback) -> TimerHandle {
        TimerQueue::schedule_at(self, deadline, callback)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        TimerQueue::cancel(self, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::time::Duration;

    fn record(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str) -> TimerCallback {
        let log = Arc::clone(log);
        Box::new(move || log.lock().unwrap().push(label))
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let queue = Arc::new(TimerQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        queue.schedule_at(start + Duration::from_millis(30), record(&log, "c"));
        queue.schedule_at(start + Duration::from_millis(10), record(&log, "a"));
        queue.schedule_at(start + Duration::from_millis(20), record(&log, "b"));

        assert_eq!(queue.run_due(start + Duration::from_millis(30)), 3);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fifo_within_same_deadline() {
        let queue = Arc::new(TimerQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let deadline = Instant::now() + Duration::from_millis(5);

        queue.schedule_at(deadline, record(&log, "first"));
        queue.schedule_at(deadline, record(&log, "second"));
        queue.schedule_at(deadline, record(&log, "third"));

        queue.run_due(deadline);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_not_due_timers_stay() {
        let queue = Arc::new(TimerQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        queue.schedule_at(start + Duration::from_millis(10), record(&log, "early"));
        queue.schedule_at(start + Duration::from_millis(50), record(&log, "late"));

        assert_eq!(queue.run_due(start + Duration::from_millis(10)), 1);
        assert_eq!(*log.lock().unwrap(), vec!["early"]);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.run_due(start + Duration::from_millis(50)), 1);
        assert_eq!(*log.lock().unwrap(), vec!["early", "late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_past_deadline_fires_on_next_run() {
        let queue = Arc::new(TimerQueue::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let fired_clone = Arc::clone(&fired);
        // Deadline in the past relative to the run.
        queue.schedule_at(start, Box::new(move || {
            fired_clone.fetch_add(1, AtomicOrdering::SeqCst);
        }));

        assert_eq!(queue.run_due(start + Duration::from_secs(1)), 1);
        assert_eq!(fired.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let queue = Arc::new(TimerQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let deadline = Instant::now() + Duration::from_millis(5);

        let handle = queue.schedule_at(deadline, record(&log, "cancelled"));
        queue.schedule_at(deadline, record(&log, "kept"));

        assert!(queue.cancel(handle));
        // Second cancel is a no-op.
        assert!(!queue.cancel(handle));

        assert_eq!(queue.run_due(deadline), 1);
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);
    }

    #[test]
    fn test_callback_can_cancel_later_timer_in_same_pass() {
        let queue = Arc::new(TimerQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let deadline = Instant::now() + Duration::from_millis(5);

        // Reserve the id slot order: the first callback cancels the second.
        let queue_clone = Arc::clone(&queue);
        let log_clone = Arc::clone(&log);
        let victim = Arc::new(Mutex::new(None));
        let victim_clone = Arc::clone(&victim);
        queue.schedule_at(
            deadline,
            Box::new(move || {
                log_clone.lock().unwrap().push("canceller");
                if let Some(handle) = *victim_clone.lock().unwrap() {
                    queue_clone.cancel(handle);
                }
            }),
        );
        let handle = queue.schedule_at(deadline, record(&log, "victim"));
        *victim.lock().unwrap() = Some(handle);

        assert_eq!(queue.run_due(deadline), 1);
        assert_eq!(*log.lock().unwrap(), vec!["canceller"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_callback_schedules_for_next_pass() {
        let queue = Arc::new(TimerQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();
        let deadline = start + Duration::from_millis(5);

        let queue_clone = Arc::clone(&queue);
        let log_clone = Arc::clone(&log);
        queue.schedule_at(
            deadline,
            Box::new(move || {
                log_clone.lock().unwrap().push("outer");
                let log_inner = Arc::clone(&log_clone);
                // Same deadline, but it must not run in this pass.
                queue_clone.schedule_at(
                    deadline,
                    Box::new(move || log_inner.lock().unwrap().push("inner")),
                );
            }),
        );

        assert_eq!(queue.run_due(deadline), 1);
        assert_eq!(*log.lock().unwrap(), vec!["outer"]);

        assert_eq!(queue.run_due(deadline), 1);
        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_panicking_callback_does_not_stop_pass() {
        let queue = Arc::new(TimerQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let deadline = Instant::now() + Duration::from_millis(5);

        queue.schedule_at(deadline, Box::new(|| panic!("boom")));
        queue.schedule_at(deadline, record(&log, "survivor"));

        assert_eq!(queue.run_due(deadline), 2);
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_next_deadline_skips_cancelled() {
        let queue = Arc::new(TimerQueue::new());
        let start = Instant::now();

        let early = queue.schedule_at(start + Duration::from_millis(10), Box::new(|| {}));
        queue.schedule_at(start + Duration::from_millis(30), Box::new(|| {}));

        assert_eq!(queue.next_deadline(), Some(start + Duration::from_millis(10)));
        queue.cancel(early);
        assert_eq!(queue.next_deadline(), Some(start + Duration::from_millis(30)));

        queue.clear();
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn test_len_tracks_live_timers() {
        let queue = Arc::new(TimerQueue::new());
        let start = Instant::now();
        assert!(queue.is_empty());

        let a = queue.schedule_at(start + Duration::from_millis(10), Box::new(|| {}));
        queue.schedule_at(start + Duration::from_millis(20), Box::new(|| {}));
        assert_eq!(queue.len(), 2);

        queue.cancel(a);
        assert_eq!(queue.len(), 1);

        queue.run_due(start + Duration::from_millis(20));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_scheduling() {
        use std::thread;

        let queue = Arc::new(TimerQueue::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();
        let mut handles = vec![];

        for _ in 0..8 {
            let queue_clone = Arc::clone(&queue);
            let counter_clone = Arc::clone(&counter);
            let handle = thread::spawn(move || {
                for i in 0..50 {
                    let counter_inner = Arc::clone(&counter_clone);
                    queue_clone.schedule_at(
                        start + Duration::from_millis(i),
                        Box::new(move || {
                            counter_inner.fetch_add(1, AtomicOrdering::SeqCst);
                        }),
                    );
                }
            });
            handles.push(handle);
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 400);
        assert_eq!(queue.run_due(start + Duration::from_millis(50)), 400);
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 400);
    }
}
