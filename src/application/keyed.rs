//! Per-key pacing over a concurrent map.
//!
//! A single [`Pacer`](crate::application::pacer::Pacer) coalesces one stream
//! of calls. UI code usually has many streams at once: one search box per
//! panel, one scroll handler per list, one autosave per document. The keyed
//! containers here hold one fully independent pacer per key, created lazily
//! on first call, so each stream debounces or throttles on its own timeline.
//!
//! All per-key pacers share the scheduler, the clock and one
//! [`PacingMetrics`] handle, so metrics aggregate across keys.

use crate::application::metrics::PacingMetrics;
use crate::application::pacer::{Pacer, PacerBuilder};
use crate::application::ports::{Clock, TimerScheduler};
use crate::domain::pacing::{DebouncePolicy, PacingPolicy, ThrottlePolicy};
use crate::infrastructure::clock::SystemClock;

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// A keyed [`Pacer`] that debounces each key independently.
pub type KeyedDebouncer<K, T, S> = KeyedPacer<DebouncePolicy, K, T, S>;

/// A keyed [`Pacer`] that throttles each key independently.
pub type KeyedThrottler<K, T, S> = KeyedPacer<ThrottlePolicy, K, T, S>;

/// A map of independent pacers, one per key.
///
/// Calls are routed by key: the first call for a key creates a pacer for it,
/// and later calls for the same key feed that pacer. Keys never interact, so
/// a burst on one key cannot delay or swallow invocations on another.
///
/// The map grows with the number of distinct keys and never evicts on its
/// own. Callers with an unbounded key space should call [`remove`] when a
/// key retires, or [`clear`] between phases.
///
/// [`remove`]: KeyedPacer::remove
/// [`clear`]: KeyedPacer::clear
///
/// # Example
///
/// ```rust
/// use cadencia::application::keyed::KeyedDebouncer;
/// use cadencia::infrastructure::timer::TimerQueue;
/// use std::sync::Arc;
///
/// let queue = Arc::new(TimerQueue::new());
/// let debouncer: KeyedDebouncer<&str, String, _> =
///     KeyedDebouncer::builder(Arc::clone(&queue), |field, text| {
///         println!("validate {field}: {text}");
///     })
///     .build();
///
/// debouncer.call("email", "user@exam".to_string());
/// debouncer.call("email", "user@example.com".to_string());
/// debouncer.call("phone", "600123123".to_string());
/// assert_eq!(debouncer.len(), 2);
/// ```
pub struct KeyedPacer<P, K, T, S>
where
    K: Eq + Hash,
{
    pacers: DashMap<K, Pacer<P, T, S>, ahash::RandomState>,
    scheduler: S,
    callback: Arc<dyn Fn(K, T) + Send + Sync>,
    make_policy: fn(Duration) -> P,
    delay: Duration,
    clock: Arc<dyn Clock>,
    metrics: PacingMetrics,
}

impl<P, K, T, S> KeyedPacer<P, K, T, S>
where
    P: PacingPolicy + 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + 'static,
    S: TimerScheduler + Clone,
{
    /// Route a call to the pacer for `key`, creating it on first use.
    ///
    /// The per-key pacer applies the same policy and delay as every other
    /// key, but keeps its own timer and its own captured arguments. The
    /// registered callback receives the key alongside the latest arguments.
    ///
    /// # Arguments
    ///
    /// * `key` - The stream the call belongs to
    /// * `args` - The arguments for this call; the latest win within a window
    pub fn call(&self, key: K, args: T) {
        // Clone the pacer out of the map before invoking it, so user
        // callbacks run without any shard lock held. A leading-edge callback
        // may re-enter this container on the same shard.
        let pacer = {
            let entry = self.pacers.entry(key.clone()).or_insert_with(|| {
                tracing::debug!(delay = ?self.delay, "creating pacer for new key");
                let callback = Arc::clone(&self.callback);
                PacerBuilder::new(
                    self.scheduler.clone(),
                    move |args: T| callback(key.clone(), args),
                    self.make_policy,
                )
                .with_delay(self.delay)
                .with_clock(Arc::clone(&self.clock))
                .with_metrics(self.metrics.clone())
                .build()
            });
            entry.value().clone()
        };

        pacer.call(args);
    }

    /// Get the number of keys with a live pacer.
    pub fn len(&self) -> usize {
        self.pacers.len()
    }

    /// Check whether no key has a pacer yet.
    pub fn is_empty(&self) -> bool {
        self.pacers.is_empty()
    }

    /// Check whether a pacer exists for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.pacers.contains_key(key)
    }

    /// Drop the pacer for `key`, cancelling any pending trailing invocation.
    ///
    /// Returns `true` if a pacer existed for the key. A later call with the
    /// same key starts from a fresh pacer, so a throttled key regains its
    /// leading edge.
    pub fn remove(&self, key: &K) -> bool {
        match self.pacers.remove(key) {
            Some((_, pacer)) => {
                pacer.cancel_pending();
                true
            }
            None => false,
        }
    }

    /// Drop every pacer, cancelling all pending trailing invocations.
    pub fn clear(&self) {
        self.pacers.retain(|_, pacer| {
            pacer.cancel_pending();
            false
        });
    }

    /// Get the delay applied to every key.
    pub fn delay(&self) -> Duration {
        // The stored delay may be zero meaning "policy default"; ask the
        // policy for the normalized value.
        (self.make_policy)(self.delay).delay()
    }

    /// Get a reference to the metrics shared by all keys.
    pub fn metrics(&self) -> &PacingMetrics {
        &self.metrics
    }
}

impl<K, T, S> KeyedPacer<DebouncePolicy, K, T, S>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + 'static,
    S: TimerScheduler + Clone,
{
    /// Create a builder for a keyed debouncer.
    ///
    /// # Arguments
    ///
    /// * `scheduler` - The timer scheduler shared by all keys
    /// * `callback` - Invoked with the key and the latest arguments once a
    ///   key's quiet period elapses
    pub fn builder(
        scheduler: S,
        callback: impl Fn(K, T) + Send + Sync + 'static,
    ) -> KeyedPacerBuilder<DebouncePolicy, K, T, S> {
        KeyedPacerBuilder::new(scheduler, callback, DebouncePolicy::new)
    }
}

impl<K, T, S> KeyedPacer<ThrottlePolicy, K, T, S>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + 'static,
    S: TimerScheduler + Clone,
{
    /// Create a builder for a keyed throttler.
    ///
    /// # Arguments
    ///
    /// * `scheduler` - The timer scheduler shared by all keys
    /// * `callback` - Invoked with the key and the arguments on each key's
    ///   leading edge and at most once more per interval
    pub fn builder(
        scheduler: S,
        callback: impl Fn(K, T) + Send + Sync + 'static,
    ) -> KeyedPacerBuilder<ThrottlePolicy, K, T, S> {
        KeyedPacerBuilder::new(scheduler, callback, ThrottlePolicy::new)
    }
}

impl<P, K, T, S> std::fmt::Debug for KeyedPacer<P, K, T, S>
where
    P: 'static,
    K: Eq + Hash + 'static,
    T: 'static,
    S: 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedPacer")
            .field("keys", &self.pacers.len())
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Builder for [`KeyedPacer`].
///
/// Obtained from [`KeyedDebouncer::builder`] or [`KeyedThrottler::builder`].
pub struct KeyedPacerBuilder<P, K, T, S> {
    scheduler: S,
    callback: Arc<dyn Fn(K, T) + Send + Sync>,
    make_policy: fn(Duration) -> P,
    delay: Duration,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<PacingMetrics>,
}

impl<P, K, T, S> KeyedPacerBuilder<P, K, T, S>
where
    P: PacingPolicy + 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + 'static,
    S: TimerScheduler + Clone,
{
    fn new(
        scheduler: S,
        callback: impl Fn(K, T) + Send + Sync + 'static,
        make_policy: fn(Duration) -> P,
    ) -> Self {
        Self {
            scheduler,
            callback: Arc::new(callback),
            make_policy,
            delay: Duration::ZERO,
            clock: None,
            metrics: None,
        }
    }

    /// Set the delay applied to every key.
    ///
    /// A zero delay falls back to the policy default, exactly as it does on
    /// an unkeyed pacer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the clock shared by every key's pacer.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the metrics handle shared by every key's pacer.
    pub fn with_metrics(mut self, metrics: PacingMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the keyed pacer.
    pub fn build(self) -> KeyedPacer<P, K, T, S> {
        KeyedPacer {
            pacers: DashMap::with_hasher(ahash::RandomState::new()),
            scheduler: self.scheduler,
            callback: self.callback,
            make_policy: self.make_policy,
            delay: self.delay,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
            metrics: self.metrics.unwrap_or_default(),
        }
    }
}
