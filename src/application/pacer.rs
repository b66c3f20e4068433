//! Call pacing orchestration.
//!
//! [`Pacer`] wraps a callback and applies a pacing policy to the stream of
//! trigger calls: debouncing collapses a burst into one trailing invocation,
//! throttling spaces invocations out with an immediate leading edge. The
//! pacer owns the captured arguments and the pending timer handle; the
//! policy owns the timing decisions.

use crate::application::metrics::PacingMetrics;
use crate::application::ports::{Clock, TimerCallback, TimerHandle, TimerScheduler};
use crate::domain::pacing::{
    DebouncePolicy, FireDecision, PacingPolicy, ThrottlePolicy, TriggerDecision,
};
use crate::infrastructure::clock::SystemClock;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Debouncing pacer: invokes once, with the latest arguments, after a quiet
/// period.
pub type Debouncer<T, S> = Pacer<DebouncePolicy, T, S>;

/// Throttling pacer: invokes immediately, then at most once per interval
/// with a trailing call for the last trigger of a burst.
pub type Throttler<T, S> = Pacer<ThrottlePolicy, T, S>;

type Callback<T> = Arc<dyn Fn(T) + Send + Sync + 'static>;

/// State shared between the pacer and its in-flight timer callbacks.
struct PacerInner<P, T> {
    policy: P,
    /// Most recent trigger arguments, consumed when a timer invokes.
    captured: Option<T>,
    /// Handle of the one live timer, if any.
    pending: Option<TimerHandle>,
    /// Bumped on every schedule; lets a superseded timer recognize itself.
    epoch: u64,
}

/// Wraps a callback and paces its invocations.
///
/// Triggers arrive through [`call`](Pacer::call); delayed invocations run
/// when the timer scheduler fires them. Clones share state, so a pacer can
/// be handed to several producers and still collapse their bursts together.
///
/// The callback runs on whichever thread drives the scheduler, never while
/// pacer-internal locks are held. A panic in a *scheduled* invocation is
/// contained by the timer queue; a panic in a leading-edge invocation
/// unwinds into the caller of `call`, exactly like calling the function
/// directly.
///
/// # Example
/// ```
/// use cadencia::{Debouncer, TimerQueue};
/// use std::sync::{Arc, Mutex};
/// use std::time::{Duration, Instant};
///
/// let queue = Arc::new(TimerQueue::new());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let debouncer = Debouncer::builder(Arc::clone(&queue), move |q: String| {
///     sink.lock().unwrap().push(q);
/// })
/// .with_delay(Duration::from_millis(150))
/// .build();
///
/// // A burst of lookups...
/// debouncer.call("r".to_string());
/// debouncer.call("ru".to_string());
/// debouncer.call("rust".to_string());
///
/// // ...collapses into one invocation with the last arguments.
/// queue.run_due(Instant::now() + Duration::from_millis(150));
/// assert_eq!(*seen.lock().unwrap(), vec!["rust".to_string()]);
/// ```
pub struct Pacer<P, T, S> {
    inner: Arc<Mutex<PacerInner<P, T>>>,
    callback: Callback<T>,
    scheduler: S,
    clock: Arc<dyn Clock>,
    metrics: PacingMetrics,
}

impl<P, T, S: Clone> Clone for Pacer<P, T, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            callback: Arc::clone(&self.callback),
            scheduler: self.scheduler.clone(),
            clock: Arc::clone(&self.clock),
            metrics: self.metrics.clone(),
        }
    }
}

impl<P, T, S> Pacer<P, T, S>
where
    P: PacingPolicy + 'static,
    T: Send + 'static,
    S: TimerScheduler,
{
    /// Feed a trigger into the pacer.
    ///
    /// Depending on the policy this invokes the callback right away or
    /// captures `args` and (re)schedules the trailing timer. Arguments of a
    /// replaced timer are overwritten; only the latest trigger of a burst
    /// survives. Nothing is returned from the callback in any case.
    pub fn call(&self, args: T) {
        self.metrics.record_trigger();
        let now = self.clock.now();

        let immediate = {
            let mut inner = self.inner.lock().expect("pacer mutex poisoned");
            match inner.policy.on_trigger(now) {
                TriggerDecision::InvokeNow => Some(args),
                TriggerDecision::ScheduleAt(deadline) => {
                    inner.captured = Some(args);
                    if let Some(handle) = inner.pending.take() {
                        if self.scheduler.cancel(handle) {
                            self.metrics.record_coalesced();
                        }
                    }
                    inner.epoch += 1;
                    let handle = self
                        .scheduler
                        .schedule_at(deadline, self.expiry_callback(inner.epoch));
                    inner.pending = Some(handle);
                    None
                }
            }
        };

        if let Some(args) = immediate {
            self.metrics.record_invocation();
            tracing::trace!("leading edge invocation");
            (self.callback)(args);
        }
    }

    /// The effective delay the pacer operates with.
    pub fn delay(&self) -> Duration {
        self.inner
            .lock()
            .expect("pacer mutex poisoned")
            .policy
            .delay()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &PacingMetrics {
        &self.metrics
    }

    /// Cancel the trailing timer, if any, and drop the captured arguments.
    ///
    /// In-flight timers that already left the queue notice the epoch bump
    /// and return without invoking.
    pub(crate) fn cancel_pending(&self) {
        let mut inner = self.inner.lock().expect("pacer mutex poisoned");
        if let Some(handle) = inner.pending.take() {
            self.scheduler.cancel(handle);
        }
        inner.captured = None;
        inner.epoch += 1;
    }

    /// Build the closure that runs when the trailing timer expires.
    fn expiry_callback(&self, epoch: u64) -> TimerCallback {
        let inner = Arc::clone(&self.inner);
        let callback = Arc::clone(&self.callback);
        let clock = Arc::clone(&self.clock);
        let metrics = self.metrics.clone();

        Box::new(move || {
            let now = clock.now();
            let invoke_args = {
                let mut inner = inner.lock().expect("pacer mutex poisoned");
                if inner.epoch != epoch {
                    // A newer trigger replaced this timer while it was
                    // already in flight; the replacement owns the trailing
                    // call now.
                    metrics.record_stale_fire();
                    tracing::debug!("superseded timer dropped");
                    None
                } else {
                    inner.pending = None;
                    match inner.policy.on_fire(now) {
                        FireDecision::Invoke => inner.captured.take(),
                        FireDecision::Stale => {
                            // Interval not over by the shared timestamp.
                            // Do nothing, per the contract; the captured
                            // arguments stay for a later trigger to replace.
                            metrics.record_stale_fire();
                            tracing::debug!("stale timer refused at fire time");
                            None
                        }
                    }
                }
            };

            if let Some(args) = invoke_args {
                metrics.record_invocation();
                tracing::trace!("trailing invocation");
                callback(args);
            }
        })
    }
}

impl<T, S> Pacer<DebouncePolicy, T, S>
where
    T: Send + 'static,
    S: TimerScheduler,
{
    /// Start building a debouncer around `callback`.
    ///
    /// # Arguments
    /// * `scheduler` - Timer scheduler the trailing invocations run on
    /// * `callback` - Function to invoke with the surviving arguments
    pub fn builder(
        scheduler: S,
        callback: impl Fn(T) + Send + Sync + 'static,
    ) -> PacerBuilder<DebouncePolicy, T, S> {
        PacerBuilder::new(scheduler, callback, DebouncePolicy::new)
    }
}

impl<T, S> Pacer<ThrottlePolicy, T, S>
where
    T: Send + 'static,
    S: TimerScheduler,
{
    /// Start building a throttler around `callback`.
    ///
    /// # Arguments
    /// * `scheduler` - Timer scheduler the trailing invocations run on
    /// * `callback` - Function to invoke with the surviving arguments
    pub fn builder(
        scheduler: S,
        callback: impl Fn(T) + Send + Sync + 'static,
    ) -> PacerBuilder<ThrottlePolicy, T, S> {
        PacerBuilder::new(scheduler, callback, ThrottlePolicy::new)
    }

    /// When the wrapped callback last actually ran, if ever.
    pub fn last_fire(&self) -> Option<Instant> {
        self.inner
            .lock()
            .expect("pacer mutex poisoned")
            .policy
            .last_fire()
    }
}

/// Builder for [`Pacer`] instances.
///
/// Obtained through [`Debouncer::builder`] or [`Throttler::builder`]. The
/// clock defaults to [`SystemClock`] and the delay to the policy's default;
/// a zero delay means "use the default" as well.
pub struct PacerBuilder<P, T, S> {
    scheduler: S,
    callback: Callback<T>,
    make_policy: fn(Duration) -> P,
    delay: Duration,
    clock: Option<Arc<dyn Clock>>,
    metrics: Option<PacingMetrics>,
}

impl<P, T, S> PacerBuilder<P, T, S>
where
    P: PacingPolicy,
    S: TimerScheduler,
{
    pub(crate) fn new(
        scheduler: S,
        callback: impl Fn(T) + Send + Sync + 'static,
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

    /// Set the pacing delay. Zero keeps the policy default.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Use a custom clock instead of [`SystemClock`].
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an existing metrics handle instead of creating a fresh one.
    pub fn with_metrics(mut self, metrics: PacingMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Finish building the pacer.
    pub fn build(self) -> Pacer<P, T, S> {
        Pacer {
            inner: Arc::new(Mutex::new(PacerInner {
                policy: (self.make_policy)(self.delay),
                captured: None,
                pending: None,
                epoch: 0,
            })),
            callback: self.callback,
            scheduler: self.scheduler,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock::new())),
            metrics: self.metrics.unwrap_or_default(),
        }
    }
}
