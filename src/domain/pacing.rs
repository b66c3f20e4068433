//! Pacing policies for debounce and throttle call coalescing.
//!
//! This module defines the core trait for pacing policies and the two
//! built-in implementations. Policies are pure state machines: they look at
//! timestamps and decide, they never touch timers or callbacks themselves.

use std::time::{Duration, Instant};

/// Delay used by [`DebouncePolicy`] when none (or zero) is configured.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(150);

/// Delay used by [`ThrottlePolicy`] when none (or zero) is configured.
pub const DEFAULT_THROTTLE_DELAY: Duration = Duration::from_millis(50);

/// Decision made by a pacing policy when a trigger call arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// Invoke the wrapped callback right away (leading edge).
    InvokeNow,
    /// Replace any pending timer with one firing at the given deadline.
    ///
    /// The deadline may already be in the past; it still goes on the timer
    /// queue and fires on the next run.
    ScheduleAt(Instant),
}

/// Decision made by a pacing policy when a scheduled timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// Invoke the wrapped callback with the captured arguments.
    Invoke,
    /// The timer lost the race against a later execution; drop it silently.
    Stale,
}

/// Trait for implementing pacing policies.
///
/// Policies decide, per trigger and per timer expiry, whether the wrapped
/// callback runs now, runs later, or not at all.
pub trait PacingPolicy: Send + Sync {
    /// Register a trigger call and decide what to do with it.
    ///
    /// # Arguments
    /// * `now` - When the trigger occurred
    ///
    /// # Returns
    /// A `TriggerDecision`: invoke immediately or (re)schedule a timer.
    fn on_trigger(&mut self, now: Instant) -> TriggerDecision;

    /// Register a timer expiry and decide whether it still counts.
    ///
    /// # Arguments
    /// * `now` - When the timer actually fired
    fn on_fire(&mut self, now: Instant) -> FireDecision;

    /// The effective delay this policy operates with.
    fn delay(&self) -> Duration;

    /// Reset the policy state.
    fn reset(&mut self);
}

/// Trailing-edge debounce policy.
///
/// Every trigger pushes the deadline out to `now + delay`, so a burst of
/// triggers collapses into a single invocation `delay` after the last one.
/// A zero delay is treated as unconfigured and falls back to
/// [`DEFAULT_DEBOUNCE_DELAY`].
///
/// # Example
/// ```
/// use cadencia::{DebouncePolicy, FireDecision, PacingPolicy, TriggerDecision};
/// use std::time::{Duration, Instant};
///
/// let mut policy = DebouncePolicy::new(Duration::from_millis(150));
/// let now = Instant::now();
///
/// // Each trigger replaces the pending deadline.
/// assert_eq!(
///     policy.on_trigger(now),
///     TriggerDecision::ScheduleAt(now + Duration::from_millis(150))
/// );
///
/// // Once a debounce timer fires it always invokes.
/// assert_eq!(policy.on_fire(now), FireDecision::Invoke);
/// ```
#[derive(Debug, Clone)]
pub struct DebouncePolicy {
    delay: Duration,
}

impl DebouncePolicy {
    /// Create a new debounce policy.
    ///
    /// # Arguments
    /// * `delay` - Quiet period before the callback runs; zero selects
    ///   [`DEFAULT_DEBOUNCE_DELAY`]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: if delay.is_zero() {
                DEFAULT_DEBOUNCE_DELAY
            } else {
                delay
            },
        }
    }
}

impl Default for DebouncePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_DELAY)
    }
}

impl PacingPolicy for DebouncePolicy {
    fn on_trigger(&mut self, now: Instant) -> TriggerDecision {
        TriggerDecision::ScheduleAt(now + self.delay)
    }

    fn on_fire(&mut self, _now: Instant) -> FireDecision {
        // The orchestrator cancels superseded timers, so a debounce timer
        // that fires is always the live one.
        FireDecision::Invoke
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn reset(&mut self) {}
}

/// Leading-edge throttle policy with a trailing call.
///
/// The first trigger ever invokes immediately. Later triggers schedule a
/// timer at `last_fire + delay`, so at most one invocation happens per
/// `delay` interval and the last trigger of a burst is eventually honored.
/// A zero delay is treated as unconfigured and falls back to
/// [`DEFAULT_THROTTLE_DELAY`].
///
/// Expired timers are re-validated against the latest `last_fire` before
/// invoking. A timer scheduled against an older timestamp therefore comes
/// back [`FireDecision::Stale`] instead of producing a second invocation
/// inside the same interval.
///
/// # Example
/// ```
/// use cadencia::{PacingPolicy, ThrottlePolicy, TriggerDecision};
/// use std::time::{Duration, Instant};
///
/// let delay = Duration::from_millis(50);
/// let mut policy = ThrottlePolicy::new(delay);
/// let t0 = Instant::now();
///
/// // Leading edge: the very first trigger runs immediately.
/// assert!(policy.on_trigger(t0).is_invoke_now());
///
/// // Triggers inside the interval schedule the trailing call.
/// let t1 = t0 + Duration::from_millis(10);
/// assert_eq!(policy.on_trigger(t1), TriggerDecision::ScheduleAt(t0 + delay));
/// ```
#[derive(Debug, Clone)]
pub struct ThrottlePolicy {
    delay: Duration,
    last_fire: Option<Instant>,
}

impl ThrottlePolicy {
    /// Create a new throttle policy.
    ///
    /// # Arguments
    /// * `delay` - Minimum interval between invocations; zero selects
    ///   [`DEFAULT_THROTTLE_DELAY`]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: if delay.is_zero() {
                DEFAULT_THROTTLE_DELAY
            } else {
                delay
            },
            last_fire: None,
        }
    }

    /// When the wrapped callback last actually ran, if ever.
    pub fn last_fire(&self) -> Option<Instant> {
        self.last_fire
    }
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_DELAY)
    }
}

impl PacingPolicy for ThrottlePolicy {
    fn on_trigger(&mut self, now: Instant) -> TriggerDecision {
        match self.last_fire {
            None => {
                self.last_fire = Some(now);
                TriggerDecision::InvokeNow
            }
            // Deliberately not clamped to `now`: a deadline in the past
            // still lands on the queue and fires on the next run.
            Some(last) => TriggerDecision::ScheduleAt(last + self.delay),
        }
    }

    fn on_fire(&mut self, now: Instant) -> FireDecision {
        // Check against the shared timestamp, not whatever it was when the
        // timer got scheduled. Only the most recently scheduled timer can
        // pass this, so one interval never produces two invocations.
        match self.last_fire {
            Some(last) if now.saturating_duration_since(last) < self.delay => FireDecision::Stale,
            _ => {
                self.last_fire = Some(now);
                FireDecision::Invoke
            }
        }
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn reset(&mut self) {
        self.last_fire = None;
    }
}

impl TriggerDecision {
    /// Check if this decision is InvokeNow.
    pub fn is_invoke_now(&self) -> bool {
        matches!(self, TriggerDecision::InvokeNow)
    }

    /// Check if this decision is ScheduleAt.
    pub fn is_schedule(&self) -> bool {
        matches!(self, TriggerDecision::ScheduleAt(_))
    }
}

impl FireDecision {
    /// Check if this decision is Invoke.
    pub fn is_invoke(&self) -> bool {
        matches!(self, FireDecision::Invoke)
    }

    /// Check if this decision is Stale.
    pub fn is_stale(&self) -> bool {
        matches!(self, FireDecision::Stale)
    }
}
