//! # cadencia
//!
//! Debounce and throttle for plain Rust callbacks, with deterministic timers.
//!
//! This crate coalesces bursts of calls into the invocations you actually
//! want: a debouncer waits for a quiet period and then invokes once with the
//! latest arguments, a throttler invokes immediately and then at most once
//! per interval. Timers live in an explicit [`TimerQueue`] that the host
//! drives, so behavior is fully deterministic under test and does not depend
//! on a hidden runtime. The crate also ships checksum validators for Spanish
//! identifiers (NIF, CIF and social security numbers), the classic companions
//! of a debounced form field.
//!
//! ## Quick Start
//!
//! ```rust
//! use cadencia::{Debouncer, TimerQueue};
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! let queue = Arc::new(TimerQueue::new());
//!
//! let search = Debouncer::builder(Arc::clone(&queue), |query: String| {
//!     println!("searching for {query}");
//! })
//! .with_delay(Duration::from_millis(150))
//! .build();
//!
//! // A burst of keystrokes...
//! search.call("r".to_string());
//! search.call("ru".to_string());
//! search.call("rust".to_string());
//!
//! // ...collapses into one invocation with the latest arguments once the
//! // host drives the queue past the quiet period.
//! queue.run_due(Instant::now() + Duration::from_millis(150));
//! ```
//!
//! ## Features
//!
//! - **Debouncing**: trailing-edge invocation with the latest arguments after
//!   a configurable quiet period (150ms by default)
//! - **Throttling**: leading-edge invocation plus at most one trailing
//!   invocation per interval (50ms by default), re-validated against the
//!   clock at fire time
//! - **Keyed pacing**: one independent debouncer or throttler per key over a
//!   concurrent map
//! - **Deterministic testing**: a mock clock and an explicitly driven timer
//!   queue make every timeline reproducible
//! - **Identifier validation**: NIF, CIF and social security checksum
//!   validators with a precise error taxonomy
//! - **Observability metrics**: built-in counters for triggers, invocations,
//!   coalesced calls and stale fires
//! - **Async driving** (optional `async` feature): a tokio task that polls
//!   the queue at a fixed resolution
//!
//! ## Debounce vs Throttle
//!
//! Both coalesce bursts; they differ in when the callback runs:
//!
//! | | First call of a burst | During the burst | After the burst |
//! |---|---|---|---|
//! | **Debounce** | waits | waits, keeps latest args | one invocation after the quiet period |
//! | **Throttle** | invokes immediately | keeps latest args | at most one invocation per interval |
//!
//! A throttler re-checks the clock when a trailing timer fires: if another
//! invocation has happened inside the interval in the meantime, the fire is
//! refused rather than delivered early. Two racing timers can never produce
//! two invocations inside one interval.
//!
//! ```rust
//! use cadencia::{Throttler, TimerQueue};
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! let queue = Arc::new(TimerQueue::new());
//! let scroll = Throttler::builder(Arc::clone(&queue), |offset: u32| {
//!     println!("rendering at offset {offset}");
//! })
//! .with_delay(Duration::from_millis(50))
//! .build();
//!
//! scroll.call(10); // leading edge, invoked immediately
//! scroll.call(20); // coalesced into the trailing slot
//! scroll.call(30); // replaces 20
//!
//! // One interval later the trailing slot fires with the latest offset.
//! // The fire re-checks the throttler's clock, so the host drives the
//! // queue with the current instant rather than a future one.
//! std::thread::sleep(Duration::from_millis(60));
//! queue.run_due(Instant::now()); // invokes with 30
//! ```
//!
//! ## Driving Timers
//!
//! Nothing fires on its own. A synchronous host calls
//! [`TimerQueue::run_due`] from its own loop with the current instant; the
//! queue fires every timer whose deadline has passed, in deadline order.
//! Async hosts can enable the `async` feature and spawn a `PacingDriver`
//! instead:
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! # async fn example() {
//! use cadencia::{SystemClock, TimerQueue};
//! use cadencia::infrastructure::driver::{DriverConfig, PacingDriver};
//! use std::sync::Arc;
//!
//! let queue = Arc::new(TimerQueue::new());
//! let driver = PacingDriver::new(
//!     Arc::clone(&queue),
//!     Arc::new(SystemClock::new()),
//!     DriverConfig::default(),
//! );
//! let handle = driver.start();
//!
//! // ... build pacers over `queue` and use them ...
//!
//! handle.shutdown().await.expect("shutdown failed");
//! # }
//! ```
//!
//! ## Keyed Pacing
//!
//! UI code usually paces many streams at once. The keyed containers create
//! one independent pacer per key on first use:
//!
//! ```rust
//! use cadencia::{KeyedDebouncer, TimerQueue};
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! let queue = Arc::new(TimerQueue::new());
//! let validate: KeyedDebouncer<&str, String, _> =
//!     KeyedDebouncer::builder(Arc::clone(&queue), |field, value| {
//!         println!("validating {field}: {value}");
//!     })
//!     .with_delay(Duration::from_millis(150))
//!     .build();
//!
//! validate.call("nif", "12345678".to_string());
//! validate.call("nif", "12345678Z".to_string());
//! validate.call("phone", "600123123".to_string());
//!
//! // "nif" and "phone" fire independently, each with its latest value.
//! queue.run_due(Instant::now() + Duration::from_millis(150));
//! ```
//!
//! ## Validating Spanish Identifiers
//!
//! The validators check the parts that carry information and nothing more:
//!
//! ```rust
//! use cadencia::{validate_cif, validate_nif, validate_ss_number, ValidationError};
//!
//! assert!(validate_nif("12345678Z").is_ok());
//! assert!(validate_nif("12345678z").is_ok()); // control letter is case-insensitive
//! assert_eq!(validate_nif("123456789"), Err(ValidationError::InvalidFormat));
//!
//! assert!(validate_cif("B12345674").is_ok());
//! assert_eq!(validate_cif("B1234567"), Err(ValidationError::InvalidLength));
//!
//! assert!(validate_ss_number("123456789012").is_ok());
//! assert_eq!(
//!     validate_ss_number("12345678901A"),
//!     Err(ValidationError::InvalidFormat)
//! );
//! ```
//!
//! Validation is pure and idempotent: the same input always produces the
//! same verdict, and validating never mutates anything.
//!
//! ## Observability
//!
//! Every pacer carries cheap atomic counters:
//!
//! ```rust
//! use cadencia::{Debouncer, TimerQueue};
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! let queue = Arc::new(TimerQueue::new());
//! let debouncer = Debouncer::builder(Arc::clone(&queue), |_: u32| {})
//!     .with_delay(Duration::from_millis(100))
//!     .build();
//!
//! debouncer.call(1);
//! debouncer.call(2);
//! queue.run_due(Instant::now() + Duration::from_millis(100));
//!
//! let snapshot = debouncer.metrics().snapshot();
//! assert_eq!(snapshot.triggers, 2);
//! assert_eq!(snapshot.invocations, 1);
//! assert_eq!(snapshot.coalesced, 1);
//! println!("coalesce rate: {:.0}%", snapshot.coalesce_rate() * 100.0);
//! ```
//!
//! ## Deterministic Tests
//!
//! With the `test-helpers` feature, a `MockClock` stands in for system
//! time and the timer queue fires exactly when told to:
//!
//! ```rust
//! use cadencia::infrastructure::mocks::MockClock;
//! use cadencia::{Throttler, TimerQueue};
//! use std::sync::Arc;
//! use std::time::{Duration, Instant};
//!
//! let queue = Arc::new(TimerQueue::new());
//! let start = Instant::now();
//! let clock = Arc::new(MockClock::new(start));
//!
//! let throttler = Throttler::builder(Arc::clone(&queue), |_: &str| {})
//!     .with_delay(Duration::from_millis(50))
//!     .with_clock(clock.clone())
//!     .build();
//!
//! throttler.call("a"); // leading edge at t=0
//! clock.advance(Duration::from_millis(10));
//! throttler.call("b"); // trailing slot, due at t=50
//!
//! clock.set(start + Duration::from_millis(50));
//! queue.run_due(start + Duration::from_millis(50)); // fires exactly once
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    base64_size::{base64_weight, Base64Weight},
    pacing::{
        DebouncePolicy, FireDecision, PacingPolicy, ThrottlePolicy, TriggerDecision,
        DEFAULT_DEBOUNCE_DELAY, DEFAULT_THROTTLE_DELAY,
    },
    spanish_id::{
        is_valid_cif, is_valid_nif, is_valid_ss_number, validate_cif, validate_nif,
        validate_ss_number, ValidationError,
    },
};

pub use application::{
    keyed::{KeyedDebouncer, KeyedPacer, KeyedPacerBuilder, KeyedThrottler},
    metrics::{PacingMetrics, PacingSnapshot},
    pacer::{Debouncer, Pacer, PacerBuilder, Throttler},
    ports::{Clock, TimerCallback, TimerHandle, TimerScheduler},
};

pub use infrastructure::{clock::SystemClock, timer::TimerQueue};

#[cfg(feature = "async")]
pub use infrastructure::driver::{
    DriverConfig, DriverConfigError, DriverHandle, PacingDriver, ShutdownError,
};
