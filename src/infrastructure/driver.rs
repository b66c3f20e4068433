//! Background driving of the timer queue.
//!
//! A [`TimerQueue`] only fires timers when someone calls
//! [`run_due`](TimerQueue::run_due). Synchronous hosts call it from their
//! own loop; async hosts can spawn a [`PacingDriver`] instead, which polls
//! the queue at a fixed resolution on a tokio task.

use crate::application::ports::Clock;
use crate::infrastructure::timer::TimerQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;

/// Error returned when driver configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverConfigError {
    /// Polling resolution must be greater than zero
    ZeroResolution,
}

impl std::fmt::Display for DriverConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverConfigError::ZeroResolution => {
                write!(f, "driver resolution must be greater than 0")
            }
        }
    }
}

impl std::error::Error for DriverConfigError {}

/// Error returned when a driver task fails to shut down cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownError {
    /// The driver task panicked before it could exit
    TaskPanicked,
}

impl std::fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownError::TaskPanicked => {
                write!(f, "driver task panicked during shutdown")
            }
        }
    }
}

impl std::error::Error for ShutdownError {}

/// Configuration for the background driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// How often to poll the queue for due timers
    pub resolution: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            resolution: Duration::from_millis(5),
        }
    }
}

impl DriverConfig {
    /// Create a new driver config with the specified polling resolution.
    ///
    /// The resolution bounds how late a timer can fire: a trailing edge due
    /// at `t` runs no later than `t + resolution` under an idle scheduler.
    ///
    /// # Errors
    /// Returns `DriverConfigError::ZeroResolution` if `resolution` is zero.
    pub fn new(resolution: Duration) -> Result<Self, DriverConfigError> {
        if resolution.is_zero() {
            return Err(DriverConfigError::ZeroResolution);
        }
        Ok(Self { resolution })
    }
}

/// Polls a [`TimerQueue`] for due timers on a background tokio task.
pub struct PacingDriver {
    queue: Arc<TimerQueue>,
    clock: Arc<dyn Clock>,
    config: DriverConfig,
}

impl PacingDriver {
    /// Create a new driver over the given queue and clock.
    pub fn new(queue: Arc<TimerQueue>, clock: Arc<dyn Clock>, config: DriverConfig) -> Self {
        Self {
            queue,
            clock,
            config,
        }
    }

    /// Run a single driver pass, firing every timer due at the clock's
    /// current time.
    ///
    /// Returns the number of timers fired.
    pub fn run_once(&self) -> usize {
        self.queue.run_due(self.clock.now())
    }

    /// Start polling on a background task.
    ///
    /// The task runs until the returned [`DriverHandle`] is shut down or
    /// dropped. On a clean shutdown the driver makes one final pass, so
    /// timers that were already due still fire; timers due later never do.
    pub fn start(self) -> DriverHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.config.resolution);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let fired = self.run_once();
                        if fired > 0 {
                            tracing::trace!(fired, "driver pass fired timers");
                        }
                    }
                    // A send or a dropped handle both end the loop.
                    _ = shutdown_rx.changed() => break,
                }
            }

            self.run_once();
            tracing::debug!("pacing driver stopped");
        });

        DriverHandle { shutdown_tx, task }
    }

    /// Get the driver configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Get a reference to the queue being driven.
    pub fn queue(&self) -> &Arc<TimerQueue> {
        &self.queue
    }
}

impl std::fmt::Debug for PacingDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacingDriver")
            .field("config", &self.config)
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// Handle to a running [`PacingDriver`] task.
///
/// Dropping the handle signals the task to stop on its next pass without
/// waiting for it. Call [`shutdown`](DriverHandle::shutdown) to wait for the
/// task to finish and surface a panic as an error.
#[derive(Debug)]
pub struct DriverHandle {
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl DriverHandle {
    /// Stop the driver and wait for its task to exit.
    ///
    /// # Errors
    ///
    /// Returns `ShutdownError::TaskPanicked` if the task panicked instead of
    /// exiting cleanly.
    pub async fn shutdown(self) -> Result<(), ShutdownError> {
        // The task may have exited already; a failed send is fine.
        let _ = self.shutdown_tx.send(true);
        self.task.await.map_err(|_| ShutdownError::TaskPanicked)
    }

    /// Check whether the driver task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
