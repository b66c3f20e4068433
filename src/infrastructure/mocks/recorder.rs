//! Invocation recorder for testing.

use std::sync::{Arc, Mutex};

/// Records callback invocations for assertions.
///
/// Hand [`callback`](Recorder::callback) to a pacer under test and inspect
/// what actually ran afterwards. Clones share the same entry list.
///
/// # Example
/// ```
/// use cadencia::infrastructure::mocks::Recorder;
///
/// let recorder = Recorder::new();
/// let callback = recorder.callback();
///
/// callback("hello");
/// callback("world");
///
/// assert_eq!(recorder.count(), 2);
/// assert_eq!(recorder.last(), Some("world"));
/// ```
#[derive(Debug, Clone)]
pub struct Recorder<T> {
    entries: Arc<Mutex<Vec<T>>>,
}

impl<T> Recorder<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback that appends its argument to this recorder.
    pub fn callback(&self) -> impl Fn(T) + Send + Sync + 'static
    where
        T: Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        move |value| {
            entries
                .lock()
                .expect("Recorder mutex poisoned - a test thread panicked while holding the lock")
                .push(value)
        }
    }

    /// Number of recorded invocations.
    pub fn count(&self) -> usize {
        self.entries
            .lock()
            .expect("Recorder mutex poisoned - a test thread panicked while holding the lock")
            .len()
    }

    /// All recorded arguments, in invocation order.
    pub fn calls(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries
            .lock()
            .expect("Recorder mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }

    /// The most recent recorded argument, if any.
    pub fn last(&self) -> Option<T>
    where
        T: Clone,
    {
        self.entries
            .lock()
            .expect("Recorder mutex poisoned - a test thread panicked while holding the lock")
            .last()
            .cloned()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("Recorder mutex poisoned - a test thread panicked while holding the lock")
            .clear()
    }
}

impl<K, V> Recorder<(K, V)> {
    /// A two-argument callback that appends `(key, value)` pairs, for use
    /// with keyed pacers.
    pub fn keyed_callback(&self) -> impl Fn(K, V) + Send + Sync + 'static
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        move |key, value| {
            entries
                .lock()
                .expect("Recorder mutex poisoned - a test thread panicked while holding the lock")
                .push((key, value))
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}
