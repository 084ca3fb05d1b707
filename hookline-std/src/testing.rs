//! Testing utilities for hookline.
//!
//! - [`Recorder`]: collects values from listeners, in the order they arrive.
//! - [`CallCounter`]: counts listener invocations.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recorder
// ============================================================================

/// A shared, ordered log of values.
///
/// Clones share the same log, so one clone can move into a listener while
/// the test keeps another.
///
/// ```rust
/// use hookline_std::{bus::EventBus, testing::Recorder};
///
/// let mut bus = EventBus::new();
/// let seen = Recorder::new();
/// bus.on("saved", seen.listener::<u32>(), 10).unwrap();
///
/// bus.trigger("saved", &3u32);
/// assert_eq!(seen.events(), vec![3]);
/// ```
pub struct Recorder<T> {
    events: Arc<Mutex<Vec<T>>>,
}

impl<T> Recorder<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        // a panicking listener under test must not hide what was recorded
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a value.
    pub fn record(&self, value: T) {
        self.lock().push(value);
    }

    /// Number of recorded values.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T: Clone> Recorder<T> {
    /// A copy of the recorded values.
    pub fn events(&self) -> Vec<T> {
        self.lock().clone()
    }
}

impl<T: Clone + Send + 'static> Recorder<T> {
    /// An action listener that records a clone of every payload.
    pub fn listener<P>(&self) -> impl Fn(&P) + Send + Sync + 'static
    where
        P: ToOwned<Owned = T> + ?Sized + 'static,
    {
        let sink = self.clone();
        move |payload: &P| sink.record(payload.to_owned())
    }

    /// A pass-through filter listener that records every value it sees.
    pub fn tap(&self) -> impl Fn(T) -> T + Send + Sync + 'static {
        let sink = self.clone();
        move |value: T| {
            sink.record(value.clone());
            value
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

// ============================================================================
// Call Counter
// ============================================================================

/// Counts how many times its listeners ran.
#[derive(Clone, Default)]
pub struct CallCounter {
    count: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by one.
    pub fn hit(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    /// Current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    /// An action listener that increments this counter.
    pub fn listener<P: ?Sized + 'static>(&self) -> impl Fn(&P) + Send + Sync + 'static {
        let counter = self.clone();
        move |_: &P| counter.hit()
    }
}
