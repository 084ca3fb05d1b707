//! Copy-on-write publication of an [`EventBus`].
//!
//! Readers take an owned snapshot and dispatch against it without locking.
//! Writers clone the current bus, mutate the clone and swap it in; a writer
//! that lost a race re-applies its change to the newer bus. A snapshot never
//! observes registrations made after it was taken, so a listener may register
//! further listeners in the middle of a dispatch.

use super::EventBus;
use arc_swap::ArcSwap;
use std::{fmt, sync::Arc};
use tracing::trace;

/// A shared, atomically replaceable [`EventBus`].
pub struct LiveBus {
    current: ArcSwap<EventBus>,
}

impl LiveBus {
    /// Publish `bus` as the initial state.
    pub fn new(bus: EventBus) -> Self {
        Self {
            current: ArcSwap::from_pointee(bus),
        }
    }

    /// The bus as of now. Later updates do not affect the returned value.
    pub fn snapshot(&self) -> Arc<EventBus> {
        self.current.load_full()
    }

    /// Apply `update` to a copy of the current bus and publish the result.
    ///
    /// `update` may run more than once when writers race, so it should only
    /// touch the bus it is given.
    pub fn register<R>(&self, mut update: impl FnMut(&mut EventBus) -> R) -> R {
        loop {
            let current = self.current.load_full();
            let mut next = EventBus::clone(&current);
            let out = update(&mut next);

            let previous = self.current.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&previous, &current) {
                return out;
            }
            trace!("bus changed during update, retrying");
        }
    }

    /// Replace the published bus wholesale.
    pub fn store(&self, bus: EventBus) {
        self.current.store(Arc::new(bus));
    }
}

impl Default for LiveBus {
    fn default() -> Self {
        Self::new(EventBus::new())
    }
}

impl From<EventBus> for LiveBus {
    fn from(bus: EventBus) -> Self {
        Self::new(bus)
    }
}

impl fmt::Debug for LiveBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LiveBus").field(&*self.current.load()).finish()
    }
}
