//! Priority-bucketed listener storage.
//!
//! Listeners are grouped by priority. Dispatch order is the concatenation of
//! the groups in ascending priority, each group in insertion order. That
//! flattened order is memoized and dropped on every insert or removal.

use hookline_core::{ListenerId, Priority};
use std::{
    collections::BTreeMap,
    sync::{Arc, OnceLock},
};

/// One registration: a shared callback plus per-registry metadata.
pub struct Entry<F: ?Sized, M = ()> {
    /// Registration identifier.
    pub id: ListenerId,
    /// Registration priority.
    pub priority: Priority,
    /// The callback.
    pub callback: Arc<F>,
    /// Extra data, e.g. a declared scope.
    pub meta: M,
}

impl<F: ?Sized, M: Clone> Clone for Entry<F, M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            priority: self.priority,
            callback: Arc::clone(&self.callback),
            meta: self.meta.clone(),
        }
    }
}

/// Listeners for one event, ordered by priority then insertion.
pub struct Registry<F: ?Sized, M = ()> {
    buckets: BTreeMap<Priority, Vec<Entry<F, M>>>,
    sorted: OnceLock<Arc<[Entry<F, M>]>>,
}

impl<F: ?Sized, M: Clone> Registry<F, M> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            sorted: OnceLock::new(),
        }
    }

    /// Append a listener to its priority group.
    pub fn insert(&mut self, id: ListenerId, priority: Priority, callback: Arc<F>, meta: M) {
        self.buckets.entry(priority).or_default().push(Entry {
            id,
            priority,
            callback,
            meta,
        });
        self.invalidate();
    }

    /// Remove the registration `id` from the `priority` group.
    pub fn remove(&mut self, id: ListenerId, priority: Priority) -> bool {
        let Some(bucket) = self.buckets.get_mut(&priority) else {
            return false;
        };
        let Some(index) = bucket.iter().position(|entry| entry.id == id) else {
            return false;
        };
        bucket.remove(index);
        if bucket.is_empty() {
            self.buckets.remove(&priority);
        }
        self.invalidate();
        true
    }

    /// Listeners in dispatch order.
    ///
    /// Returns a shared snapshot, so listeners may run while the registry is
    /// borrowed elsewhere.
    pub fn sorted(&self) -> Arc<[Entry<F, M>]> {
        let sorted = self
            .sorted
            .get_or_init(|| self.buckets.values().flatten().cloned().collect());
        Arc::clone(sorted)
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Whether the dispatch order is currently memoized.
    pub fn is_cached(&self) -> bool {
        self.sorted.get().is_some()
    }

    fn invalidate(&mut self) {
        self.sorted.take();
    }
}

impl<F: ?Sized, M: Clone> Default for Registry<F, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized, M: Clone> Clone for Registry<F, M> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            sorted: self.sorted.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Label = dyn Fn() -> &'static str + Send + Sync;

    fn labels(registry: &Registry<Label>) -> Vec<&'static str> {
        registry.sorted().iter().map(|e| (e.callback)()).collect()
    }

    fn insert(registry: &mut Registry<Label>, id: u64, priority: Priority, label: &'static str) {
        registry.insert(ListenerId::new(id), priority, Arc::new(move || label), ());
    }

    #[test]
    fn orders_by_priority_then_insertion() {
        let mut registry = Registry::new();
        insert(&mut registry, 1, 10, "b1");
        insert(&mut registry, 2, 5, "a");
        insert(&mut registry, 3, 10, "b2");
        insert(&mut registry, 4, -1, "first");

        assert_eq!(labels(&registry), vec!["first", "a", "b1", "b2"]);
    }

    #[test]
    fn mutation_invalidates_cached_order() {
        let mut registry = Registry::new();
        insert(&mut registry, 1, 10, "x");
        assert!(!registry.is_cached());

        assert_eq!(labels(&registry), vec!["x"]);
        assert!(registry.is_cached());

        insert(&mut registry, 2, 1, "y");
        assert!(!registry.is_cached());
        assert_eq!(labels(&registry), vec!["y", "x"]);

        assert!(registry.remove(ListenerId::new(2), 1));
        assert!(!registry.is_cached());
        assert_eq!(labels(&registry), vec!["x"]);
    }

    #[test]
    fn remove_requires_matching_priority() {
        let mut registry = Registry::new();
        insert(&mut registry, 1, 10, "x");

        assert!(!registry.remove(ListenerId::new(1), 20));
        assert!(!registry.remove(ListenerId::new(9), 10));
        assert!(registry.remove(ListenerId::new(1), 10));
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
