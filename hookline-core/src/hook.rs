//! # Hook primitives
//!
//! A hook is a named extension point. Listeners attach to it with a priority
//! and are invoked in ascending priority order, registration order breaking
//! ties.
//!
//! There are two kinds of hooks:
//!
//! - **Actions** run listeners for their side effects. A listener receives a
//!   shared reference to the payload: [`ActionFn`].
//! - **Filters** thread a value through every listener, each one receiving the
//!   previous listener's output: [`FilterFn`].
//!
//! Every registration yields a [`Subscription`], the only way to remove that
//! listener again.

use crate::context::ScopeContext;
use std::{fmt, sync::Arc};

/// Ordering key for listeners. Lower values run first.
pub type Priority = i32;

/// Priority used when the caller has no preference.
pub const DEFAULT_PRIORITY: Priority = 10;

/// Signature of an action listener for payload `P`.
pub type ActionFn<P> = dyn Fn(&P) + Send + Sync;

/// Signature of a filter listener for values `T` with extra arguments `A`.
pub type FilterFn<T, A = ()> = dyn Fn(T, &A) -> T + Send + Sync;

/// Unique identifier of one registration on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a raw identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a hook transforms a value or only observes a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Fired for side effects; listener return values are discarded.
    Action,
    /// Fired to transform a value through the listener chain.
    Filter,
}

/// Handle to a single registration.
///
/// Returned by every registration and required to remove it again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    event: Arc<str>,
    id: ListenerId,
    priority: Priority,
    scoped: bool,
}

impl Subscription {
    /// Create a subscription handle.
    pub fn new(event: &str, id: ListenerId, priority: Priority, scoped: bool) -> Self {
        Self {
            event: Arc::from(event),
            id,
            priority,
            scoped,
        }
    }

    /// The event the listener is attached to.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// The registration identifier.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The priority the listener was registered with.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Whether the listener lives in the scoped registry.
    pub fn is_scoped(&self) -> bool {
        self.scoped
    }
}

/// Diagnostic description of one registered listener.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerInfo {
    /// Event name.
    pub event: String,
    /// Registration identifier.
    pub id: ListenerId,
    /// Registration priority.
    pub priority: Priority,
    /// Action or filter.
    pub kind: HookKind,
    /// Rust type name of the listener signature.
    pub signature: &'static str,
    /// Declared context for scoped listeners.
    pub scope: Option<ScopeContext>,
}
