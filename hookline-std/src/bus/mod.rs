//! The event bus: actions, filters and their context-scoped variants.
//!
//! ```rust
//! use hookline_std::bus::EventBus;
//! use hookline_core::DEFAULT_PRIORITY;
//!
//! let mut bus = EventBus::new();
//! bus.on_filter("title", |title: String| format!("{title} | Site"), DEFAULT_PRIORITY)
//!     .unwrap();
//! bus.on_filter("title", |title: String| title.to_uppercase(), 20).unwrap();
//!
//! assert_eq!(bus.filter("title", "home".to_string()), "HOME | SITE");
//! assert_eq!(bus.filter("untouched", 7u32), 7);
//! ```
//!
//! # Signatures
//!
//! An event name is bound to the signature of its first registration, e.g.
//! `ActionFn<RouteRequest>` or `FilterFn<String>`. Registering another
//! signature under the same name fails with [`HookError::SignatureMismatch`];
//! dispatching with another type is logged and skipped. The binding is
//! released once the last listener of the event is removed.
//!
//! # Faults
//!
//! With [`FaultPolicy::Propagate`] (the default) a panicking listener unwinds
//! through `trigger`/`filter` and aborts the surrounding dispatch.
//! [`FaultPolicy::Isolate`] catches the panic, logs it and moves on to the
//! next listener; a failed filter step keeps the value it was given.

mod channel;
pub mod live;
pub mod registry;

pub use live::LiveBus;

use channel::{Channel, ErasedChannel};
use hookline_core::{
    ActionFn, FilterFn, HookError, HookKind, ListenerId, ListenerInfo, Priority, Scope,
    ScopeContext, Subscription,
};
use std::{
    any::{Any, type_name},
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{error, trace, warn};

/// What happens when a listener panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Let the panic unwind through the dispatch.
    #[default]
    Propagate,
    /// Catch, log and continue with the remaining listeners.
    Isolate,
}

/// Named registries of action and filter listeners.
///
/// Registration takes `&mut self`; dispatch takes `&self`. Populate the bus
/// during start-up, then share it (or publish it through a [`LiveBus`]) for
/// request handling.
pub struct EventBus {
    channels: HashMap<String, Box<dyn ErasedChannel>>,
    next_id: u64,
    fault_policy: FaultPolicy,
}

impl EventBus {
    /// Create an empty bus with [`FaultPolicy::Propagate`].
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            next_id: 0,
            fault_policy: FaultPolicy::default(),
        }
    }

    /// Create an empty bus with the given fault policy.
    pub fn with_fault_policy(fault_policy: FaultPolicy) -> Self {
        Self {
            fault_policy,
            ..Self::new()
        }
    }

    /// The active fault policy.
    pub fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy
    }

    /// Change the fault policy.
    pub fn set_fault_policy(&mut self, fault_policy: FaultPolicy) {
        self.fault_policy = fault_policy;
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register an action listener.
    ///
    /// The same callback may be registered any number of times; each call
    /// is an independent registration with its own [`Subscription`].
    pub fn on<P: 'static>(
        &mut self,
        name: &str,
        callback: impl Fn(&P) + Send + Sync + 'static,
        priority: Priority,
    ) -> Result<Subscription, HookError> {
        let callback: Arc<ActionFn<P>> = Arc::new(callback);
        self.register(name, HookKind::Action, callback, priority, None)
    }

    /// Register an action listener that only fires from
    /// [`trigger_scoped`](Self::trigger_scoped) when `scope` is satisfied.
    pub fn on_scoped<P: 'static>(
        &mut self,
        name: &str,
        callback: impl Fn(&P) + Send + Sync + 'static,
        scope: impl Scope,
        priority: Priority,
    ) -> Result<Subscription, HookError> {
        let callback: Arc<ActionFn<P>> = Arc::new(callback);
        self.register(name, HookKind::Action, callback, priority, Some(scope.scope()))
    }

    /// Register a filter listener.
    pub fn on_filter<T: 'static>(
        &mut self,
        name: &str,
        callback: impl Fn(T) -> T + Send + Sync + 'static,
        priority: Priority,
    ) -> Result<Subscription, HookError> {
        self.on_filter_with(name, move |value: T, _: &()| callback(value), priority)
    }

    /// Register a filter listener that also receives extra arguments.
    pub fn on_filter_with<T: 'static, A: 'static>(
        &mut self,
        name: &str,
        callback: impl Fn(T, &A) -> T + Send + Sync + 'static,
        priority: Priority,
    ) -> Result<Subscription, HookError> {
        let callback: Arc<FilterFn<T, A>> = Arc::new(callback);
        self.register(name, HookKind::Filter, callback, priority, None)
    }

    /// Remove a registration. Returns whether anything was removed.
    pub fn off(&mut self, subscription: &Subscription) -> bool {
        let name = subscription.event();
        let Some(channel) = self.channels.get_mut(name) else {
            return false;
        };
        let removed = channel.remove(subscription);
        if channel.is_empty() {
            self.channels.remove(name);
        }
        if removed {
            trace!(event = name, listener = subscription.id().get(), "listener removed");
        }
        removed
    }

    fn register<F>(
        &mut self,
        name: &str,
        kind: HookKind,
        callback: Arc<F>,
        priority: Priority,
        scope: Option<ScopeContext>,
    ) -> Result<Subscription, HookError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        let channel = self.channel_mut::<F>(name, kind)?;
        let scoped = scope.is_some();
        match scope {
            Some(scope) => channel.scoped.insert(id, priority, callback, scope),
            None => channel.plain.insert(id, priority, callback, ()),
        }
        trace!(event = name, priority, listener = id.get(), scoped, "listener registered");
        Ok(Subscription::new(name, id, priority, scoped))
    }

    fn allocate_id(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId::new(self.next_id)
    }

    fn channel_mut<F>(&mut self, name: &str, kind: HookKind) -> Result<&mut Channel<F>, HookError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        let channel = self
            .channels
            .entry(name.to_owned())
            .or_insert_with(|| Box::new(Channel::<F>::new(kind)) as Box<dyn ErasedChannel>);
        let registered = channel.signature();
        channel
            .as_any_mut()
            .downcast_mut::<Channel<F>>()
            .ok_or_else(|| HookError::SignatureMismatch {
                event: name.to_owned(),
                registered,
                requested: type_name::<F>(),
            })
    }

    fn channel<F>(&self, name: &str) -> Option<&Channel<F>>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        let channel = self.channels.get(name)?;
        let typed = channel.as_any().downcast_ref::<Channel<F>>();
        if typed.is_none() {
            warn!(
                event = name,
                registered = channel.signature(),
                requested = type_name::<F>(),
                "hook signature mismatch, listeners skipped"
            );
        }
        typed
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Invoke every plain listener of `name` in dispatch order.
    ///
    /// Extra arguments travel inside the payload, e.g. as a tuple.
    pub fn trigger<P: 'static>(&self, name: &str, payload: &P) {
        let Some(channel) = self.channel::<ActionFn<P>>(name) else {
            return;
        };
        for entry in channel.plain.sorted().iter() {
            self.invoke(name, || (entry.callback)(payload));
        }
    }

    /// Invoke every plain listener, then every scoped listener whose declared
    /// context is satisfied by `context`.
    pub fn trigger_scoped<P: 'static>(&self, name: &str, context: &impl Scope, payload: &P) {
        let Some(channel) = self.channel::<ActionFn<P>>(name) else {
            return;
        };
        for entry in channel.plain.sorted().iter() {
            self.invoke(name, || (entry.callback)(payload));
        }

        let scoped = channel.scoped.sorted();
        if scoped.is_empty() {
            return;
        }
        let supplied = context.scope();
        for entry in scoped.iter().filter(|e| e.meta.is_satisfied_by(&supplied)) {
            self.invoke(name, || (entry.callback)(payload));
        }
    }

    /// Thread `value` through every filter listener of `name`.
    ///
    /// Returns `value` unchanged when nothing is registered.
    pub fn filter<T: Clone + 'static>(&self, name: &str, value: T) -> T {
        self.filter_with(name, value, &())
    }

    /// Like [`filter`](Self::filter), passing `args` unchanged to every
    /// listener.
    pub fn filter_with<T: Clone + 'static, A: 'static>(&self, name: &str, value: T, args: &A) -> T {
        let Some(channel) = self.channel::<FilterFn<T, A>>(name) else {
            return value;
        };
        let mut value = value;
        for entry in channel.plain.sorted().iter() {
            value = match self.fault_policy {
                FaultPolicy::Propagate => (entry.callback)(value, args),
                FaultPolicy::Isolate => {
                    let fallback = value.clone();
                    match panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(value, args))) {
                        Ok(next) => next,
                        Err(payload) => {
                            report_fault(name, payload.as_ref());
                            fallback
                        }
                    }
                }
            };
        }
        value
    }

    fn invoke(&self, name: &str, call: impl FnOnce()) {
        match self.fault_policy {
            FaultPolicy::Propagate => call(),
            FaultPolicy::Isolate => {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(call)) {
                    report_fault(name, payload.as_ref());
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Whether `name` has any plain or scoped listener.
    pub fn has_listeners(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Number of listeners registered on `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.channels.get(name).map_or(0, |c| c.len())
    }

    /// Registered event names, sorted.
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Describe the listeners of one event, or of every event when `name` is
    /// `None`. Plain listeners come first, in dispatch order.
    pub fn listeners(&self, name: Option<&str>) -> Vec<ListenerInfo> {
        let mut out = Vec::new();
        match name {
            Some(name) => {
                if let Some(channel) = self.channels.get(name) {
                    channel.describe(name, &mut out);
                }
            }
            None => {
                for name in self.event_names() {
                    if let Some(channel) = self.channels.get(name) {
                        channel.describe(name, &mut out);
                    }
                }
            }
        }
        out
    }

    /// Drop the listeners of one event, or of every event.
    pub fn clear(&mut self, name: Option<&str>) {
        match name {
            Some(name) => {
                self.channels.remove(name);
            }
            None => self.channels.clear(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: self
                .channels
                .iter()
                .map(|(name, channel)| (name.clone(), channel.clone_channel()))
                .collect(),
            next_id: self.next_id,
            fault_policy: self.fault_policy,
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.event_names() {
            if let Some(channel) = self.channels.get(name) {
                map.entry(&name, &format_args!("{:?} x{}", channel.kind(), channel.len()));
            }
        }
        map.finish()
    }
}

fn report_fault(name: &str, payload: &(dyn Any + Send)) {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    };
    let err = HookError::ListenerPanicked {
        event: name.to_owned(),
        message,
    };
    error!(error = %err, "listener fault isolated");
}
