//! Type-erased per-event storage.
//!
//! Each event name owns one [`Channel`], bound to a single listener signature
//! `F` (for example `ActionFn<RouteRequest>`). The bus stores channels behind
//! [`ErasedChannel`] and recovers the typed channel by downcasting; a failed
//! downcast is a signature mismatch.

use super::registry::Registry;
use hookline_core::{HookKind, ListenerInfo, ScopeContext, Subscription};
use std::any::{Any, type_name};

/// Plain and scoped listeners sharing one signature.
pub(crate) struct Channel<F: ?Sized> {
    kind: HookKind,
    pub(crate) plain: Registry<F>,
    pub(crate) scoped: Registry<F, ScopeContext>,
}

impl<F: ?Sized> Channel<F> {
    pub(crate) fn new(kind: HookKind) -> Self {
        Self {
            kind,
            plain: Registry::new(),
            scoped: Registry::new(),
        }
    }
}

impl<F: ?Sized> Clone for Channel<F> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            plain: self.plain.clone(),
            scoped: self.scoped.clone(),
        }
    }
}

/// Object-safe view over a [`Channel`] of any signature.
pub(crate) trait ErasedChannel: Send + Sync + 'static {
    fn signature(&self) -> &'static str;
    fn kind(&self) -> HookKind;
    fn remove(&mut self, subscription: &Subscription) -> bool;
    fn is_empty(&self) -> bool;
    fn len(&self) -> usize;
    fn describe(&self, event: &str, out: &mut Vec<ListenerInfo>);
    fn clone_channel(&self) -> Box<dyn ErasedChannel>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<F> ErasedChannel for Channel<F>
where
    F: ?Sized + Send + Sync + 'static,
{
    fn signature(&self) -> &'static str {
        type_name::<F>()
    }

    fn kind(&self) -> HookKind {
        self.kind
    }

    fn remove(&mut self, subscription: &Subscription) -> bool {
        if subscription.is_scoped() {
            self.scoped.remove(subscription.id(), subscription.priority())
        } else {
            self.plain.remove(subscription.id(), subscription.priority())
        }
    }

    fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.scoped.is_empty()
    }

    fn len(&self) -> usize {
        self.plain.len() + self.scoped.len()
    }

    fn describe(&self, event: &str, out: &mut Vec<ListenerInfo>) {
        let signature = self.signature();
        out.extend(self.plain.sorted().iter().map(|entry| ListenerInfo {
            event: event.to_owned(),
            id: entry.id,
            priority: entry.priority,
            kind: self.kind,
            signature,
            scope: None,
        }));
        out.extend(self.scoped.sorted().iter().map(|entry| ListenerInfo {
            event: event.to_owned(),
            id: entry.id,
            priority: entry.priority,
            kind: self.kind,
            signature,
            scope: Some(entry.meta.clone()),
        }));
    }

    fn clone_channel(&self) -> Box<dyn ErasedChannel> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
