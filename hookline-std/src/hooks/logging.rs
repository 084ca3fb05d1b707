//! Tracing observers for bus events.
//!
//! Observers are ordinary action listeners that log their payload and never
//! claim or modify anything.

use crate::{bus::EventBus, routing::RouteRequest};
use hookline_core::{
    HookError, Priority, Subscription,
    events::{ROUTE_NOT_FOUND, ROUTE_REQUEST},
};
use std::fmt::Debug;
use tracing::{debug, info};

/// Log every firing of `name` at debug level.
pub fn observe<P: Debug + 'static>(
    bus: &mut EventBus,
    name: &'static str,
    priority: Priority,
) -> Result<Subscription, HookError> {
    bus.on(
        name,
        move |payload: &P| debug!(event = name, ?payload, "event fired"),
        priority,
    )
}

/// Install the routing observers: every dispatched request before any route
/// listener runs, and every unclaimed request after all others ran.
pub fn install(bus: &mut EventBus) -> Result<Vec<Subscription>, HookError> {
    let incoming = bus.on(
        ROUTE_REQUEST,
        |request: &RouteRequest| {
            debug!(uri = request.uri(), method = %request.method(), "route request");
        },
        Priority::MIN,
    )?;
    let unclaimed = bus.on(
        ROUTE_NOT_FOUND,
        |request: &RouteRequest| {
            if !request.is_handled() {
                info!(uri = request.uri(), method = %request.method(), "no route claimed request");
            }
        },
        Priority::MAX,
    )?;
    Ok(vec![incoming, unclaimed])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Dispatcher;

    #[test]
    fn observers_do_not_claim() {
        let mut bus = EventBus::new();
        let subs = install(&mut bus).unwrap();
        observe::<u32>(&mut bus, "tick", 0).unwrap();

        assert_eq!(subs.len(), 2);
        bus.trigger("tick", &1u32);

        let response = Dispatcher::default().dispatch(&bus, "/x", "GET").unwrap();
        assert_eq!(response.status(), 404);

        for sub in &subs {
            assert!(bus.off(sub));
        }
        assert!(!bus.has_listeners(ROUTE_REQUEST));
    }
}
