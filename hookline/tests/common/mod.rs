#![allow(dead_code)]

use hookline::{
    DEFAULT_PRIORITY, EventBus, RequestEnvironment, RouteRequest, events::ROUTE_REQUEST,
    testing::Recorder,
};

// ============================================================================
// Test Environment
// ============================================================================

/// A host environment with an optional URI and method.
#[derive(Clone, Debug, Default)]
pub struct TestEnv {
    pub uri: Option<String>,
    pub method: Option<String>,
}

impl TestEnv {
    pub fn new(uri: &str, method: &str) -> Self {
        Self {
            uri: Some(uri.to_owned()),
            method: Some(method.to_owned()),
        }
    }
}

impl RequestEnvironment for TestEnv {
    fn request_uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    fn request_method(&self) -> Option<&str> {
        self.method.as_deref()
    }
}

// ============================================================================
// Listener Helpers
// ============================================================================

/// Claim `uri` with `body` on `route_request`.
pub fn claim_uri(bus: &mut EventBus, uri: &'static str, body: &'static str, priority: i32) {
    bus.on(
        ROUTE_REQUEST,
        move |req: &RouteRequest| {
            if req.uri() == uri {
                req.claim(body);
            }
        },
        priority,
    )
    .unwrap();
}

/// Record `label` every time `event` fires with a `()` payload.
pub fn record_unit(bus: &mut EventBus, event: &str, log: &Recorder<&'static str>, label: &'static str) {
    let log = log.clone();
    bus.on(event, move |_: &()| log.record(label), DEFAULT_PRIORITY)
        .unwrap();
}
