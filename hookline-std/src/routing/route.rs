//! Pattern routes on top of the claim protocol.
//!
//! [`on_route`] registers a [`ROUTE_REQUEST`] listener that claims the
//! request when both the method and the `{name}` pattern match.
//!
//! ```rust
//! use hookline_core::DEFAULT_PRIORITY;
//! use hookline_std::{
//!     bus::EventBus,
//!     routing::{Dispatcher, RouteParams, RouteRequest, on_route},
//! };
//!
//! let mut bus = EventBus::new();
//! on_route(&mut bus, "GET", "/blog/{slug}", |_: &RouteRequest, params: &RouteParams| {
//!     format!("post {}", params.get("slug").unwrap_or_default())
//! }, DEFAULT_PRIORITY)
//! .unwrap();
//!
//! let response = Dispatcher::default().dispatch(&bus, "/blog/hello", "GET").unwrap();
//! assert_eq!(response.body(), Some("post hello"));
//! ```

use super::{dispatch::RouteRequest, uri::RouteParams};
use crate::bus::EventBus;
use hookline_core::{
    HookError, IntoResponse, Method, Priority, Subscription, events::ROUTE_REQUEST,
};
use thiserror::Error;
use tracing::trace;

/// Method name matching every request method.
pub const ANY_METHOD: &str = "ANY";

/// Errors raised when registering a route.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The pattern can never match a normalized URI.
    #[error("invalid route pattern `{0}`")]
    InvalidPattern(String),
    /// The underlying listener registration failed.
    #[error(transparent)]
    Hook(#[from] HookError),
}

// ============================================================================
// RouteHandler Trait
// ============================================================================

/// Produces the response for a matched route.
///
/// Implemented for closures taking the request and the captured parameters.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle a route",
    label = "expected `Fn(&RouteRequest, &RouteParams) -> impl IntoResponse`"
)]
pub trait RouteHandler: Send + Sync + 'static {
    /// The response type.
    type Output: IntoResponse;

    /// Handle a matched request.
    fn handle(&self, request: &RouteRequest, params: &RouteParams) -> Self::Output;
}

impl<F, R> RouteHandler for F
where
    F: Fn(&RouteRequest, &RouteParams) -> R + Send + Sync + 'static,
    R: IntoResponse,
{
    type Output = R;

    fn handle(&self, request: &RouteRequest, params: &RouteParams) -> R {
        (self)(request, params)
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Claim requests whose method and URI match `method` and `pattern`.
///
/// `method` is case-insensitive; [`ANY_METHOD`] or `*` match every method.
/// Requests already sealed by a redirect are skipped.
pub fn on_route(
    bus: &mut EventBus,
    method: &str,
    pattern: &str,
    handler: impl RouteHandler,
    priority: Priority,
) -> Result<Subscription, RouteError> {
    if pattern.contains('?') || pattern.contains('#') {
        return Err(RouteError::InvalidPattern(pattern.to_owned()));
    }

    let method = match Method::new(method) {
        m if m == ANY_METHOD || m == "*" => None,
        m => Some(m),
    };
    let pattern = pattern.to_owned();
    trace!(%pattern, method = method.as_ref().map_or(ANY_METHOD, Method::as_str), "route registered");

    let subscription = bus.on(
        ROUTE_REQUEST,
        move |request: &RouteRequest| {
            if request.is_terminated() {
                return;
            }
            if method.as_ref().is_some_and(|m| m != request.method()) {
                return;
            }
            if let Some(params) = request.match_pattern(&pattern) {
                request.claim(handler.handle(request, &params));
            }
        },
        priority,
    )?;
    Ok(subscription)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Dispatcher;
    use hookline_core::{DEFAULT_PRIORITY, Response};

    fn echo(_: &RouteRequest, params: &RouteParams) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn method_and_pattern_must_match() {
        let mut bus = EventBus::new();
        on_route(&mut bus, "post", "/items/{id}", echo, DEFAULT_PRIORITY).unwrap();
        let dispatcher = Dispatcher::default();

        let hit = dispatcher.dispatch(&bus, "/items/7", "POST");
        assert_eq!(hit, Some(Response::ok("id=7")));

        let wrong_method = dispatcher.dispatch(&bus, "/items/7", "GET").unwrap();
        assert_eq!(wrong_method.status(), 404);
    }

    #[test]
    fn any_method_matches_everything() {
        let mut bus = EventBus::new();
        on_route(&mut bus, ANY_METHOD, "/health", |_: &RouteRequest, _: &RouteParams| "ok", DEFAULT_PRIORITY)
            .unwrap();
        let dispatcher = Dispatcher::default();

        for method in ["GET", "DELETE", "options"] {
            assert_eq!(dispatcher.dispatch(&bus, "/health", method), Some(Response::ok("ok")));
        }
    }

    #[test]
    fn handler_may_return_status_tuples() {
        let mut bus = EventBus::new();
        on_route(&mut bus, "*", "/teapot", |_: &RouteRequest, _: &RouteParams| (418u16, "short and stout"), 1)
            .unwrap();

        let response = Dispatcher::default().dispatch(&bus, "/teapot", "BREW").unwrap();
        assert_eq!(response.status(), 418);
    }

    #[test]
    fn query_in_pattern_is_rejected() {
        let mut bus = EventBus::new();
        let err = on_route(&mut bus, "GET", "/search?q={q}", echo, DEFAULT_PRIORITY).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern(p) if p == "/search?q={q}"));
        assert!(!bus.has_listeners(ROUTE_REQUEST));
    }
}
