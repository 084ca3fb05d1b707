//! Claim-based request dispatch.
//!
//! The dispatcher owns no routes. It normalizes the request, fires
//! [`ROUTE_REQUEST`] with a fresh [`RouteRequest`] and lets listeners claim
//! it. Unclaimed requests go through [`ROUTE_NOT_FOUND`] and finally a
//! filterable 404.
//!
//! ```rust
//! use hookline_core::{DEFAULT_PRIORITY, events::ROUTE_REQUEST};
//! use hookline_std::{bus::EventBus, routing::{Dispatcher, RouteRequest}};
//!
//! let mut bus = EventBus::new();
//! bus.on(
//!     ROUTE_REQUEST,
//!     |req: &RouteRequest| {
//!         if req.uri() == "/ping" {
//!             req.claim("pong");
//!         }
//!     },
//!     DEFAULT_PRIORITY,
//! )
//! .unwrap();
//!
//! let dispatcher = Dispatcher::default();
//! let response = dispatcher.dispatch(&bus, "/ping/", "get").unwrap();
//! assert_eq!(response.body(), Some("pong"));
//!
//! let missing = dispatcher.dispatch(&bus, "/nope", "GET").unwrap();
//! assert_eq!(missing.status(), 404);
//! ```

use super::uri::{BasePath, RouteParams};
use crate::bus::EventBus;
use hookline_core::{
    IntoResponse, Method, Request, RequestEnvironment, RequestParts, Response,
    events::{NOT_FOUND_MESSAGE, ROUTE_NOT_FOUND, ROUTE_REQUEST},
};
use std::cell::RefCell;
use tracing::{debug, warn};

/// Normalizes requests and runs the claim protocol over an [`EventBus`].
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    base_path: BasePath,
}

impl Dispatcher {
    /// Create a dispatcher for an application deployed under `base_path`.
    pub fn new(base_path: BasePath) -> Self {
        Self { base_path }
    }

    /// The deployment base path.
    pub fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    /// See [`BasePath::normalize`].
    pub fn normalize_uri(&self, uri: &str) -> String {
        self.base_path.normalize(uri)
    }

    /// See [`BasePath::segments`].
    pub fn segments(&self, uri: &str) -> Vec<String> {
        self.base_path.segments(uri)
    }

    /// See [`BasePath::match_pattern`].
    pub fn match_pattern(&self, pattern: &str, uri: &str) -> Option<RouteParams> {
        self.base_path.match_pattern(pattern, uri)
    }

    /// See [`BasePath::url`].
    pub fn url(&self, path: &str) -> String {
        self.base_path.url(path)
    }

    /// The normalized URI of the incoming request, `/` when absent.
    pub fn current_uri(&self, env: &impl RequestEnvironment) -> String {
        self.normalize_uri(env.request_uri().unwrap_or("/"))
    }

    /// The uppercased method of the incoming request, `GET` when absent.
    pub fn current_method(&self, env: &impl RequestEnvironment) -> Method {
        env.request_method().map(Method::new).unwrap_or_default()
    }

    /// Dispatch a URI and method with no query or body parameters.
    pub fn dispatch(&self, bus: &EventBus, uri: &str, method: &str) -> Option<Response> {
        self.dispatch_request(bus, RequestParts::new(uri, method))
    }

    /// Dispatch the request described by the host environment.
    pub fn dispatch_env(&self, bus: &EventBus, env: &impl RequestEnvironment) -> Option<Response> {
        let parts = RequestParts {
            uri: env.request_uri().unwrap_or("/").to_owned(),
            method: env.request_method().unwrap_or("GET").to_owned(),
            query: env.query(),
            body: env.body(),
        };
        self.dispatch_request(bus, parts)
    }

    /// Run the claim protocol for one request.
    ///
    /// Returns the claimed response, `None` if a listener claimed without
    /// one, or the filtered not-found response.
    pub fn dispatch_request(&self, bus: &EventBus, parts: RequestParts) -> Option<Response> {
        let request = Request::new(
            self.normalize_uri(&parts.uri),
            Method::new(&parts.method),
            parts.query,
            parts.body,
        );
        let route = RouteRequest::new(request, self.base_path.clone());
        debug!(uri = route.uri(), method = %route.method(), "dispatching request");

        bus.trigger(ROUTE_REQUEST, &route);
        if route.is_handled() {
            return route.into_response();
        }

        debug!(uri = route.uri(), "request unclaimed");
        bus.trigger(ROUTE_NOT_FOUND, &route);
        if route.is_handled() {
            return route.into_response();
        }

        Some(not_found(bus, route.uri()))
    }
}

fn not_found(bus: &EventBus, uri: &str) -> Response {
    let message = bus.filter(NOT_FOUND_MESSAGE, format!("404 Not Found: {uri}"));
    Response::not_found(message)
}

#[derive(Debug, Default)]
struct Claim {
    handled: bool,
    sealed: bool,
    response: Option<Response>,
}

/// One dispatch in flight: the request record plus its claim state.
///
/// Handed to every [`ROUTE_REQUEST`] and [`ROUTE_NOT_FOUND`] listener.
/// Claiming more than once is allowed and the last claim wins, until a
/// [`redirect`](Self::redirect) seals the request.
#[derive(Debug)]
pub struct RouteRequest {
    request: Request,
    base_path: BasePath,
    claim: RefCell<Claim>,
}

impl RouteRequest {
    /// Wrap a request record in a fresh, unclaimed dispatch.
    pub fn new(request: Request, base_path: BasePath) -> Self {
        Self {
            request,
            base_path,
            claim: RefCell::new(Claim::default()),
        }
    }

    /// The immutable request record.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The normalized URI.
    pub fn uri(&self) -> &str {
        self.request.uri()
    }

    /// The uppercased method.
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Mark the request handled with `response`.
    pub fn claim(&self, response: impl IntoResponse) {
        self.set(Some(response.into_response()));
    }

    /// Mark the request handled without a response body.
    pub fn claim_empty(&self) {
        self.set(None);
    }

    fn set(&self, response: Option<Response>) {
        let mut claim = self.claim.borrow_mut();
        if claim.sealed {
            warn!(uri = self.uri(), "request already redirected, claim ignored");
            return;
        }
        if claim.handled {
            debug!(uri = self.uri(), "previous claim overridden");
        }
        claim.handled = true;
        claim.response = response;
    }

    /// Claim with a `302` redirect. See [`redirect_with_status`](Self::redirect_with_status).
    pub fn redirect(&self, target: &str) {
        self.redirect_with_status(target, 302);
    }

    /// Claim with a redirect and seal the request; later claims are ignored.
    ///
    /// Site-relative targets get the base path prepended.
    pub fn redirect_with_status(&self, target: &str, status: u16) {
        let location = self.base_path.redirect_target(target);
        self.set(Some(Response::redirect(location, status)));
        self.claim.borrow_mut().sealed = true;
    }

    /// Whether any listener claimed the request.
    pub fn is_handled(&self) -> bool {
        self.claim.borrow().handled
    }

    /// Whether a redirect sealed the request.
    pub fn is_terminated(&self) -> bool {
        self.claim.borrow().sealed
    }

    /// The currently stored response.
    pub fn response(&self) -> Option<Response> {
        self.claim.borrow().response.clone()
    }

    /// Match this request's URI against `pattern`.
    pub fn match_pattern(&self, pattern: &str) -> Option<RouteParams> {
        self.base_path.match_pattern(pattern, self.uri())
    }

    /// Non-empty segments of this request's URI.
    pub fn segments(&self) -> Vec<String> {
        self.base_path.segments(self.uri())
    }

    /// Prefix `path` with the base path.
    pub fn url(&self, path: &str) -> String {
        self.base_path.url(path)
    }

    fn into_response(self) -> Option<Response> {
        self.claim.into_inner().response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use hookline_core::DEFAULT_PRIORITY;

    fn claim_at(bus: &mut EventBus, event: &str, uri: &'static str, body: &'static str) {
        bus.on(
            event,
            move |req: &RouteRequest| {
                if req.uri() == uri {
                    req.claim(body);
                }
            },
            DEFAULT_PRIORITY,
        )
        .unwrap();
    }

    #[test]
    fn claimed_request_returns_response() {
        let mut bus = EventBus::new();
        claim_at(&mut bus, ROUTE_REQUEST, "/ping", "pong");

        let response = Dispatcher::default().dispatch(&bus, "/ping?x=1", "get");
        assert_eq!(response, Some(Response::ok("pong")));
    }

    #[test]
    fn request_record_is_normalized() {
        let mut bus = EventBus::new();
        let seen = Recorder::new();
        let sink = seen.clone();
        bus.on(
            ROUTE_REQUEST,
            move |req: &RouteRequest| {
                sink.record((req.uri().to_owned(), req.method().to_string()));
                req.claim_empty();
            },
            DEFAULT_PRIORITY,
        )
        .unwrap();

        let dispatcher = Dispatcher::new(BasePath::new("/app"));
        assert_eq!(dispatcher.dispatch(&bus, "/APP/Blog/", "post"), None);
        assert_eq!(seen.events(), vec![("/Blog".to_owned(), "POST".to_owned())]);
    }

    #[test]
    fn unclaimed_request_gets_filtered_404() {
        let mut bus = EventBus::new();
        bus.on_filter(NOT_FOUND_MESSAGE, |msg: String| format!("<h1>{msg}</h1>"), DEFAULT_PRIORITY)
            .unwrap();

        let response = Dispatcher::default().dispatch(&bus, "/missing", "GET").unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.body(), Some("<h1>404 Not Found: /missing</h1>"));
    }

    #[test]
    fn not_found_listener_can_claim() {
        let mut bus = EventBus::new();
        claim_at(&mut bus, ROUTE_NOT_FOUND, "/legacy", "moved");

        let response = Dispatcher::default().dispatch(&bus, "/legacy", "GET");
        assert_eq!(response.and_then(Response::into_body).as_deref(), Some("moved"));
    }

    #[test]
    fn last_claim_wins() {
        let mut bus = EventBus::new();
        bus.on(ROUTE_REQUEST, |req: &RouteRequest| req.claim("first"), 1)
            .unwrap();
        bus.on(ROUTE_REQUEST, |req: &RouteRequest| req.claim("second"), 2)
            .unwrap();

        let response = Dispatcher::default().dispatch(&bus, "/", "GET");
        assert_eq!(response, Some(Response::ok("second")));
    }

    #[test]
    fn redirect_seals_the_claim() {
        let mut bus = EventBus::new();
        bus.on(ROUTE_REQUEST, |req: &RouteRequest| req.redirect("/login"), 1)
            .unwrap();
        bus.on(ROUTE_REQUEST, |req: &RouteRequest| req.claim("too late"), 2)
            .unwrap();

        let dispatcher = Dispatcher::new(BasePath::new("/app"));
        let response = dispatcher.dispatch(&bus, "/app/admin", "GET").unwrap();
        assert_eq!(response.status(), 302);
        assert_eq!(response.location(), Some("/app/login"));
    }

    #[test]
    fn claim_state_does_not_leak_between_dispatches() {
        let mut bus = EventBus::new();
        claim_at(&mut bus, ROUTE_REQUEST, "/a", "a");
        let dispatcher = Dispatcher::default();

        assert_eq!(dispatcher.dispatch(&bus, "/a", "GET"), Some(Response::ok("a")));
        assert_eq!(dispatcher.dispatch(&bus, "/b", "GET").map(|r| r.status()), Some(404));
    }

    #[test]
    fn environment_accessors_fall_back() {
        struct Bare;
        impl RequestEnvironment for Bare {
            fn request_uri(&self) -> Option<&str> {
                None
            }
            fn request_method(&self) -> Option<&str> {
                None
            }
        }

        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.current_uri(&Bare), "/");
        assert_eq!(dispatcher.current_method(&Bare), Method::get());

        let parts = RequestParts::new("/x/?q=1", "patch");
        assert_eq!(dispatcher.current_uri(&parts), "/x");
        assert_eq!(dispatcher.current_method(&parts), "PATCH");
    }
}
