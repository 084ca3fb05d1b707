//! # hookline - Micro-Kernel Hook Bus
//!
//! `hookline` is an in-process publish/subscribe hook bus with a claim-based
//! HTTP router built on top of it. The kernel owns no routes: addons listen
//! for `route_request` and claim the requests they serve.
//!
//! ## Quick Start
//!
//! ```rust
//! use hookline::prelude::*;
//!
//! let mut bus = EventBus::new();
//! on_route(&mut bus, "GET", "/hello/{name}", |_: &RouteRequest, params: &RouteParams| {
//!     format!("Hello, {}!", params.get("name").unwrap_or("stranger"))
//! }, DEFAULT_PRIORITY)
//! .unwrap();
//!
//! let app = App::with_bus(KernelConfig::default(), bus);
//! let response = app.run(&RequestParts::new("/hello/ada", "GET")).unwrap();
//! assert_eq!(response.body(), Some("Hello, ada!"));
//! ```
//!
//! ## Crates
//!
//! - `hookline-core`: listener primitives, scopes, request and response records
//! - `hookline-std`: the [`EventBus`], [`LiveBus`] and [`Dispatcher`]
//! - `hookline` (this crate): the [`App`] kernel, configuration, tracing setup
//!   and addon discovery

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod telemetry;

#[cfg(feature = "inventory")]
pub mod addons;

pub use app::App;
pub use config::{ConfigError, FaultMode, KernelConfig};

pub use hookline_core::{
    // Scopes
    ContextValue,
    Scope,
    ScopeContext,
    // Errors
    BoxError,
    HookError,
    HooklineError,
    // Hooks
    ActionFn,
    DEFAULT_PRIORITY,
    FilterFn,
    HookKind,
    ListenerId,
    ListenerInfo,
    Priority,
    Subscription,
    // Requests and responses
    IntoResponse,
    Method,
    Params,
    Request,
    RequestEnvironment,
    RequestParts,
    Response,
    events,
    scope,
};

pub use hookline_std::{
    BasePath, DeprecationNotice, Deprecations, Dispatcher, EventBus, FaultPolicy, LiveBus,
    RouteError, RouteParams, RouteRequest, on_route,
};

/// Standard hook implementations.
pub mod hooks {
    pub use hookline_std::hooks::logging;
}

/// Testing utilities.
pub mod testing {
    pub use hookline_std::testing::{CallCounter, Recorder};
}

#[cfg(feature = "inventory")]
pub use inventory;

/// Prelude module - common imports for hookline.
///
/// ```rust
/// use hookline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        App, DEFAULT_PRIORITY, Dispatcher, EventBus, HookError, IntoResponse, KernelConfig,
        LiveBus, RequestParts, Response, RouteParams, RouteRequest, Scope, ScopeContext,
        Subscription, events, on_route, scope,
    };
}
