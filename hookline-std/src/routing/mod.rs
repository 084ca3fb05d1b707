//! # Routing
//!
//! Claim-based HTTP routing built on the event bus.
//!
//! - [`uri`]: base path handling, URI normalization and `{name}` patterns.
//! - [`dispatch`]: the [`Dispatcher`] and the per-dispatch [`RouteRequest`].
//! - [`route`]: [`on_route`] for method + pattern routes.

pub mod dispatch;
pub mod route;
pub mod uri;

pub use dispatch::{Dispatcher, RouteRequest};
pub use route::{ANY_METHOD, RouteError, RouteHandler, on_route};
pub use uri::{BasePath, RouteParams};
