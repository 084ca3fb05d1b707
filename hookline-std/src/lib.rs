//! # hookline-std
//!
//! The event bus and the claim-based router of hookline.
//!
//! This crate provides:
//! - **Event bus**: [`EventBus`] with actions, filters and scoped listeners,
//!   plus [`LiveBus`] for registration while requests are served
//! - **Routing**: [`Dispatcher`], [`RouteRequest`], [`on_route`]
//! - **Standard hooks**: tracing observers
//! - **Deprecations**: [`Deprecations`]
//! - **Testing**: [`testing::Recorder`], [`testing::CallCounter`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use hookline_core;

// Modules
pub mod bus;
pub mod deprecation;
pub mod hooks;
pub mod routing;
pub mod testing;

pub use bus::{EventBus, FaultPolicy, LiveBus};
pub use deprecation::{DeprecationNotice, Deprecations};
pub use routing::{BasePath, Dispatcher, RouteError, RouteParams, RouteRequest, on_route};
