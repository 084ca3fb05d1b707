//! # hookline-core
//!
//! Core types for the hookline hook bus.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! addons that only need to describe listeners, scopes and responses, without
//! pulling in the bus and router from `hookline-std`.
//!
//! # Building Blocks
//!
//! - **Hooks** ([`hook`]): priorities, listener signatures ([`ActionFn`],
//!   [`FilterFn`]) and [`Subscription`] handles used for removal.
//! - **Scopes** ([`context`]): [`ScopeContext`] and the [`Scope`] trait used
//!   by context-gated listeners.
//! - **Requests** ([`request`]): the immutable [`Request`] record handed to
//!   route handlers and the [`RequestEnvironment`] it is read from.
//! - **Responses** ([`response`]): [`Response`] and [`IntoResponse`].
//! - **Event names** ([`events`]): the well-known hook names.
//!
//! # Error Types
//!
//! - [`HooklineError`] - Top-level error type
//! - [`HookError`] - Registration and listener errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod context;
mod error;
pub mod events;
pub mod hook;
pub mod request;
pub mod response;

// Re-exports
pub use context::{ContextValue, Scope, ScopeContext};
pub use error::{BoxError, HookError, HooklineError};
pub use hook::{
    ActionFn, DEFAULT_PRIORITY, FilterFn, HookKind, ListenerId, ListenerInfo, Priority,
    Subscription,
};
pub use request::{Method, Params, Request, RequestEnvironment, RequestParts};
pub use response::{IntoResponse, Response};
