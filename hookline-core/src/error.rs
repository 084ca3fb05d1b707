//! Error types for hookline.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`HooklineError`] - Top-level error type for all hookline operations
//! - [`HookError`] - Errors raised while registering or invoking listeners

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all hookline operations.
#[derive(Error, Debug)]
pub enum HooklineError {
    /// An error occurred while registering or invoking a hook.
    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors that can occur around hooks.
#[derive(Error, Debug)]
pub enum HookError {
    /// The event name is already bound to listeners of another signature.
    #[error("event `{event}` is bound to `{registered}`, not `{requested}`")]
    SignatureMismatch {
        /// The event name.
        event: String,
        /// Signature the event was first registered with.
        registered: &'static str,
        /// Signature of the rejected registration.
        requested: &'static str,
    },

    /// A listener panicked while the bus isolated listener faults.
    #[error("listener on `{event}` panicked: {message}")]
    ListenerPanicked {
        /// The event being dispatched.
        event: String,
        /// The panic payload, when it was a string.
        message: String,
    },

    /// A custom hook error.
    #[error(transparent)]
    Custom(BoxError),
}

impl HookError {
    /// Name of the event this error concerns, if any.
    pub fn event(&self) -> Option<&str> {
        match self {
            HookError::SignatureMismatch { event, .. } | HookError::ListenerPanicked { event, .. } => {
                Some(event)
            }
            HookError::Custom(_) => None,
        }
    }
}

// Convenience conversions
impl From<BoxError> for HooklineError {
    fn from(err: BoxError) -> Self {
        HooklineError::Custom(err)
    }
}

impl From<BoxError> for HookError {
    fn from(err: BoxError) -> Self {
        HookError::Custom(err)
    }
}
