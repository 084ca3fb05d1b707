//! Ready-made listeners.

pub mod logging;
