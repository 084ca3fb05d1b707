//! Link-time addon discovery.
//!
//! Addons submit an [`Addon`] from anywhere in the final binary and are
//! registered on the bus at boot, without a central list.
//!
//! ```rust,ignore
//! use hookline::{addons::Addon, EventBus, HookError};
//!
//! fn register(bus: &mut EventBus) -> Result<(), HookError> {
//!     bus.on_filter("404_message", |_: String| "Nothing here".to_owned(), 10)?;
//!     Ok(())
//! }
//!
//! hookline::inventory::submit! { Addon::new("friendly-404", 10, register) }
//! ```

use hookline_core::{HookError, Priority};
use hookline_std::EventBus;
use tracing::{debug, info};

/// Registration entry point of one addon.
pub type RegisterFn = fn(&mut EventBus) -> Result<(), HookError>;

/// An addon collected via `inventory`.
#[derive(Debug, Clone, Copy)]
pub struct Addon {
    /// Name for logging and ordering ties.
    pub name: &'static str,
    /// Load order; lower loads first.
    pub priority: Priority,
    /// Registers the addon's listeners.
    pub register: RegisterFn,
}

impl Addon {
    /// Describe an addon.
    pub const fn new(name: &'static str, priority: Priority, register: RegisterFn) -> Self {
        Self {
            name,
            priority,
            register,
        }
    }
}

inventory::collect!(Addon);

/// All collected addons in load order: ascending priority, then name.
pub fn collected() -> Vec<&'static Addon> {
    let mut addons: Vec<&'static Addon> = inventory::iter::<Addon>.into_iter().collect();
    addons.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(b.name)));
    addons
}

/// Register every collected addon on `bus`. Returns how many were loaded.
///
/// Stops at the first addon that fails.
pub fn load_addons(bus: &mut EventBus) -> Result<usize, HookError> {
    let addons = collected();
    for addon in &addons {
        debug!(addon = addon.name, priority = addon.priority, "loading addon");
        (addon.register)(bus)?;
    }
    info!(count = addons.len(), "addons loaded");
    Ok(addons.len())
}
