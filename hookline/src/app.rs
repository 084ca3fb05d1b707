//! The application kernel: process lifecycle and per-request handling.
//!
//! An [`App`] goes through three phases:
//!
//! 1. [`App::boot`], once per process: installs the tracing subscriber, then
//!    fires [`APP_INIT`] and [`APP_READY`] with `&App`. Addons typically
//!    register their listeners in `app_init`.
//! 2. [`App::handle`], once per request: the claim-based dispatch of the
//!    request, then the [`APP_OUTPUT`] filter over the response body when
//!    there is one.
//! 3. [`App::shutdown`], once: fires [`APP_SHUTDOWN`] and consumes the app.
//!
//! [`App::run`] does all three for a single request. Each stage dispatches
//! against a fresh snapshot of the [`LiveBus`], so listeners registered by an
//! earlier stage take part in the later ones.

use crate::{
    config::{ConfigError, KernelConfig},
    telemetry,
};
use hookline_core::{
    RequestEnvironment, Response,
    events::{APP_INIT, APP_OUTPUT, APP_READY, APP_SHUTDOWN},
};
use hookline_std::{DeprecationNotice, Deprecations, Dispatcher, EventBus, LiveBus};
use std::{
    path::Path,
    sync::{Mutex, MutexGuard, Once, PoisonError},
};
use tracing::{debug, info};

/// Configuration, router and bus of one application.
#[derive(Debug)]
pub struct App {
    config: KernelConfig,
    dispatcher: Dispatcher,
    bus: LiveBus,
    deprecations: Mutex<Deprecations>,
    booted: Once,
}

impl App {
    /// Create an application with an empty bus.
    pub fn new(config: KernelConfig) -> Self {
        Self::with_bus(config, EventBus::new())
    }

    /// Create an application around a pre-populated bus. The bus fault
    /// policy is taken from `config`.
    pub fn with_bus(config: KernelConfig, mut bus: EventBus) -> Self {
        bus.set_fault_policy(config.fault_policy());
        Self {
            dispatcher: Dispatcher::new(config.base_path()),
            deprecations: Mutex::new(Deprecations::new(config.debug)),
            bus: LiveBus::new(bus),
            booted: Once::new(),
            config,
        }
    }

    /// Create an application from a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::new(KernelConfig::load(path)?))
    }

    /// Create an application and register every collected addon.
    #[cfg(feature = "inventory")]
    pub fn with_addons(config: KernelConfig) -> Result<Self, hookline_core::HookError> {
        let mut bus = EventBus::new();
        crate::addons::load_addons(&mut bus)?;
        Ok(Self::with_bus(config, bus))
    }

    /// The loaded configuration.
    pub fn kernel_config(&self) -> &KernelConfig {
        &self.config
    }

    /// Look up an application setting by dot-separated key, e.g.
    /// `"database.host"`.
    pub fn config(&self, key: &str) -> Option<&toml::Value> {
        let mut parts = key.split('.');
        let mut value = self.config.settings.get(parts.next()?)?;
        for part in parts {
            value = value.as_table()?.get(part)?;
        }
        Some(value)
    }

    /// The router.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The shared bus.
    pub fn bus(&self) -> &LiveBus {
        &self.bus
    }

    /// Register listeners on the shared bus. See [`LiveBus::register`].
    pub fn register<R>(&self, update: impl FnMut(&mut EventBus) -> R) -> R {
        self.bus.register(update)
    }

    /// The deprecation registry.
    ///
    /// Notices returned while the guard is held are not published; prefer
    /// [`App::report_deprecation`]. Do not hold the guard across a dispatch.
    pub fn deprecations(&self) -> MutexGuard<'_, Deprecations> {
        self.deprecations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a deprecation and publish its notice on the bus.
    ///
    /// The registry lock is released before [`DEPRECATION_WARNING`] listeners
    /// run, so they may report deprecations themselves.
    ///
    /// ```rust
    /// # use hookline::{App, KernelConfig};
    /// let app = App::new(KernelConfig::from_toml_str("debug = true").unwrap());
    /// let notice = app.report_deprecation(|deps| deps.hook("old_hook", "2.0", None));
    /// assert_eq!(notice.map(|n| n.key), Some("old_hook".to_owned()));
    /// ```
    ///
    /// [`DEPRECATION_WARNING`]: hookline_core::events::DEPRECATION_WARNING
    pub fn report_deprecation(
        &self,
        report: impl FnOnce(&mut Deprecations) -> Option<DeprecationNotice>,
    ) -> Option<DeprecationNotice> {
        let notice = report(&mut *self.deprecations())?;
        notice.publish(&self.bus.snapshot());
        Some(notice)
    }

    /// Start the application: installs the tracing subscriber from
    /// `log_filter`, then fires [`APP_INIT`] and [`APP_READY`].
    ///
    /// Runs once; later calls return immediately. Listeners of these events
    /// must not call `boot` or [`App::handle`] themselves.
    pub fn boot(&self) {
        self.booted.call_once(|| {
            if let Err(err) = telemetry::init_tracing(&self.config.log_filter) {
                debug!(%err, "keeping the installed tracing subscriber");
            }
            info!(base_path = %self.dispatcher.base_path(), "booting");
            self.bus.snapshot().trigger(APP_INIT, self);
            self.bus.snapshot().trigger(APP_READY, self);
        });
    }

    /// Whether [`App::boot`] has run.
    pub fn is_booted(&self) -> bool {
        self.booted.is_completed()
    }

    /// Handle the request described by `env`, booting first if needed.
    ///
    /// Returns `None` when a handler claimed the request without a response.
    pub fn handle(&self, env: &impl RequestEnvironment) -> Option<Response> {
        self.boot();
        info!(
            uri = %self.dispatcher.current_uri(env),
            method = %self.dispatcher.current_method(env),
            "handling request"
        );

        let bus = self.bus.snapshot();
        let response = self
            .dispatcher
            .dispatch_env(&bus, env)
            .map(|response| response.map_body(|body| bus.filter(APP_OUTPUT, body)));
        debug!(status = response.as_ref().map(Response::status), "request dispatched");
        response
    }

    /// Stop the application: fires [`APP_SHUTDOWN`].
    pub fn shutdown(self) {
        info!("shutting down");
        self.bus.snapshot().trigger(APP_SHUTDOWN, &self);
    }

    /// Boot, handle the single request described by `env`, and shut down.
    pub fn run(self, env: &impl RequestEnvironment) -> Option<Response> {
        let response = self.handle(env);
        self.shutdown();
        response
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lookup_walks_tables() {
        let config = KernelConfig::from_toml_str(
            r#"
            [settings]
            site_name = "Zed"

            [settings.database]
            host = "localhost"
            port = 3306
            "#,
        )
        .unwrap();
        let app = App::new(config);

        assert_eq!(app.config("site_name").and_then(|v| v.as_str()), Some("Zed"));
        assert_eq!(app.config("database.host").and_then(|v| v.as_str()), Some("localhost"));
        assert_eq!(app.config("database.port").and_then(|v| v.as_integer()), Some(3306));
        assert!(app.config("database").is_some_and(|v| v.is_table()));
        assert!(app.config("database.user").is_none());
        assert!(app.config("site_name.length").is_none());
        assert!(app.config("").is_none());
    }

    #[test]
    fn fault_policy_follows_config() {
        let config = KernelConfig::from_toml_str(r#"fault_policy = "isolate""#).unwrap();
        let app = App::new(config);
        assert_eq!(
            app.bus().snapshot().fault_policy(),
            hookline_std::FaultPolicy::Isolate
        );
    }
}
