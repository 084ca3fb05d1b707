//! Deprecation notices for hooks and APIs.
//!
//! Each deprecated item is reported once per key. Reports are always recorded;
//! a report hands back a [`DeprecationNotice`] to [publish] only when
//! reporting is enabled and the application runs in debug mode.
//!
//! Recording and publishing are separate steps so a registry behind a lock
//! can be released before listeners of [`DEPRECATION_WARNING`] run.
//!
//! [publish]: DeprecationNotice::publish

use crate::bus::EventBus;
use hookline_core::events::DEPRECATION_WARNING;
use std::{collections::BTreeMap, panic::Location, time::SystemTime};
use tracing::warn;

/// Payload of the [`DEPRECATION_WARNING`] action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// Human-readable message.
    pub message: String,
    /// Deduplication key, e.g. the hook name or `function::argument`.
    pub key: String,
    /// `file:line` of the code that used the deprecated item.
    pub caller: String,
}

impl DeprecationNotice {
    /// Log the notice and trigger [`DEPRECATION_WARNING`] on `bus`.
    pub fn publish(&self, bus: &EventBus) {
        warn!(key = %self.key, caller = %self.caller, "{}", self.message);
        bus.trigger(DEPRECATION_WARNING, self);
    }
}

/// A recorded deprecation.
#[derive(Debug, Clone)]
pub struct DeprecationRecord {
    /// Human-readable message.
    pub message: String,
    /// When it was first reported.
    pub reported_at: SystemTime,
    /// `file:line` of the first use.
    pub caller: String,
}

/// Registry of reported deprecations.
#[derive(Debug, Clone)]
pub struct Deprecations {
    warnings: BTreeMap<String, DeprecationRecord>,
    enabled: bool,
    debug: bool,
}

impl Deprecations {
    /// Create a registry. Reporting is enabled; output additionally needs
    /// `debug`.
    pub fn new(debug: bool) -> Self {
        Self {
            warnings: BTreeMap::new(),
            enabled: true,
            debug,
        }
    }

    /// Report a deprecated hook.
    ///
    /// Returns the notice to publish, or `None` when the key was already
    /// reported or reporting is off.
    #[track_caller]
    pub fn hook(
        &mut self,
        hook: &str,
        version: &str,
        replacement: Option<&str>,
    ) -> Option<DeprecationNotice> {
        let mut message = format!("Hook \"{hook}\" is deprecated since version {version}.");
        if let Some(replacement) = replacement.filter(|r| !r.is_empty()) {
            message.push_str(&format!(" Use \"{replacement}\" instead."));
        }
        self.report(message, hook.to_owned(), Location::caller())
    }

    /// Report a deprecated function.
    #[track_caller]
    pub fn function(
        &mut self,
        function: &str,
        version: &str,
        replacement: Option<&str>,
    ) -> Option<DeprecationNotice> {
        let mut message = format!("Function {function} is deprecated since version {version}.");
        if let Some(replacement) = replacement.filter(|r| !r.is_empty()) {
            message.push_str(&format!(" Use {replacement} instead."));
        }
        self.report(message, function.to_owned(), Location::caller())
    }

    /// Report a deprecated argument of `function`.
    #[track_caller]
    pub fn argument(
        &mut self,
        function: &str,
        argument: &str,
        version: &str,
        note: Option<&str>,
    ) -> Option<DeprecationNotice> {
        let mut message =
            format!("The {argument} argument of {function} is deprecated since version {version}.");
        if let Some(note) = note.filter(|n| !n.is_empty()) {
            message.push(' ');
            message.push_str(note);
        }
        self.report(message, format!("{function}::{argument}"), Location::caller())
    }

    /// Report a deprecated property of `owner`.
    #[track_caller]
    pub fn property(
        &mut self,
        owner: &str,
        property: &str,
        version: &str,
        replacement: Option<&str>,
    ) -> Option<DeprecationNotice> {
        let mut message =
            format!("Property {owner}::${property} is deprecated since version {version}.");
        if let Some(replacement) = replacement.filter(|r| !r.is_empty()) {
            message.push_str(&format!(" Use {replacement} instead."));
        }
        self.report(message, format!("{owner}::{property}"), Location::caller())
    }

    fn report(
        &mut self,
        message: String,
        key: String,
        location: &Location<'_>,
    ) -> Option<DeprecationNotice> {
        if self.warnings.contains_key(&key) {
            return None;
        }
        let caller = format!("{}:{}", location.file(), location.line());
        self.warnings.insert(
            key.clone(),
            DeprecationRecord {
                message: message.clone(),
                reported_at: SystemTime::now(),
                caller: caller.clone(),
            },
        );

        self.is_reporting()
            .then_some(DeprecationNotice { message, key, caller })
    }

    /// Turn output on.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Turn output off. Reports are still recorded.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Set debug mode.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Whether reports are logged and broadcast.
    pub fn is_reporting(&self) -> bool {
        self.enabled && self.debug
    }

    /// All recorded deprecations by key.
    pub fn warnings(&self) -> &BTreeMap<String, DeprecationRecord> {
        &self.warnings
    }

    /// Number of recorded deprecations.
    pub fn count(&self) -> usize {
        self.warnings.len()
    }

    /// Forget every recorded deprecation.
    pub fn clear(&mut self) {
        self.warnings.clear();
    }
}

impl Default for Deprecations {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use hookline_core::DEFAULT_PRIORITY;

    fn listening_bus() -> (EventBus, Recorder<DeprecationNotice>) {
        let mut bus = EventBus::new();
        let notices = Recorder::new();
        bus.on(DEPRECATION_WARNING, notices.listener::<DeprecationNotice>(), DEFAULT_PRIORITY)
            .unwrap();
        (bus, notices)
    }

    #[test]
    fn messages_follow_item_kind() {
        let (bus, notices) = listening_bus();
        let mut deps = Deprecations::new(true);

        let reported = [
            deps.hook("old_hook", "3.1.0", Some("new_hook")),
            deps.function("zed_get", "3.0", None),
            deps.argument("render", "legacy", "2.5", Some("It is ignored.")),
            deps.property("Theme", "colors", "3.2", Some("Theme::palette")),
        ];
        for notice in reported.iter().flatten() {
            notice.publish(&bus);
        }

        let messages: Vec<_> = notices.events().into_iter().map(|n| n.message).collect();
        assert_eq!(
            messages,
            vec![
                r#"Hook "old_hook" is deprecated since version 3.1.0. Use "new_hook" instead."#,
                "Function zed_get is deprecated since version 3.0.",
                "The legacy argument of render is deprecated since version 2.5. It is ignored.",
                "Property Theme::$colors is deprecated since version 3.2. Use Theme::palette instead.",
            ]
        );
        assert!(deps.warnings().contains_key("render::legacy"));
        assert!(notices.events()[0].caller.contains("deprecation.rs:"));
    }

    #[test]
    fn reported_once_per_key() {
        let mut deps = Deprecations::new(true);

        assert!(deps.hook("old_hook", "1.0", None).is_some());
        assert!(deps.hook("old_hook", "1.0", None).is_none());
        assert_eq!(deps.count(), 1);

        deps.clear();
        let again = deps.hook("old_hook", "1.0", None).unwrap();
        assert_eq!(again.key, "old_hook");
    }

    #[test]
    fn silent_unless_enabled_in_debug() {
        let mut quiet = Deprecations::new(false);
        assert_eq!(quiet.hook("a", "1.0", None), None);
        assert_eq!(quiet.count(), 1);

        let mut disabled = Deprecations::new(true);
        disabled.disable();
        assert_eq!(disabled.hook("b", "1.0", None), None);
        assert!(!disabled.is_reporting());
        assert_eq!(disabled.count(), 1);

        disabled.enable();
        assert!(disabled.hook("c", "1.0", None).is_some());
    }

    #[test]
    fn publishing_needs_no_registry() {
        let (bus, notices) = listening_bus();
        let notice = Deprecations::new(true).function("zed_get", "3.0", None).unwrap();

        notice.publish(&bus);
        assert_eq!(notices.events(), vec![notice]);
    }
}
