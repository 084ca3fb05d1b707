//! Kernel configuration loaded from TOML.
//!
//! ```toml
//! base_path = "/shop"
//! fault_policy = "isolate"
//! log_filter = "hookline=debug"
//! debug = true
//!
//! [settings.database]
//! host = "localhost"
//! ```
//!
//! Every key is optional. `settings` is free-form and read back through
//! [`App::config`](crate::App::config).

use hookline_std::{BasePath, FaultPolicy};
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file path.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`KernelConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The values are well-formed but unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Listener fault handling, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultMode {
    /// See [`FaultPolicy::Propagate`].
    #[default]
    Propagate,
    /// See [`FaultPolicy::Isolate`].
    Isolate,
}

impl From<FaultMode> for FaultPolicy {
    fn from(mode: FaultMode) -> Self {
        match mode {
            FaultMode::Propagate => FaultPolicy::Propagate,
            FaultMode::Isolate => FaultPolicy::Isolate,
        }
    }
}

/// Top-level kernel configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Deployment subdirectory, e.g. `/shop`.
    pub base_path: Option<String>,
    /// Entry script path; its directory is used as the base path when
    /// `base_path` is not set.
    pub script_name: Option<String>,
    /// What happens when a listener panics.
    pub fault_policy: FaultMode,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset, applied by
    /// [`App::boot`](crate::App::boot).
    pub log_filter: String,
    /// Debug mode; enables deprecation reporting.
    pub debug: bool,
    /// Application settings.
    pub settings: toml::Table,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            script_name: None,
            fault_policy: FaultMode::default(),
            log_filter: "hookline=info".to_owned(),
            debug: false,
            settings: toml::Table::new(),
        }
    }
}

impl KernelConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.base_path {
            if !base.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "base_path `{base}` must start with `/`"
                )));
            }
            if base.ends_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "base_path `{base}` must not end with `/`"
                )));
            }
            if self.script_name.is_some() {
                return Err(ConfigError::Invalid(
                    "set either base_path or script_name, not both".to_owned(),
                ));
            }
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".to_owned()));
        }
        Ok(())
    }

    /// The effective deployment base path.
    pub fn base_path(&self) -> BasePath {
        match (&self.base_path, &self.script_name) {
            (Some(base), _) => BasePath::new(base),
            (None, Some(script)) => BasePath::from_script_name(script),
            (None, None) => BasePath::none(),
        }
    }

    /// The effective fault policy.
    pub fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = KernelConfig::from_toml_str("").unwrap();
        assert_eq!(config, KernelConfig::default());
        assert_eq!(config.log_filter, "hookline=info");
        assert!(config.base_path().is_root());
        assert_eq!(config.fault_policy(), FaultPolicy::Propagate);
    }

    #[test]
    fn parses_all_fields() {
        let config = KernelConfig::from_toml_str(
            r#"
            base_path = "/shop"
            fault_policy = "isolate"
            debug = true

            [settings.database]
            host = "db.local"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_path().as_str(), "/shop");
        assert_eq!(config.fault_policy(), FaultPolicy::Isolate);
        assert!(config.debug);
        assert!(config.settings.contains_key("database"));
    }

    #[test]
    fn script_name_derives_base_path() {
        let config = KernelConfig::from_toml_str(r#"script_name = "/ZedCMS/index.php""#).unwrap();
        assert_eq!(config.base_path().as_str(), "/ZedCMS");
    }

    #[test]
    fn rejects_bad_values() {
        for doc in [
            r#"base_path = "shop""#,
            r#"base_path = "/shop/""#,
            "base_path = \"/a\"\nscript_name = \"/b/index.php\"",
            r#"log_filter = " ""#,
        ] {
            let err = KernelConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{doc}: {err}");
        }

        let err = KernelConfig::from_toml_str(r#"fault_policy = "ignore""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = KernelConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
