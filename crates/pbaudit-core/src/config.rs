//! Configuration module for pbaudit.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, environment overrides, defaults, and validation.
//!
//! Resolution order (later wins): built-in defaults, the YAML file, the
//! `POCKETBASE_*` environment variables, and finally CLI flags (applied by
//! the CLI itself).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding `store.url`
pub const ENV_URL: &str = "POCKETBASE_URL";
/// Environment variable overriding `store.email`
pub const ENV_EMAIL: &str = "POCKETBASE_EMAIL";
/// Environment variable overriding `store.password`
pub const ENV_PASSWORD: &str = "POCKETBASE_PASSWORD";
/// Environment variable overriding `store.collection`
pub const ENV_COLLECTION: &str = "POCKETBASE_COLLECTION";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for pbaudit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

/// Remote record store connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the PocketBase instance.
    pub url: String,
    /// Identity (usually an email) used for password authentication.
    pub email: String,
    /// Password for `email`. Prefer the environment variable over the file.
    pub password: String,
    /// Collection holding the audit records.
    pub collection: String,
}

/// Default file locations used when a command is not given explicit paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Nested (accounts -> audits) document.
    pub nested: PathBuf,
    /// Flat record list.
    pub flat: PathBuf,
    /// Nested document after identifiers were attached.
    pub nested_with_ids: PathBuf,
    /// Flat record list after import (records carry identifiers).
    pub flat_with_ids: PathBuf,
    /// Text report output.
    pub report: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                }
                Self::default()
            }
        }
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/pbaudit/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pbaudit")
            .join("config.yaml")
    }

    /// Applies `POCKETBASE_*` overrides read through `lookup`.
    ///
    /// Unset variables leave the current value untouched. `lookup` is usually
    /// `|key| std::env::var(key).ok()`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.store.url = url;
        }
        if let Some(email) = lookup(ENV_EMAIL) {
            self.store.email = email;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.store.password = password;
        }
        if let Some(collection) = lookup(ENV_COLLECTION) {
            self.store.collection = collection;
        }
    }

    /// Loads `path` (or defaults) and applies the process environment.
    pub fn resolve(path: &Path) -> Self {
        let mut config = Self::load_or_default(path);
        config.apply_env(|key| std::env::var(key).ok());
        config
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8090".to_string(),
            email: String::new(),
            password: String::new(),
            collection: "audits".to_string(),
        }
    }
}

impl StoreConfig {
    /// Returns true when both identity and password are set
    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            nested: PathBuf::from("audits.yml"),
            flat: PathBuf::from("pocketbase_audits.json"),
            nested_with_ids: PathBuf::from("audits_with_ids.yml"),
            flat_with_ids: PathBuf::from("pocketbase_audits_with_ids.json"),
            report: PathBuf::from("audit_report.txt"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"store.url"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- store ---
        if self.store.url.trim().is_empty() {
            errors.push(ValidationError {
                field: "store.url".into(),
                message: "must not be empty".into(),
            });
        } else if !(self.store.url.starts_with("http://") || self.store.url.starts_with("https://"))
        {
            errors.push(ValidationError {
                field: "store.url".into(),
                message: format!("must start with http:// or https:// (got '{}')", self.store.url),
            });
        }
        if self.store.collection.trim().is_empty() {
            errors.push(ValidationError {
                field: "store.collection".into(),
                message: "must not be empty".into(),
            });
        }

        // --- paths ---
        let paths = [
            ("paths.nested", &self.paths.nested),
            ("paths.flat", &self.paths.flat),
            ("paths.nested_with_ids", &self.paths.nested_with_ids),
            ("paths.flat_with_ids", &self.paths.flat_with_ids),
            ("paths.report", &self.paths.report),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}', expected one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}
