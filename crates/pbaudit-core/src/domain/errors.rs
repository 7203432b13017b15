//! Domain error types
//!
//! Errors raised by the pure parts of pbaudit (conversion and reporting) when
//! their input is malformed.

use thiserror::Error;

/// Errors that can occur while interpreting audit documents
#[derive(Debug, Error)]
pub enum FormatError {
    /// A date did not match the expected `YYYY-MM-DD` form
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The offending date string
        value: String,
    },

    /// The document is neither an `accounts` mapping nor a list of records
    #[error("Unable to determine record shape: {0}")]
    UnrecognizedShape(String),

    /// YAML (de)serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormatError {
    /// Creates an [`FormatError::InvalidDate`] for the given value
    pub fn invalid_date(value: impl Into<String>) -> Self {
        FormatError::InvalidDate {
            value: value.into(),
        }
    }
}
