//! Audit record types
//!
//! Two interchange shapes describe the same audits:
//!
//! - **Nested** ([`NestedDocument`]): `accounts -> audits`, calendar dates,
//!   floor lists as real lists. This is the hand-edited YAML form.
//! - **Flat** ([`FlatAudit`]): one record per audit carrying its account
//!   inline, an ISO timestamp, and the floor list encoded as a string. This is
//!   the form the remote store accepts.
//!
//! Optional fields carry serde defaults so that partially filled documents
//! still load: `status` defaults to `"completed"`, `note` to the empty
//! string, `score` and `id` to absent.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use super::errors::FormatError;
use super::floor::{decode_floors, Floor};

/// Status assigned to audits that do not state one
pub const DEFAULT_STATUS: &str = "completed";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn default_floor_encoding() -> Value {
    Value::String("[]".to_string())
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn status_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_status))
}

/// Accepts identifiers written as strings or bare numbers (`id: 1042`).
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_string(deserializer)?.unwrap_or_default())
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number identifier, found {}",
            other
        ))),
    }
}

// ============================================================================
// Nested shape
// ============================================================================

/// A nested audit document: `{accounts: [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub accounts: Vec<AccountAudits>,
}

impl NestedDocument {
    /// Total number of audits across all accounts
    pub fn audit_count(&self) -> usize {
        self.accounts.iter().map(|a| a.audits.len()).sum()
    }
}

/// One audited account and its audits, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountAudits {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audits: Vec<NestedAudit>,
}

impl AccountAudits {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            audits: Vec::new(),
        }
    }
}

/// A single audit in the nested shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedAudit {
    /// Calendar date, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visited_floors: Vec<Floor>,
    #[serde(default = "default_status", deserialize_with = "status_or_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(default)]
    pub score: Option<Number>,
    /// Identifier assigned by the remote store, once imported
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
}

impl NestedAudit {
    /// Creates an audit with default status and note and no floors
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            visited_floors: Vec::new(),
            status: default_status(),
            note: String::new(),
            score: None,
            id: None,
        }
    }
}

// ============================================================================
// Flat shape
// ============================================================================

/// A single audit in the flat shape, as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatAudit {
    /// Identifier of the owning account
    #[serde(default, deserialize_with = "lenient_string")]
    pub account: String,
    /// Timestamp, `YYYY-MM-DDT00:00:00.000Z`
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default = "default_status", deserialize_with = "status_or_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
    /// String-encoded floor list; a plain list is tolerated on input
    #[serde(default = "default_floor_encoding")]
    pub visited_floors: Value,
    #[serde(default)]
    pub score: Option<Number>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
}

impl FlatAudit {
    /// Returns true when the record carries a non-empty store identifier
    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Copy of this record with the identifier attached
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..self.clone()
        }
    }

    /// Copy of this record without the identifier, suitable as an update body
    pub fn without_id(&self) -> Self {
        Self {
            id: None,
            ..self.clone()
        }
    }

    /// Decoded floor list (lenient, see [`decode_floors`])
    pub fn floors(&self) -> Vec<Floor> {
        decode_floors(&self.visited_floors)
    }
}

// ============================================================================
// Shape detection
// ============================================================================

/// Which interchange shape a document uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    /// `{accounts: [...]}` (historically the YAML file)
    Nested,
    /// `[{account, date, ...}, ...]` (historically the JSON file)
    Flat,
}

impl RecordShape {
    /// Detects the shape of a parsed document.
    ///
    /// A mapping with an `accounts` key is nested; a sequence is flat.
    pub fn detect(document: &Value) -> Result<Self, FormatError> {
        match document {
            Value::Object(map) if map.contains_key("accounts") => Ok(RecordShape::Nested),
            Value::Array(_) => Ok(RecordShape::Flat),
            Value::Object(_) => Err(FormatError::UnrecognizedShape(
                "mapping has no 'accounts' key".to_string(),
            )),
            other => Err(FormatError::UnrecognizedShape(format!(
                "expected a mapping or a list, found {}",
                value_kind(other)
            ))),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

impl Display for RecordShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RecordShape::Nested => write!(f, "nested"),
            RecordShape::Flat => write!(f, "flat"),
        }
    }
}

impl FromStr for RecordShape {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nested" | "yaml" | "yml" => Ok(RecordShape::Nested),
            "flat" | "json" => Ok(RecordShape::Flat),
            other => Err(FormatError::UnrecognizedShape(format!(
                "unknown shape '{}' (expected nested or flat)",
                other
            ))),
        }
    }
}
