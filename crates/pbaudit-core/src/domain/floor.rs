//! Floor identifiers
//!
//! Audits record which floors of a building were visited. Floors are usually
//! numbers (`3`, sometimes `1.5` for mezzanines), sometimes labels (`"B1"`,
//! `"M"`). The flat record shape stores the list as a JSON array encoded
//! inside a string (`"[3, 4]"`); this module owns both directions of that
//! encoding.

use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A single floor identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Floor {
    /// Numbered floor (negative numbers are basements)
    Number(Number),
    /// Named floor such as `"B1"` or `"Roof"`
    Label(String),
    /// Any other JSON value found in a floor list, kept verbatim
    Other(Value),
}

impl Floor {
    /// Integer floor
    pub fn number(n: i64) -> Self {
        Floor::Number(Number::from(n))
    }

    /// Interprets a JSON value as a floor
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => Floor::Number(n.clone()),
            Value::String(s) => Floor::Label(s.clone()),
            other => Floor::Other(other.clone()),
        }
    }

    /// JSON representation of this floor (`3`, `1.5` or `"B1"`)
    fn to_json(&self) -> String {
        match self {
            Floor::Number(n) => n.to_string(),
            Floor::Label(s) => Value::String(s.clone()).to_string(),
            Floor::Other(v) => v.to_string(),
        }
    }
}

impl Hash for Floor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Floor::Number(n) => n.hash(state),
            Floor::Label(s) => s.hash(state),
            Floor::Other(v) => v.to_string().hash(state),
        }
    }
}

impl Display for Floor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Floor::Number(n) => write!(f, "{}", n),
            Floor::Label(s) => write!(f, "{}", s),
            Floor::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Floor {
    fn from(n: i64) -> Self {
        Floor::number(n)
    }
}

impl From<&str> for Floor {
    fn from(s: &str) -> Self {
        Floor::Label(s.to_string())
    }
}

/// Encodes a floor list into its string form, e.g. `[3, 4]` -> `"[3, 4]"`.
///
/// Items are separated by `", "`; an empty list encodes as `"[]"`.
pub fn encode_floors(floors: &[Floor]) -> String {
    let items: Vec<String> = floors.iter().map(Floor::to_json).collect();
    format!("[{}]", items.join(", "))
}

/// Decodes the `visited_floors` field of a flat record.
///
/// Accepts either the string encoding produced by [`encode_floors`] or a
/// plain JSON array. Anything that is not an array (after decoding) yields an
/// empty list; every item of a well-formed array is kept. Never fails.
pub fn decode_floors(value: &Value) -> Vec<Floor> {
    match value {
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => items.iter().map(Floor::from_value).collect(),
            _ => Vec::new(),
        },
        Value::Array(items) => items.iter().map(Floor::from_value).collect(),
        _ => Vec::new(),
    }
}
