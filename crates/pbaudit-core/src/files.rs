//! File-level wrappers around the converter
//!
//! Reads and writes audit documents on disk. The serialization syntax is
//! inferred from the file extension: `.yml` / `.yaml` are YAML, everything
//! else is JSON. The record shape (nested or flat) is independent of the
//! syntax and is chosen by the caller or detected from the content.
//!
//! Writes are whole-file overwrites.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::convert::{to_flat, to_nested};
use crate::domain::{FlatAudit, FormatError, NestedDocument, RecordShape};

/// Serialization syntax of a document on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSyntax {
    Yaml,
    Json,
}

impl DocumentSyntax {
    /// Infers the syntax from the path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yml") | Some("yaml") => DocumentSyntax::Yaml,
            _ => DocumentSyntax::Json,
        }
    }
}

impl Display for DocumentSyntax {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSyntax::Yaml => write!(f, "YAML"),
            DocumentSyntax::Json => write!(f, "JSON"),
        }
    }
}

fn parse_as<T: DeserializeOwned>(content: &str, syntax: DocumentSyntax) -> Result<T, FormatError> {
    Ok(match syntax {
        DocumentSyntax::Yaml => serde_yaml::from_str(content)?,
        DocumentSyntax::Json => serde_json::from_str(content)?,
    })
}

fn render_as<T: Serialize + ?Sized>(
    value: &T,
    syntax: DocumentSyntax,
) -> Result<String, FormatError> {
    Ok(match syntax {
        DocumentSyntax::Yaml => serde_yaml::to_string(value)?,
        DocumentSyntax::Json => serde_json::to_string_pretty(value)?,
    })
}

fn read_as<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let syntax = DocumentSyntax::from_path(path);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed = parse_as(&content, syntax)
        .with_context(|| format!("Failed to parse {} as {}", path.display(), syntax))?;
    Ok(parsed)
}

fn write_as<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let syntax = DocumentSyntax::from_path(path);
    let content = render_as(value, syntax)
        .with_context(|| format!("Failed to serialize {} as {}", path.display(), syntax))?;
    write_text(path, &content)
}

/// Reads any audit document into a generic value (for shape detection)
pub fn read_document(path: &Path) -> Result<Value> {
    read_as(path)
}

/// Reads a nested document
pub fn read_nested(path: &Path) -> Result<NestedDocument> {
    read_as(path)
}

/// Reads a list of flat records
pub fn read_flat(path: &Path) -> Result<Vec<FlatAudit>> {
    read_as(path)
}

/// Reads flat records from a file in either shape.
///
/// A nested document is converted with [`to_flat`] first.
pub fn read_records(path: &Path) -> Result<Vec<FlatAudit>> {
    let document = read_document(path)?;
    match RecordShape::detect(&document)? {
        RecordShape::Flat => Ok(serde_json::from_value(document)
            .with_context(|| format!("Invalid flat records in {}", path.display()))?),
        RecordShape::Nested => {
            let nested: NestedDocument = serde_json::from_value(document)
                .with_context(|| format!("Invalid nested document in {}", path.display()))?;
            Ok(to_flat(&nested)?)
        }
    }
}

/// Writes a nested document
pub fn write_nested(path: &Path, document: &NestedDocument) -> Result<()> {
    write_as(path, document)
}

/// Writes a list of flat records
pub fn write_flat(path: &Path, records: &[FlatAudit]) -> Result<()> {
    write_as(path, records)
}

/// Writes plain text, replacing any existing file
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Outcome of a successful file conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Shape that was written
    pub target: RecordShape,
    pub accounts: usize,
    pub audits: usize,
}

/// Converts `input` into `target` shape and writes it to `output`.
///
/// Converting to [`RecordShape::Flat`] reads a nested document; converting
/// to [`RecordShape::Nested`] reads flat records.
pub fn try_convert_file(
    input: &Path,
    output: &Path,
    target: RecordShape,
) -> Result<ConversionSummary> {
    let (accounts, audits) = match target {
        RecordShape::Flat => {
            let nested = read_nested(input)?;
            let flat = to_flat(&nested)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            write_flat(output, &flat)?;
            (nested.accounts.len(), flat.len())
        }
        RecordShape::Nested => {
            let flat = read_flat(input)?;
            let nested = to_nested(&flat);
            write_nested(output, &nested)?;
            (nested.accounts.len(), flat.len())
        }
    };

    info!(
        input = %input.display(),
        output = %output.display(),
        target = %target,
        accounts,
        audits,
        "Converted audit file"
    );

    Ok(ConversionSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        target,
        accounts,
        audits,
    })
}

/// Like [`try_convert_file`], but logs failures and reports them as `false`
pub fn convert_file(input: &Path, output: &Path, target: RecordShape) -> bool {
    match try_convert_file(input, output, target) {
        Ok(_) => true,
        Err(e) => {
            error!(
                input = %input.display(),
                target = %target,
                "Error converting audit file: {:#}", e
            );
            false
        }
    }
}
