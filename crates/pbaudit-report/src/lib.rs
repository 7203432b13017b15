//! pbaudit Report - Statistics and text reports over audit records
//!
//! Computes an [`AuditReport`] from either record shape:
//! - totals and missing-score share
//! - per-year histogram
//! - top visited floors
//! - per-account summaries (date range, average gap between audits)
//!
//! The report renders to a fixed-width text block or serializes as JSON.

pub mod render;
pub mod stats;

use std::path::Path;

use anyhow::{Context, Result};
use pbaudit_core::domain::{FormatError, RecordShape};
use pbaudit_core::files::{read_document, write_text};
use serde_json::Value;
use tracing::{error, info};

pub use stats::{AccountSummary, AuditReport, FloorCount, YearCount};

/// Renders the text report for a parsed document of either shape
pub fn generate_report(document: &Value, shape: Option<RecordShape>) -> Result<String, FormatError> {
    Ok(AuditReport::from_document(document, shape)?.render())
}

/// Reads `input`, computes its report and writes the rendered text to `output`.
///
/// The shape is detected from the document unless `shape` is given.
pub fn try_generate_report_from_file(
    input: &Path,
    output: &Path,
    shape: Option<RecordShape>,
) -> Result<AuditReport> {
    let document = read_document(input)?;
    let report = AuditReport::from_document(&document, shape)
        .with_context(|| format!("Failed to compute report for {}", input.display()))?;
    write_text(output, &report.render())?;

    info!(
        input = %input.display(),
        output = %output.display(),
        audits = report.total_audits,
        "Report written"
    );
    Ok(report)
}

/// Like [`try_generate_report_from_file`], returning `false` (and logging) on failure
pub fn generate_report_from_file(input: &Path, output: &Path) -> bool {
    match try_generate_report_from_file(input, output, None) {
        Ok(_) => true,
        Err(e) => {
            error!(input = %input.display(), "Error generating report: {:#}", e);
            false
        }
    }
}
