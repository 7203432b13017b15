//! Terminal output
//!
//! Commands describe what happened; the formatter picked by `--json` decides
//! how it is shown. Batch outcomes (import/update) are rendered here so the
//! subcommands and the wizard print identical summaries.

use std::path::Path;

use pbaudit_store::{BatchResult, BatchStatus};
use serde_json::{json, Value};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// A finished import or update run
pub struct BatchOutcome<'a> {
    /// Past-tense verb for the headline ("Imported", "Updated")
    pub action: &'a str,
    /// File the records were written back to
    pub saved_to: &'a Path,
    /// Extra nested-shape copy, when one was written
    pub nested_copy: Option<&'a Path>,
    pub result: &'a BatchResult,
}

impl BatchOutcome<'_> {
    pub fn headline(&self) -> String {
        format!(
            "{} {} audits; records saved to {}",
            self.action,
            self.result.len(),
            self.saved_to.display()
        )
    }

    /// Per-status totals on one line
    pub fn counts_line(&self) -> String {
        let counts = self.result.counts();
        format!(
            "created {}, updated {}, skipped {}, simulated {}, failed {}",
            counts.created, counts.updated, counts.skipped, counts.simulated, counts.failed
        )
    }

    /// One line per failed record: account, date and the store's reason
    pub fn failure_lines(&self) -> Vec<String> {
        self.result
            .failures()
            .filter_map(|item| match &item.status {
                BatchStatus::Failed { reason } => Some(format!(
                    "{} on {}: {}",
                    item.record.account, item.record.date, reason
                )),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> Value {
        let failures: Vec<_> = self.result.failures().collect();
        let mut body = json!({
            "success": self.result.counts().failed == 0,
            "output": self.saved_to.display().to_string(),
            "counts": self.result.counts(),
            "failures": failures,
        });
        if let Some(path) = self.nested_copy {
            body["nested_output"] = json!(path.display().to_string());
        }
        body
    }
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &Value);
    /// Summarizes an import or update run
    fn batch(&self, outcome: &BatchOutcome<'_>);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter {
    /// Suppresses informational lines
    quiet: bool,
}

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
    fn print_json(&self, _value: &Value) {}

    fn batch(&self, outcome: &BatchOutcome<'_>) {
        self.success(&outcome.headline());
        self.info(&outcome.counts_line());
        if let Some(path) = outcome.nested_copy {
            self.info(&format!("nested copy saved to {}", path.display()));
        }
        for line in outcome.failure_lines() {
            self.warn(&line);
        }
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!("{}", json!({"success": true, "message": message}));
    }
    fn error(&self, message: &str) {
        eprintln!("{}", json!({"success": false, "error": message}));
    }
    fn warn(&self, message: &str) {
        eprintln!("{}", json!({"level": "warning", "message": message}));
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &Value) {
        println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
    }

    fn batch(&self, outcome: &BatchOutcome<'_>) {
        self.print_json(&outcome.to_json());
    }
}

pub fn get_formatter(format: OutputFormat, quiet: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter { quiet }),
    }
}
