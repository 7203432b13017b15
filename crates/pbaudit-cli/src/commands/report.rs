//! Report command - Write a text report for an audit file
//!
//! With `--json` the computed statistics are printed to stdout as well.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use pbaudit_core::domain::RecordShape;
use pbaudit_report::try_generate_report_from_file;

use super::Context;

/// Arguments for the report subcommand
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Audit file in either shape (YAML or JSON)
    #[arg(short, long)]
    pub input: PathBuf,
    /// Report file (default: paths.report)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Force the input shape instead of detecting it
    #[arg(long)]
    pub shape: Option<RecordShape>,
}

impl ReportCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| ctx.config.paths.report.clone());

        let report = try_generate_report_from_file(&self.input, &output, self.shape)?;

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::to_value(&report)?);
        } else {
            formatter.success(&format!("Report generated at {}", output.display()));
            formatter.info(&format!(
                "{} audits across {} accounts, {} missing scores",
                report.total_audits, report.total_accounts, report.missing_scores
            ));
        }
        Ok(())
    }
}
