//! Convert command - Rewrite an audit file in the other record shape
//!
//! `pbaudit convert --to flat` reads a nested document (default
//! `paths.nested`) and writes flat records (default `paths.flat`);
//! `--to nested` goes the other way.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use pbaudit_core::config::PathsConfig;
use pbaudit_core::domain::RecordShape;
use pbaudit_core::files::try_convert_file;

use super::Context;

/// Arguments for the convert subcommand
#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// Target shape: flat (json) or nested (yaml)
    #[arg(long)]
    pub to: RecordShape,
    /// Input file
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Default input and output paths for a conversion to `target`
pub fn default_paths(paths: &PathsConfig, target: RecordShape) -> (PathBuf, PathBuf) {
    match target {
        RecordShape::Flat => (paths.nested.clone(), paths.flat.clone()),
        RecordShape::Nested => (paths.flat.clone(), paths.nested.clone()),
    }
}

impl ConvertCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let (default_input, default_output) = default_paths(&ctx.config.paths, self.to);
        let input = self.input.clone().unwrap_or(default_input);
        let output = self.output.clone().unwrap_or(default_output);

        let summary = try_convert_file(&input, &output, self.to)?;

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::json!({
                "success": true,
                "input": summary.input.display().to_string(),
                "output": summary.output.display().to_string(),
                "target": summary.target,
                "accounts": summary.accounts,
                "audits": summary.audits,
            }));
        } else {
            formatter.success(&format!(
                "Converted {} to {}",
                input.display(),
                output.display()
            ));
            formatter.info(&format!(
                "{} audits across {} accounts",
                summary.audits, summary.accounts
            ));
        }
        Ok(())
    }
}
