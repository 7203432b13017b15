//! Import command - Create store records for audits that have no id yet
//!
//! Reads flat records (a nested document is converted first), imports them
//! one by one and writes the records, now carrying ids, to the output file.
//! Records that already have an id are left alone, so re-running on the
//! output file creates nothing.
//!
//! With `--nested-output` the same records are also written in the nested
//! shape (default `paths.nested_with_ids`), ready for hand-editing scores
//! before an `update`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use pbaudit_core::convert::to_nested;
use pbaudit_core::files::{read_records, write_flat, write_nested};
use pbaudit_store::{BatchResult, StoreClient};
use tracing::info;

use super::connect::{connect, ConnectionArgs};
use super::Context;
use crate::output::BatchOutcome;

/// Arguments for the import subcommand
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Flat (or nested) audit file to import
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Where to write the records with ids
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Also write the records with ids in the nested shape
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub nested_output: Option<Option<PathBuf>>,
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Imports the records in `input` and writes the outcome to `output`
pub async fn run_import(
    client: &StoreClient,
    collection: &str,
    input: &Path,
    output: &Path,
) -> Result<BatchResult> {
    let records = read_records(input)?;
    info!(input = %input.display(), records = records.len(), "Importing audits");

    let result = client.batch_import_audits(collection, &records).await;
    write_flat(output, &result.records())?;
    Ok(result)
}

/// Writes the records of a finished batch to `path` in the nested shape
pub fn write_nested_copy(path: &Path, result: &BatchResult) -> Result<()> {
    write_nested(path, &to_nested(&result.records()))?;
    info!(output = %path.display(), "Wrote nested copy with ids");
    Ok(())
}

impl ImportCommand {
    /// Resolves `--nested-output`: absent, bare flag (configured path) or explicit path
    fn nested_path(&self, configured: &Path) -> Option<PathBuf> {
        self.nested_output
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(|| configured.to_path_buf()))
    }

    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let store = self.connection.apply(&ctx.config.store);
        let input = self.input.clone().unwrap_or_else(|| ctx.config.paths.flat.clone());
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| ctx.config.paths.flat_with_ids.clone());
        let nested = self.nested_path(&ctx.config.paths.nested_with_ids);

        let client = connect(&store, formatter.as_ref()).await;
        let result = run_import(&client, &store.collection, &input, &output).await?;
        if let Some(path) = &nested {
            write_nested_copy(path, &result)?;
        }

        formatter.batch(&BatchOutcome {
            action: "Imported",
            saved_to: &output,
            nested_copy: nested.as_deref(),
            result: &result,
        });
        Ok(())
    }
}
