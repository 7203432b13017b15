//! Update command - Re-send every audit that carries an id
//!
//! Each record (minus its id) is PATCHed to the store. The input file is
//! rewritten with the local records; server-side changes are not merged.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use pbaudit_core::files::{read_flat, write_flat};
use pbaudit_store::{BatchResult, StoreClient};
use tracing::info;

use super::connect::{connect, ConnectionArgs};
use super::Context;
use crate::output::BatchOutcome;

/// Arguments for the update subcommand
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Flat audit file with ids; rewritten in place
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Updates the records in `path` and writes them back to the same file
pub async fn run_update(client: &StoreClient, collection: &str, path: &Path) -> Result<BatchResult> {
    let records = read_flat(path)?;
    info!(input = %path.display(), records = records.len(), "Updating audits");

    let result = client.batch_update_audits(collection, &records).await;
    write_flat(path, &result.records())?;
    Ok(result)
}

impl UpdateCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let store = self.connection.apply(&ctx.config.store);
        let input = self
            .input
            .clone()
            .unwrap_or_else(|| ctx.config.paths.flat_with_ids.clone());

        let client = connect(&store, formatter.as_ref()).await;
        let result = run_update(&client, &store.collection, &input).await?;

        formatter.batch(&BatchOutcome {
            action: "Updated",
            saved_to: &input,
            nested_copy: None,
            result: &result,
        });
        Ok(())
    }
}
