//! Shell completions
//!
//! `pbaudit completions bash > ~/.local/share/bash-completion/completions/pbaudit`
//! or, with `-o`, straight into a file.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::CommandFactory;
use clap_complete::Shell;

/// Arguments for the completions subcommand
#[derive(Debug, clap::Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
    /// Write the script to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Writes the completion script for `shell` to `out`
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = crate::Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}

impl CompletionsCommand {
    pub async fn execute(&self) -> Result<()> {
        match &self.output {
            Some(path) => {
                let mut file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_completions(self.shell, &mut file);
                file.flush()?;
            }
            None => write_completions(self.shell, &mut io::stdout()),
        }
        Ok(())
    }
}
