//! pbaudit CLI - Command-line interface for audit record management
//!
//! Provides commands for:
//! - Converting audit files between the nested and flat shapes
//! - Importing audits into a PocketBase collection
//! - Re-sending updated audits to PocketBase
//! - Generating text reports
//! - Inspecting configuration
//!
//! Without a subcommand (or with `--interactive`) a menu-driven wizard runs.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pbaudit_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    completions::CompletionsCommand, config::ConfigCommand, convert::ConvertCommand,
    import::ImportCommand, report::ReportCommand, update::UpdateCommand, wizard::Wizard, Context,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "pbaudit", version, about = "Manage audit records in PocketBase")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Run the interactive wizard
    #[arg(short, long)]
    interactive: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert an audit file between the nested and flat shapes
    Convert(ConvertCommand),
    /// Import audits without an id into PocketBase
    Import(ImportCommand),
    /// Re-send audits that already have an id
    Update(UpdateCommand),
    /// Generate a text report from an audit file
    Report(ReportCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Tracing filter: `-q` and `-v` win over the configured level
fn log_filter(verbose: u8, quiet: bool, configured: &str) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::resolve(&config_path);

    // Setup tracing
    let filter = log_filter(cli.verbose, cli.quiet, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = Context {
        config,
        config_path,
        format,
        quiet: cli.quiet,
    };

    match cli.command {
        Some(command) if !cli.interactive => match command {
            Commands::Convert(cmd) => cmd.execute(&ctx).await,
            Commands::Import(cmd) => cmd.execute(&ctx).await,
            Commands::Update(cmd) => cmd.execute(&ctx).await,
            Commands::Report(cmd) => cmd.execute(&ctx).await,
            Commands::Config(cmd) => cmd.execute(&ctx).await,
            Commands::Completions(cmd) => cmd.execute().await,
        },
        _ => {
            let stdin = io::stdin();
            Wizard::new(stdin.lock(), io::stdout(), ctx.config).run().await
        }
    }
}
