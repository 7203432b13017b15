//! Subcommands of the `pbaudit` binary

use std::path::PathBuf;

use pbaudit_core::config::Config;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

pub mod completions;
pub mod config;
pub mod connect;
pub mod convert;
pub mod import;
pub mod report;
pub mod update;
pub mod wizard;

/// State shared by every command, built once in `main`
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved configuration (file, environment)
    pub config: Config,
    /// Where the configuration was (or would be) loaded from
    pub config_path: PathBuf,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }
}
