//! Config command - Inspect the effective pbaudit configuration
//!
//! Provides the `pbaudit config` CLI command which:
//! 1. Shows the resolved configuration (file + environment) as YAML or JSON
//! 2. Validates it and reports every problem found

use anyhow::{Context as _, Result};
use clap::Subcommand;
use pbaudit_core::config::Config;
use tracing::info;

use super::Context;

/// Placeholder shown instead of a configured password
const MASKED: &str = "********";

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Validate configuration
    Validate,
}

/// Copy of `config` safe to print
fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    if !config.store.password.is_empty() {
        config.store.password = MASKED.to_string();
    }
    config
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx).await,
            ConfigCommand::Validate => self.execute_validate(ctx).await,
        }
    }

    async fn execute_show(&self, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let config = masked(&ctx.config);

        info!(config_path = %ctx.config_path.display(), "Showing configuration");

        if ctx.format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
            if !ctx.config_path.exists() {
                formatter.info("(file not found, showing defaults)");
            }
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    async fn execute_validate(&self, ctx: &Context) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = &ctx.config_path;

        // A file that exists but does not parse is reported as such,
        // not silently replaced by defaults
        if config_path.exists() {
            if let Err(e) = Config::load(config_path) {
                if ctx.format.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [format!("Failed to parse configuration: {}", e)],
                    }));
                } else {
                    formatter.error(&format!("Failed to parse configuration: {}", e));
                    formatter.info(&format!("File: {}", config_path.display()));
                }
                return Ok(());
            }
        }

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = ctx.config.validate();

        if ctx.format.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
            if !ctx.config.store.has_credentials() {
                formatter.warn("No store credentials set; import and update will only simulate");
            }
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }
}
