//! Interactive menu for the common workflows
//!
//! Runs over any `BufRead`/`Write` pair so it can be driven from tests.
//! Every prompt offers a default taken from the configuration; an empty
//! answer accepts it. End of input leaves the menu.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use pbaudit_core::config::{Config, StoreConfig};
use pbaudit_core::domain::RecordShape;
use pbaudit_core::files::try_convert_file;
use pbaudit_report::try_generate_report_from_file;
use pbaudit_store::StoreClient;

use super::connect::{open, Connection};
use super::convert::default_paths;
use super::import::{run_import, write_nested_copy};
use super::update::run_update;
use crate::output::BatchOutcome;

const RULE_WIDTH: usize = 50;

/// Whether the menu loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive session state
pub struct Wizard<R, W> {
    input: R,
    output: W,
    config: Config,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(input: R, output: W, config: Config) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    /// Shows the menu until the user exits or input ends
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt("\nEnter your choice (1-6): ")? else {
                break;
            };

            let outcome = match choice.trim() {
                "1" => self.convert(RecordShape::Flat),
                "2" => self.convert(RecordShape::Nested),
                "3" => self.import().await,
                "4" => self.update().await,
                "5" => self.report(),
                "6" => {
                    writeln!(self.output, "\nExiting PocketBase Audit Wizard. Goodbye!")?;
                    break;
                }
                _ => {
                    writeln!(self.output, "\nInvalid choice. Please try again.")?;
                    Ok(Flow::Continue)
                }
            };

            let flow = match outcome {
                Ok(flow) => flow,
                Err(e) => {
                    writeln!(self.output, "\nError: {:#}", e)?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit || self.prompt("\nPress Enter to continue...")?.is_none() {
                break;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    fn print_menu(&mut self) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "Welcome to the PocketBase Audit Wizard!")?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "\nPlease select an option:")?;
        writeln!(self.output, "1. Convert nested (YAML) to flat (JSON)")?;
        writeln!(self.output, "2. Convert flat (JSON) to nested (YAML)")?;
        writeln!(self.output, "3. Import audits into PocketBase")?;
        writeln!(self.output, "4. Update existing audits (e.g. add scores)")?;
        writeln!(self.output, "5. Generate report from audit file")?;
        writeln!(self.output, "6. Exit")?;
        Ok(())
    }

    // ========================================================================
    // Prompting
    // ========================================================================

    /// Writes `text` and reads one line; `None` at end of input
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Prompts with a default shown in brackets; empty answers take the default
    fn ask(&mut self, label: &str, default: &str) -> Result<Option<String>> {
        let answer = self.prompt(&format!("{} [{}]: ", label, default))?;
        Ok(answer.map(|a| {
            let a = a.trim();
            if a.is_empty() {
                default.to_string()
            } else {
                a.to_string()
            }
        }))
    }

    fn ask_path(&mut self, label: &str, default: &Path) -> Result<Option<PathBuf>> {
        Ok(self
            .ask(label, &default.display().to_string())?
            .map(PathBuf::from))
    }

    /// Asks for connection details and connects; `None` at end of input
    async fn connect(&mut self) -> Result<Option<(StoreClient, String)>> {
        writeln!(self.output, "\n== PocketBase Connection ==")?;
        let defaults = self.config.store.clone();

        let Some(url) = self.ask("Enter PocketBase URL", &defaults.url)? else {
            return Ok(None);
        };
        let Some(email) = self.ask("Enter PocketBase email", &defaults.email)? else {
            return Ok(None);
        };
        let Some(password) = self.prompt("Enter PocketBase password: ")? else {
            return Ok(None);
        };
        let Some(collection) = self.ask("Enter collection name", &defaults.collection)? else {
            return Ok(None);
        };

        let store = StoreConfig {
            url,
            email,
            password: if password.is_empty() {
                defaults.password
            } else {
                password
            },
            collection,
        };

        writeln!(self.output, "\nConnecting to PocketBase...")?;
        let (client, connection) = open(&store).await;
        match connection {
            Connection::Authenticated => writeln!(self.output, "Connection successful!")?,
            Connection::Failed => writeln!(
                self.output,
                "Connection failed. Will proceed in simulation mode."
            )?,
            Connection::NoCredentials => writeln!(
                self.output,
                "No credentials given. Will proceed in simulation mode."
            )?,
        }
        Ok(Some((client, store.collection)))
    }

    fn print_outcome(&mut self, outcome: &BatchOutcome<'_>) -> Result<()> {
        writeln!(self.output, "\n{}", outcome.headline())?;
        writeln!(self.output, "{}", outcome.counts_line())?;
        if let Some(path) = outcome.nested_copy {
            writeln!(self.output, "Nested copy saved to {}", path.display())?;
        }
        for line in outcome.failure_lines() {
            writeln!(self.output, "Failed: {}", line)?;
        }
        Ok(())
    }

    // ========================================================================
    // Actions
    // ========================================================================

    fn convert(&mut self, target: RecordShape) -> Result<Flow> {
        let (default_input, default_output) = default_paths(&self.config.paths, target);
        let title = match target {
            RecordShape::Flat => "Convert nested to flat",
            RecordShape::Nested => "Convert flat to nested",
        };
        writeln!(self.output, "\n== {} ==", title)?;

        let Some(input) = self.ask_path("Enter input file path", &default_input)? else {
            return Ok(Flow::Quit);
        };
        let Some(output) = self.ask_path("Enter output file path", &default_output)? else {
            return Ok(Flow::Quit);
        };

        let summary = try_convert_file(&input, &output, target)?;
        writeln!(
            self.output,
            "\nSuccessfully converted {} to {} ({} audits)",
            input.display(),
            output.display(),
            summary.audits
        )?;
        Ok(Flow::Continue)
    }

    async fn import(&mut self) -> Result<Flow> {
        writeln!(self.output, "\n== Import Audits to PocketBase ==")?;
        let paths = self.config.paths.clone();
        let Some(input) = self.ask_path("Enter input file path", &paths.flat)? else {
            return Ok(Flow::Quit);
        };
        let Some(output) = self.ask_path("Enter output file path with IDs", &paths.flat_with_ids)?
        else {
            return Ok(Flow::Quit);
        };
        let Some(nested) =
            self.ask_path("Enter nested (YAML) output path with IDs", &paths.nested_with_ids)?
        else {
            return Ok(Flow::Quit);
        };
        let Some((client, collection)) = self.connect().await? else {
            return Ok(Flow::Quit);
        };

        let result = run_import(&client, &collection, &input, &output).await?;
        write_nested_copy(&nested, &result)?;
        self.print_outcome(&BatchOutcome {
            action: "Imported",
            saved_to: &output,
            nested_copy: Some(&nested),
            result: &result,
        })?;
        Ok(Flow::Continue)
    }

    async fn update(&mut self) -> Result<Flow> {
        writeln!(self.output, "\n== Update Existing Audits ==")?;
        let default_input = self.config.paths.flat_with_ids.clone();
        let Some(input) = self.ask_path("Enter file path with IDs", &default_input)? else {
            return Ok(Flow::Quit);
        };
        let Some((client, collection)) = self.connect().await? else {
            return Ok(Flow::Quit);
        };

        let result = run_update(&client, &collection, &input).await?;
        self.print_outcome(&BatchOutcome {
            action: "Updated",
            saved_to: &input,
            nested_copy: None,
            result: &result,
        })?;
        Ok(Flow::Continue)
    }

    fn report(&mut self) -> Result<Flow> {
        writeln!(self.output, "\n== Generate Audit Report ==")?;
        let paths = self.config.paths.clone();
        let Some(input) = self.ask_path("Enter input file path (YAML or JSON)", &paths.nested)?
        else {
            return Ok(Flow::Quit);
        };
        let Some(output) = self.ask_path("Enter report output path", &paths.report)? else {
            return Ok(Flow::Quit);
        };

        try_generate_report_from_file(&input, &output, None)?;
        writeln!(
            self.output,
            "\nSuccessfully generated report at {}",
            output.display()
        )?;
        Ok(Flow::Continue)
    }
}
