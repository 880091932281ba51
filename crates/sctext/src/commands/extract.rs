//! `sctext extract` command implementation.

use std::path::PathBuf;

use clap::Args;
use sctext_config::CliSettings;

use super::Session;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the extract command.
#[derive(Args)]
pub(crate) struct ExtractArgs {
    /// Document ids (paths relative to the store root).
    #[arg(required = true)]
    ids: Vec<String>,

    /// Path to configuration file (default: auto-discover sctext.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document store root (overrides config).
    #[arg(long, env = "SCTEXT_ROOT")]
    root: Option<PathBuf>,

    /// Use the regex fallback instead of the shortcode grammar.
    #[arg(long)]
    fallback: bool,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,
}

impl ExtractArgs {
    /// Execute the extract command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or a document can't be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = CliSettings {
            store_root: self.root,
            grammar_enabled: self.fallback.then_some(false),
            ..Default::default()
        };
        let session = Session::load(self.config.as_deref(), &settings)?;

        let responses = session.editor().fetch_many(self.ids.as_slice())?;
        for response in &responses {
            for warning in &response.debug.warnings {
                output.warning(&format!("{}: {warning}", response.document));
            }
        }

        let json = if self.compact {
            serde_json::to_string(&responses)?
        } else {
            serde_json::to_string_pretty(&responses)?
        };
        output.result(&json)?;
        Ok(())
    }
}
