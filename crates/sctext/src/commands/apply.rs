//! `sctext apply` command implementation.

use std::path::PathBuf;

use clap::Args;
use sctext_config::CliSettings;
use sctext_editor::{DocumentOutcome, OutcomeStatus, SaveRequest};

use super::Session;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the apply command.
#[derive(Args)]
pub(crate) struct ApplyArgs {
    /// JSON file with a save request (`{"edits": [...], "revisions": {...}}`).
    edits_file: PathBuf,

    /// Path to configuration file (default: auto-discover sctext.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document store root (overrides config).
    #[arg(long, env = "SCTEXT_ROOT")]
    root: Option<PathBuf>,

    /// Use the regex fallback instead of the shortcode grammar.
    #[arg(long)]
    fallback: bool,

    /// Show what would change without writing.
    #[arg(long)]
    dry_run: bool,
}

impl ApplyArgs {
    /// Execute the apply command.
    ///
    /// # Errors
    ///
    /// Returns an error if the request can't be read or any document failed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = CliSettings {
            store_root: self.root,
            grammar_enabled: self.fallback.then_some(false),
            ..Default::default()
        };
        let session = Session::load(self.config.as_deref(), &settings)?;

        let raw = std::fs::read_to_string(&self.edits_file)?;
        let request: SaveRequest = serde_json::from_str(&raw)?;
        output.info(&format!(
            "Applying {} edit(s) from {}...",
            request.edits.len(),
            self.edits_file.display()
        ));

        let editor = session.editor();
        let outcomes = if self.dry_run {
            output.highlight("\n[DRY RUN] No changes will be written.");
            editor.preview(&request)
        } else {
            editor.save(&request)
        };

        for outcome in &outcomes {
            print_outcome(&output, outcome);
        }

        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        if failed > 0 {
            return Err(CliError::Failed(failed));
        }
        Ok(())
    }
}

fn print_outcome(output: &Output, outcome: &DocumentOutcome) {
    let summary = format!(
        "{}: {} applied, {} skipped",
        outcome.document,
        outcome.applied.len(),
        outcome.skipped.len()
    );
    match outcome.status {
        OutcomeStatus::Saved => output.success(&format!("\nSaved {summary}")),
        OutcomeStatus::Previewed => output.highlight(&format!("\nWould save {summary}")),
        OutcomeStatus::Unchanged => output.info(&format!("\nUnchanged {summary}")),
        OutcomeStatus::Failed => {
            output.error(&format!(
                "\nFailed {}: {}",
                outcome.document,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
            return;
        }
    }

    for skipped in &outcome.skipped {
        output.warning(&format!(
            "  - block {} {}: {}",
            skipped.address.block_index, skipped.address.key, skipped.reason
        ));
    }
    if let Some(revision) = &outcome.revision {
        output.info(&format!("  Revision: {revision}"));
    }
}
