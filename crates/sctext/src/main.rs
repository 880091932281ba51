//! sctext CLI - shortcode text editing.
//!
//! Provides commands for:
//! - `extract`: Print the editable text of documents as JSON
//! - `apply`: Write a batch of edits back into documents

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ApplyArgs, ExtractArgs};
use output::Output;

/// sctext - edit the text inside page-builder shortcodes.
#[derive(Parser)]
#[command(name = "sctext", version, about)]
struct Cli {
    /// Enable verbose output (info level logging).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the editable text of documents as JSON.
    Extract(ExtractArgs),
    /// Apply edits from a JSON save request.
    Apply(ApplyArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Extract(args) => args.execute(),
        Commands::Apply(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
