//! # concord-cli
//!
//! Command-line interface for Concord disclosure-consistency checks:
//! - `concord check` — compare extracted first-party and third-party
//!   operations against the ontology and write reports
//! - `concord vocab lint` — sanity-check a vocabulary before a run

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Concord — privacy-disclosure consistency checks.
#[derive(Parser)]
#[command(name = "concord", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a consistency check over two extraction outputs.
    Check {
        /// First-party extraction output (JSON array of operations).
        first_party: PathBuf,
        /// Third-party extraction output (JSON array of operations).
        third_party: PathBuf,
        /// Vocabulary: vocab.json or a vocab directory.
        #[arg(long)]
        vocab: PathBuf,
        /// Compatibility rules JSON.
        #[arg(long)]
        rules: PathBuf,
        /// Optional pipeline config YAML (defaults apply when absent).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory to write report.machine.json, report.human.txt,
        /// and summary.json into.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Force strict context compatibility scoring.
        #[arg(long)]
        strict_context: bool,
    },
    /// Inspect and lint vocabularies.
    Vocab {
        #[command(subcommand)]
        command: commands::vocab::VocabCommands,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so reports can be piped from stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Check {
            first_party,
            third_party,
            vocab,
            rules,
            config,
            output,
            strict_context,
        } => commands::check::execute(
            first_party,
            third_party,
            vocab,
            rules,
            config.as_deref(),
            output.as_deref(),
            *strict_context,
        ),
        Commands::Vocab { command } => commands::vocab::execute(command),
    }
}
