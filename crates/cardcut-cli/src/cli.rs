//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Cardcut - Cut evidence cards out of briefs and research files.
#[derive(Debug, Parser)]
#[command(name = "cardcut")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./cardcut.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Report format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (card counts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract cards from a document or a directory of documents
    Extract(ExtractArgs),

    /// Print the rendered markup of one document
    Inspect(InspectArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Input file or directory (.docx, .pdf, .html, .htm)
    pub input: PathBuf,

    /// Output directory for card files and metadata.json
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also POST each card to the cards API
    #[arg(long)]
    pub submit: bool,

    /// Base URL of the cards API
    #[arg(long, env = "CARDCUT_API_BASE")]
    pub api_base: Option<String>,

    /// Build document trees and report their size without calling the oracle
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the inspect command.
#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// Document to render
    pub file: PathBuf,

    /// Print the plain-text projection sent to the oracle instead of markup
    #[arg(long)]
    pub text: bool,
}

impl From<CliFormat> for crate::config::ReportFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::ReportFormat::Table,
            CliFormat::Json => crate::config::ReportFormat::Json,
            CliFormat::Quiet => crate::config::ReportFormat::Quiet,
        }
    }
}
