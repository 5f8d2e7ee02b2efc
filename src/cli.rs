// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand, ValueEnum};
use safeset::output::OutputMode;

#[derive(Parser)]
#[command(name = "safeset")]
#[command(about = "Reversible bulk field updates for document-based business backends")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "normal")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly progress output
    Normal,
    /// Minimal output for CI
    Quiet,
    /// JSON lines for scripting
    Json,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Normal => OutputMode::Normal,
            OutputFormat::Quiet => OutputMode::Quiet,
            OutputFormat::Json => OutputMode::Json,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new safeset.yml configuration file
    Init {
        /// Target doctype for the template
        #[arg(long)]
        doctype: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Execute the configured update run
    Run {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Break a held run lock
        #[arg(long)]
        force: bool,
    },

    /// Roll back a recorded run, restoring backed-up values
    Rollback {
        /// Run document name
        run: String,

        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Show run status (lists runs when no name is given)
    Status {
        /// Run document name
        run: Option<String>,

        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },
}
