// ABOUTME: Entry point for the safeset CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use safeset::config::{self, JobConfig};
use safeset::error::Result;
use safeset::output::Output;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mode = cli.output.into();

    match cli.command {
        Commands::Init { doctype, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, doctype.as_deref(), force)
        }
        Commands::Run { destination, force } => {
            let config = load_config(destination.as_deref())?;
            commands::run(config, Output::new(mode), force).await
        }
        Commands::Rollback { run, destination } => {
            let config = load_config(destination.as_deref())?;
            commands::rollback(config, run, Output::new(mode)).await
        }
        Commands::Status { run, destination } => {
            let config = load_config(destination.as_deref())?;
            commands::status(config, run).await
        }
    }
}

/// Discover the job config in the working directory, with destination
/// overrides applied when one was requested.
fn load_config(destination: Option<&str>) -> Result<JobConfig> {
    let cwd = env::current_dir()?;
    let config = JobConfig::discover(&cwd)?;

    match destination {
        Some(dest) => config.for_destination(dest),
        None => Ok(config),
    }
}
