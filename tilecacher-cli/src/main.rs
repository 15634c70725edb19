//! TileCacher command-line interface.
//!
//! A thin caller around the `tilecacher` library: it loads the layers
//! configuration, opens the disk tile store, starts a cache job for the
//! requested region, and renders the job's progress events. All tile logic
//! lives in the library.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "tilecacher", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Cache all tiles covering a region at the given zoom levels
    Save(commands::save::SaveArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("failed to create Tokio runtime: {}", e)))?;

    match cli.command {
        Commands::Save(args) => runtime.block_on(commands::save::run(args)),
    }
}
