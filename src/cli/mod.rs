use crate::errors::AppResult;
use clap::{Parser, Subcommand};
use tracing_subscriber;

pub mod commands;

/// TLS MITM Interception Analyser
#[derive(Parser)]
#[command(name = "mitm-analyser")]
#[command(about = "TLS MITM Interception Analyser")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check an observed ClientHello against the expected browser fingerprint
    Check(commands::check::CheckCommand),
    /// Load a signature file and write it back in canonical form
    Dump(commands::dump::DumpCommand),
    /// Load the configured stores and print corpus statistics
    Stats(commands::stats::StatsCommand),
}

pub fn run() -> AppResult<()> {
    // Initialise tracing subscriber to capture info!() macros
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check(command) => command.run(),
        Commands::Dump(command) => command.run(),
        Commands::Stats(command) => command.run(),
    }
}
