mod cli;

use anyhow::Result;
use cadence::config::CadenceConfig;
use cadence::server;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cadence", version, about = "Habit streak and check-in server")]
struct Cli {
    /// Config file (default: ~/.cadence/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Reset streaks that lapsed before the given day
    Rollover {
        /// Day to roll over to, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show habit statistics
    Stats {
        /// Limit to one owner
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show one habit with its streak state and recent check-ins
    Inspect {
        /// Habit ID
        id: String,
    },
    /// Export all habits and check-ins as JSON to stdout
    Export,
    /// Check database health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = match &cli.config {
        Some(path) => CadenceConfig::load_from(path)?,
        None => CadenceConfig::load()?,
    };

    // Log to stderr so stdout stays clean for export output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve(config).await?,
        Command::Rollover { date } => cli::rollover::rollover(&config, date)?,
        Command::Stats { owner } => cli::stats::stats(&config, owner.as_deref())?,
        Command::Inspect { id } => cli::inspect::inspect(&config, &id)?,
        Command::Export => cli::export::export(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
