mod commands;
mod mailer;
mod render;
mod utils;

use std::path::{Path, PathBuf};

use anyhow::Result;
use calsweep_core::config::SweepConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::SweepArgs;

#[derive(Parser)]
#[command(name = "calsweep")]
#[command(about = "Delete old events from your calendars, safely and in bulk")]
struct Cli {
    /// Config file to use instead of ~/.config/calsweep/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep calendars using the configured mode
    Run {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Actually delete events, regardless of the configured mode
        #[arg(long)]
        live: bool,

        /// Don't ask for confirmation before a live run
        #[arg(short, long)]
        yes: bool,
    },
    /// Show what a sweep would delete without deleting anything
    Analyze {
        #[command(flatten)]
        sweep: SweepArgs,
    },
    /// List calendars and whether the selection targets them
    Calendars,
    /// Show config paths and check the configuration
    Config {
        /// Write a default config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => SweepConfig::config_path()?,
    };

    match cli.command {
        Commands::Run { sweep, live, yes } => {
            let config = load_config(&config_path)?;
            commands::run::run(&config, &sweep, live, yes, cli.verbose).await
        }
        Commands::Analyze { sweep } => {
            let config = load_config(&config_path)?;
            commands::analyze::run(&config, &sweep, cli.verbose).await
        }
        Commands::Calendars => {
            let config = load_config(&config_path)?;
            commands::calendars::run(&config).await
        }
        Commands::Config { init } => commands::config::run(&config_path, init),
    }
}

fn load_config(path: &Path) -> Result<SweepConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file, using defaults and environment");
    }
    Ok(SweepConfig::load(path)?)
}

/// Logs go to stderr so rendered output on stdout stays clean.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
