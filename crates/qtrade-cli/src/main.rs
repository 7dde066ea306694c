mod bars;
mod commands;
mod factory;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qtrade")]
#[command(about = "Autonomous equities trading engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the layered config hash + print canonical JSON.
    ConfigHash {
        /// Paths in merge order (base -> env -> risk -> ...).
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Run lifecycle commands.
    Run {
        #[command(subcommand)]
        cmd: RunCmd,
    },

    /// Inspect a checkpoint directory without starting a session.
    Checkpoint {
        #[command(subcommand)]
        cmd: CheckpointCmd,
    },
}

#[derive(Subcommand)]
enum RunCmd {
    /// Start a deterministic paper-trading session replaying bars from a CSV file.
    Paper {
        /// Layered config paths in merge order.
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// CSV bar file: symbol,timestamp(rfc3339),open,high,low,close,volume.
        #[arg(long)]
        bars: PathBuf,

        /// Directory for portfolio/risk/capital/qtable checkpoints.
        #[arg(long)]
        checkpoint_dir: PathBuf,
    },

    /// Wire an external broker adapter for live trading.
    Live {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CheckpointCmd {
    /// Print the snapshots currently held in a checkpoint directory.
    Inspect {
        #[arg(long)]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => commands::config_hash::run(&paths),
        Commands::Run { cmd } => match cmd {
            RunCmd::Paper { config_paths, bars, checkpoint_dir } => {
                commands::run::paper(config_paths, bars, checkpoint_dir)
            }
            RunCmd::Live { config_paths } => commands::run::live(config_paths),
        },
        Commands::Checkpoint { cmd } => match cmd {
            CheckpointCmd::Inspect { dir } => commands::checkpoint::inspect(&dir),
        },
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}
