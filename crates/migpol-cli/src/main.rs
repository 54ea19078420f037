//! migpol-cli entry point.
//!
//! Thin by design: parses arguments, initializes tracing, and dispatches to
//! the command handlers in `commands/`. All real logic lives in the
//! `migpol-*` library crates so they stay usable without this binary.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "migpol")]
#[command(about = "autopkgtest migration policy engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and print a layered configuration.
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },

    /// Pull results into the on-disk stores without evaluating candidates.
    Ingest {
        #[command(subcommand)]
        cmd: IngestCmd,
    },

    /// Inspect the on-disk Result Store / Pending Store.
    Inspect {
        #[command(subcommand)]
        cmd: InspectCmd,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Load layered config files and print the parsed, secret-redacted result.
    Check {
        /// Paths in merge order (base -> series -> local overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum IngestCmd {
    /// Run the configured ingest backend once and persist the stores.
    Run {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[arg(long = "state-dir")]
        state_dir: String,
    },
}

#[derive(Subcommand)]
enum InspectCmd {
    /// Print every stored result leaf.
    Results {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[arg(long = "state-dir")]
        state_dir: String,
    },

    /// Print every outstanding pending request.
    Pending {
        #[arg(long = "state-dir")]
        state_dir: String,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Config { cmd } => match cmd {
            ConfigCmd::Check { paths } => commands::config::check(&paths),
        },
        Commands::Ingest { cmd } => match cmd {
            IngestCmd::Run { config_paths, state_dir } => {
                commands::ingest::run(&config_paths, &state_dir)
            }
        },
        Commands::Inspect { cmd } => match cmd {
            InspectCmd::Results { config_paths, state_dir } => {
                commands::inspect::results(&config_paths, &state_dir)
            }
            InspectCmd::Pending { state_dir } => commands::inspect::pending(&state_dir),
        },
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
