mod cli;
mod config;
mod error;
mod fingerprint;
mod memory;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "engram", version, about = "Reflection journal memory index")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fingerprint and store a reflection
    Store {
        /// The reflection text
        text: String,
        /// Optional mood/state tag (0-255)
        #[arg(long)]
        state: Option<u8>,
        /// Content identifier; a UUID v7 is minted when omitted
        #[arg(long)]
        id: Option<String>,
    },
    /// Move an entry to a new content identifier
    Rekey { old_id: String, new_id: String },
    /// Find entries similar to a free-text query
    Search {
        query: String,
        /// Number of results to return
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Find entries near a state value
    State {
        /// State value (0-255)
        value: u8,
        /// Accepted distance from the value
        #[arg(long)]
        tolerance: Option<u16>,
    },
    /// Find entries inside an inclusive state range
    StateRange { min: u8, max: u8 },
    /// Show the state distribution
    Distribution,
    /// Show cache statistics
    Stats,
    /// Export the cache as a JSON snapshot
    Export { path: PathBuf },
    /// Merge a JSON snapshot into the cache
    Import { path: PathBuf },
    /// Check the cache artifact against the active configuration
    Doctor,
    /// Delete the cache artifact
    Reset,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.engram/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::EngramConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for command output.
    let filter =
        EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Store { text, state, id } => {
            cli::store::store(&config, &text, state, id).await?;
        }
        Command::Rekey { old_id, new_id } => {
            cli::rekey::rekey(&config, &old_id, &new_id)?;
        }
        Command::Search { query, k } => {
            cli::search::search(&config, &query, k).await?;
        }
        Command::State { value, tolerance } => {
            cli::state::by_state(&config, value, tolerance)?;
        }
        Command::StateRange { min, max } => {
            cli::state::by_state_range(&config, min, max)?;
        }
        Command::Distribution => {
            cli::state::distribution(&config)?;
        }
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
        Command::Export { path } => {
            cli::export::export(&config, &path)?;
        }
        Command::Import { path } => {
            cli::import::import(&config, &path)?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
        Command::Reset => {
            cli::reset::reset(&config)?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.fingerprint).await?;
            }
        },
    }

    Ok(())
}
