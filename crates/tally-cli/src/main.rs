//! `tally` — hiscore snapshot collector and migration tool.
//!
//! # Usage
//!
//! ```
//! tally collect
//! tally collect --player tibble49 --player xespis --mode hardcore_ironman
//! TALLY_DATABASE_URL=postgres://… tally migrate
//! ```
//!
//! Run `collect` manually or from a scheduler to gather daily data; re-runs
//! on the same day are no-ops thanks to the store's uniqueness key.

mod bootstrap;
mod collect;
mod config;
mod migrate;
mod replay;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tally_hiscores::{GameMode, HiscoresClient};
use tally_store_postgres::PgStore;
use tally_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{Backend, Settings};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tally", about = "Collect and store hiscore snapshots")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tally.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Fetch current stats for the tracked players and store today's
  /// snapshots.
  Collect {
    /// Player name to track (repeatable; overrides the configured list).
    #[arg(long = "player", value_name = "NAME")]
    players: Vec<String>,

    /// Leaderboard variant to query: regular, ironman, hardcore_ironman,
    /// ultimate_ironman, deadman, seasonal.
    #[arg(long, default_value = "regular")]
    mode: String,
  },

  /// Replay every row of the embedded database into the networked backend.
  Migrate,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  match cli.command {
    Command::Collect { players, mode } => {
      let mode: GameMode = mode.parse().context("invalid --mode")?;
      let players = if players.is_empty() {
        settings.players.clone()
      } else {
        players
      };
      let client = HiscoresClient::new().context("building HTTP client")?;

      match settings.backend() {
        Backend::Sqlite(path) => {
          bootstrap::copy_seed_if_missing(&path, &settings.seed_path)?;
          let store = SqliteStore::open(&path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
          bootstrap::ensure_ready(&store, &settings.seed_path).await?;
          collect::run(&store, &client, &players, mode).await
        }
        Backend::Postgres(url) => {
          let store = PgStore::connect(&url)
            .await
            .context("connecting to the database backend")?;
          bootstrap::ensure_ready(&store, &settings.seed_path).await?;
          collect::run(&store, &client, &players, mode).await
        }
      }
    }

    Command::Migrate => migrate::run(&settings).await,
  }
}
