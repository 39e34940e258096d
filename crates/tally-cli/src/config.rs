//! Configuration resolution for the `tally` binary.
//!
//! Resolved exactly once at process start; the chosen [`Backend`] is
//! threaded through as a constructor argument from there. Nothing deeper in
//! the call stack reads the environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Embedded-backend file, relative to the working directory.
pub const DEFAULT_SQLITE_PATH: &str = "hiscores.db";

/// Bundled seed dataset consumed once on a fresh deployment.
pub const DEFAULT_SEED_PATH: &str = "seed/hiscores_seed.sqlite3";

/// Tracked when no players are configured anywhere.
pub const DEFAULT_PLAYER: &str = "tibble49";

/// Settings merged from the optional TOML file and `TALLY_*` environment
/// variables (environment wins). CLI flags override on top of this.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Networked-backend connection URL. Present (and non-blank) selects the
  /// networked backend; absent selects the embedded file backend.
  pub database_url: Option<String>,
  pub sqlite_path:  PathBuf,
  pub seed_path:    PathBuf,
  /// Player names to track with `collect` when no `--player` flag is given.
  pub players:      Vec<String>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database_url: None,
      sqlite_path:  PathBuf::from(DEFAULT_SQLITE_PATH),
      seed_path:    PathBuf::from(DEFAULT_SEED_PATH),
      players:      vec![DEFAULT_PLAYER.to_owned()],
    }
  }
}

impl Settings {
  pub fn load(config_file: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(config_file.to_owned()).required(false))
      .add_source(config::Environment::with_prefix("TALLY"))
      .build()
      .context("failed to read configuration")?;

    settings
      .try_deserialize()
      .context("failed to deserialise configuration")
  }

  /// The storage backend this process will use, decided once.
  pub fn backend(&self) -> Backend {
    match self.database_url.as_deref().map(str::trim) {
      Some(url) if !url.is_empty() => Backend::Postgres(url.to_owned()),
      _ => Backend::Sqlite(self.sqlite_path.clone()),
    }
  }
}

/// The one place where the two storage engines are told apart.
#[derive(Debug, Clone)]
pub enum Backend {
  Sqlite(PathBuf),
  Postgres(String),
}
