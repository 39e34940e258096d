//! Error types for the tally-hiscores client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The endpoint answers 404 for names it has never ranked.
  #[error("player not on the hiscores: {0:?}")]
  PlayerNotFound(String),

  #[error("hiscores returned status {status} for {player:?}")]
  Status { player: String, status: u16 },

  #[error("malformed stats line {index}: {line:?}")]
  MalformedLine { index: usize, line: String },

  #[error("unknown game mode: {0:?}")]
  UnknownMode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
