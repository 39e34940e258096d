//! Error type for `tally-store-postgres`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("integer out of range: {0}")]
  OutOfRange(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
