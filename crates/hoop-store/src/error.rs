//! Error type for `hoop-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hoop_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("column decode error: {0}")]
  Decode(String),

  #[error("could not prepare store directory: {0}")]
  Io(#[from] std::io::Error),

  #[error("nightly run {0:?} already exists")]
  NightlyRunExists(String),

  #[error("nightly run {0:?} is already finalized")]
  NightlyRunFinalized(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
