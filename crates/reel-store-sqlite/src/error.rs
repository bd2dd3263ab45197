//! Error type for `reel-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] reel_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("could not create database directory: {0}")]
  Io(#[from] std::io::Error),

  /// A row expected by an invariant was missing, e.g. the default user.
  #[error("missing row: {0}")]
  Missing(String),
}

impl Error {
  /// `true` when a UNIQUE, PRIMARY KEY, CHECK or FOREIGN KEY constraint
  /// rejected the statement.
  pub fn is_constraint_violation(&self) -> bool {
    match self {
      Self::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))) => {
        e.code == rusqlite::ErrorCode::ConstraintViolation
      }
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
