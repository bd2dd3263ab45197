//! Error types for `reel-core`.

use thiserror::Error;

use crate::{
  movie::{ExternalId, MovieId},
  user::UserId,
};

#[derive(Debug, Error)]
pub enum Error {
  // ── Integrity ─────────────────────────────────────────────────────────

  #[error("user {user_id} already rated movie {movie_id}")]
  DuplicateRating { user_id: UserId, movie_id: MovieId },

  #[error("no rating by user {user_id} for movie {movie_id}")]
  RatingNotFound { user_id: UserId, movie_id: MovieId },

  #[error("rating {0} is outside the range 0-10")]
  InvalidRating(f64),

  #[error("movie {0} is already in the catalog")]
  DuplicateMovie(ExternalId),

  #[error("invalid field {field}: {reason}")]
  InvalidField { field: &'static str, reason: String },

  // ── Resources ─────────────────────────────────────────────────────────

  #[error("metadata source: {0}")]
  Metadata(#[from] MetadataError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("terminal i/o: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Wrap a backend error. Used as `.map_err(Error::store)`.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

/// Failures reported by a [`MetadataSource`](crate::metadata::MetadataSource).
#[derive(Debug, Error)]
pub enum MetadataError {
  #[error("request timed out")]
  Timeout,

  #[error("could not connect: {0}")]
  Unreachable(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("rejected with status {status}: {message}")]
  Rejected { status: u16, message: String },

  #[error("unexpected response: {0}")]
  Parse(String),

  #[error("not configured: {0}")]
  NotConfigured(String),
}

impl MetadataError {
  /// Timeouts and connection failures: the source is unavailable rather than
  /// unhappy with the request.
  pub fn is_unavailable(&self) -> bool {
    matches!(self, Self::Timeout | Self::Unreachable(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
