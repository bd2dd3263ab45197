//! Errors surfaced by menu actions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] reel_core::Error),
  #[error("password hashing failed: {0}")]
  Hash(String),
  #[error("could not write website: {0}")]
  Site(#[source] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// The console closed under a prompt. The menu loop stops on this.
  pub fn is_end_of_input(&self) -> bool {
    matches!(
      self,
      Error::Core(reel_core::Error::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof
    )
  }
}
