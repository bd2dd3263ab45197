//! Per-user ratings and the [`RatingEngine`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
  Error, Result,
  movie::MovieId,
  store::CatalogStore,
  user::UserId,
};

/// Lowest accepted rating.
pub const MIN_SCORE: f64 = 0.0;
/// Highest accepted rating.
pub const MAX_SCORE: f64 = 10.0;

// ─── Score ───────────────────────────────────────────────────────────────────

/// A rating value, guaranteed to lie within `[0, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
  pub fn new(value: f64) -> Result<Self> {
    if (MIN_SCORE..=MAX_SCORE).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::InvalidRating(value))
    }
  }

  pub fn value(self) -> f64 { self.0 }
}

impl TryFrom<f64> for Score {
  type Error = Error;

  fn try_from(value: f64) -> Result<Self> { Self::new(value) }
}

impl From<Score> for f64 {
  fn from(score: Score) -> Self { score.0 }
}

impl fmt::Display for Score {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.1}", self.0) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
  pub user_id:  UserId,
  pub movie_id: MovieId,
  pub rating:   Score,
  pub note:     String,
}

/// How an update treats the existing note.
///
/// Decided once where user input is gathered; blank input and an explicit
/// delete keyword map to different variants so nothing downstream has to
/// guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteDirective {
  Keep,
  Delete,
  SetTo(String),
}

impl NoteDirective {
  fn apply(self, previous: &str) -> String {
    match self {
      Self::Keep => previous.to_owned(),
      Self::Delete => String::new(),
      Self::SetTo(text) => text,
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// CRUD over one user's rating of one movie.
pub struct RatingEngine<'a, S> {
  store: &'a S,
}

impl<'a, S: CatalogStore> RatingEngine<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Insert a new rating. Fails with [`Error::DuplicateRating`] when the user
  /// already rated the movie and [`Error::InvalidRating`] outside `[0, 10]`.
  pub async fn add_rating(
    &self,
    user_id: UserId,
    movie_id: MovieId,
    rating: f64,
    note: &str,
  ) -> Result<Rating> {
    let rating = Score::new(rating)?;

    if self.find(user_id, movie_id).await?.is_some() {
      return Err(Error::DuplicateRating { user_id, movie_id });
    }

    let record = Rating { user_id, movie_id, rating, note: note.to_owned() };
    self
      .store
      .add_rating(record.clone())
      .await
      .map_err(Error::store)?;

    info!(%user_id, %movie_id, rating = %record.rating, "rating added");
    Ok(record)
  }

  /// Update an existing rating. `rating = None` keeps the stored value.
  pub async fn update_rating(
    &self,
    user_id: UserId,
    movie_id: MovieId,
    rating: Option<f64>,
    note: NoteDirective,
  ) -> Result<Rating> {
    let rating = rating.map(Score::new).transpose()?;
    let previous = self.get_rating(user_id, movie_id).await?;

    let record = Rating {
      user_id,
      movie_id,
      rating: rating.unwrap_or(previous.rating),
      note: note.apply(&previous.note),
    };
    self
      .store
      .update_rating(record.clone())
      .await
      .map_err(Error::store)?;

    debug!(%user_id, %movie_id, "rating updated");
    Ok(record)
  }

  /// Remove a rating. Returns whether a row existed; absence is not an error.
  pub async fn delete_rating(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
    let removed = self
      .store
      .delete_rating(user_id, movie_id)
      .await
      .map_err(Error::store)?;
    debug!(%user_id, %movie_id, removed, "rating delete");
    Ok(removed)
  }

  pub async fn get_rating(&self, user_id: UserId, movie_id: MovieId) -> Result<Rating> {
    self
      .find(user_id, movie_id)
      .await?
      .ok_or(Error::RatingNotFound { user_id, movie_id })
  }

  pub async fn has_rating(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
    Ok(self.find(user_id, movie_id).await?.is_some())
  }

  async fn find(&self, user_id: UserId, movie_id: MovieId) -> Result<Option<Rating>> {
    self
      .store
      .get_rating(user_id, movie_id)
      .await
      .map_err(Error::store)
  }
}
