//! Movies as stored in the local catalog.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::{Error, Result, country::Country, rating::Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub i64);

impl fmt::Display for MovieId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Stable identifier assigned by the metadata source (an IMDb id such as
/// `tt1375666`). The local de-duplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId(String);

impl ExternalId {
  pub fn new(raw: impl AsRef<str>) -> Result<Self> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() {
      return Err(Error::InvalidField {
        field:  "external_id",
        reason: "must not be empty".into(),
      });
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ExternalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for ExternalId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<ExternalId> for String {
  fn from(value: ExternalId) -> Self { value.0 }
}

/// The `Type` reported for a search hit.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MovieKind {
  Movie,
  Series,
  Episode,
  Game,
  #[strum(default)]
  Other(String),
}

impl fmt::Display for MovieKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Movie => "movie",
      Self::Series => "series",
      Self::Episode => "episode",
      Self::Game => "game",
      Self::Other(raw) => raw,
    })
  }
}

/// A persisted movie row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
  pub id:              MovieId,
  pub external_id:     ExternalId,
  pub title:           String,
  /// `None` when the release year is unknown.
  pub year:            Option<i32>,
  pub image_url:       Option<String>,
  pub external_rating: Option<f64>,
}

/// Input for [`CatalogStore::add_movie`](crate::store::CatalogStore::add_movie).
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
  pub external_id:     ExternalId,
  pub title:           String,
  pub year:            Option<i32>,
  pub image_url:       Option<String>,
  pub external_rating: Option<f64>,
}

impl NewMovie {
  pub fn new(external_id: ExternalId, title: &str, year: Option<i32>) -> Result<Self> {
    let title = title.trim();
    if title.is_empty() {
      return Err(Error::InvalidField {
        field:  "title",
        reason: "must not be empty".into(),
      });
    }
    Ok(Self {
      external_id,
      title: title.to_owned(),
      year,
      image_url: None,
      external_rating: None,
    })
  }

  pub fn with_image_url(mut self, url: Option<String>) -> Self {
    self.image_url = url;
    self
  }

  pub fn with_external_rating(mut self, rating: Option<f64>) -> Self {
    self.external_rating = rating;
    self
  }
}

/// A movie joined with one user's rating and the movie's countries.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedMovie {
  pub movie:     Movie,
  pub rating:    Score,
  pub note:      String,
  pub countries: Vec<Country>,
}

impl RatedMovie {
  /// Year for display; unknown years render as `N/A`.
  pub fn year_label(&self) -> String {
    self.movie.year.map_or_else(|| "N/A".to_owned(), |y| y.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn external_ids_are_trimmed_and_non_empty() {
    assert_eq!(ExternalId::new(" tt0133093 ").unwrap().as_str(), "tt0133093");
    assert!(ExternalId::new("  ").is_err());
  }

  #[test]
  fn movie_kind_parses_known_and_unknown_types() {
    assert_eq!("movie".parse::<MovieKind>().unwrap(), MovieKind::Movie);
    assert_eq!("Series".parse::<MovieKind>().unwrap(), MovieKind::Series);
    assert_eq!(
      "short".parse::<MovieKind>().unwrap(),
      MovieKind::Other("short".into())
    );
  }

  #[test]
  fn blank_titles_are_rejected() {
    let id = ExternalId::new("tt1").unwrap();
    assert!(NewMovie::new(id, "  ", Some(1999)).is_err());
  }
}
