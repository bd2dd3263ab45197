//! Row decoding between SQLite columns and `reel-core` domain types.
//!
//! Rows are first read into plain `Raw*` structs inside the connection
//! closure, then validated into domain types outside it, so constructor
//! errors surface as [`Error::Core`](crate::Error::Core).

use reel_core::{
  country::{Country, CountryId},
  movie::{ExternalId, Movie, MovieId},
  rating::{Rating, Score},
  user::{User, UserId},
};

use crate::Result;

// ─── Column lists ────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, user_name, first_name, last_name, password_hash";
pub const MOVIE_COLUMNS: &str = "id, external_id, title, year, image_url, external_rating";
pub const COUNTRY_COLUMNS: &str = "id, name, code";

// ─── Users ───────────────────────────────────────────────────────────────────

pub fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:            UserId(row.get(0)?),
    user_name:     row.get(1)?,
    first_name:    row.get(2)?,
    last_name:     row.get(3)?,
    password_hash: row.get(4)?,
  })
}

// ─── Countries ───────────────────────────────────────────────────────────────

pub fn country_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Country> {
  Ok(Country {
    id:   CountryId(row.get(0)?),
    name: row.get(1)?,
    code: row.get(2)?,
  })
}

// ─── Movies ──────────────────────────────────────────────────────────────────

/// Raw values read directly from a `movies` row.
#[derive(Debug)]
pub struct RawMovie {
  pub id:              i64,
  pub external_id:     String,
  pub title:           String,
  pub year:            Option<i32>,
  pub image_url:       Option<String>,
  pub external_rating: Option<f64>,
}

impl RawMovie {
  /// Read the columns of [`MOVIE_COLUMNS`] starting at `offset`.
  pub fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(offset)?,
      external_id:     row.get(offset + 1)?,
      title:           row.get(offset + 2)?,
      year:            row.get(offset + 3)?,
      image_url:       row.get(offset + 4)?,
      external_rating: row.get(offset + 5)?,
    })
  }

  pub fn into_movie(self) -> Result<Movie> {
    Ok(Movie {
      id:              MovieId(self.id),
      external_id:     ExternalId::new(self.external_id)?,
      title:           self.title,
      year:            self.year,
      image_url:       self.image_url,
      external_rating: self.external_rating,
    })
  }
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

/// Raw values read directly from a `ratings` row.
#[derive(Debug)]
pub struct RawRating {
  pub user_id:  i64,
  pub movie_id: i64,
  pub rating:   f64,
  pub note:     String,
}

impl RawRating {
  pub fn into_rating(self) -> Result<Rating> {
    Ok(Rating {
      user_id:  UserId(self.user_id),
      movie_id: MovieId(self.movie_id),
      rating:   Score::new(self.rating)?,
      note:     self.note,
    })
  }
}

/// A rated movie before its countries are attached.
#[derive(Debug)]
pub struct RawRatedMovie {
  pub movie:  RawMovie,
  pub rating: f64,
  pub note:   String,
}
