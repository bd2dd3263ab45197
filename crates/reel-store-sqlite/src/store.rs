//! [`SqliteStore`], the SQLite implementation of [`CatalogStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::OptionalExtension as _;
use tracing::debug;

use reel_core::{
  country::{Country, CountryId, NewCountry},
  movie::{ExternalId, Movie, MovieId, NewMovie, RatedMovie},
  rating::{Rating, Score},
  store::CatalogStore,
  user::{DEFAULT_USER_NAME, NewUser, User, UserId},
};

use crate::{
  Error, Result,
  encode::{
    COUNTRY_COLUMNS, MOVIE_COLUMNS, RawMovie, RawRatedMovie, RawRating, USER_COLUMNS,
    country_row, user_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Reel catalog backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  /// Missing parent directories are created.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
          "INSERT OR IGNORE INTO users (user_name) VALUES (?1)",
          rusqlite::params![DEFAULT_USER_NAME],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_where(
    &self,
    clause: &'static str,
    value: rusqlite::types::Value,
  ) -> Result<Option<User>> {
    let user = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} = ?1"),
            rusqlite::params![value],
            user_row,
          )
          .optional()?)
      })
      .await?;
    Ok(user)
  }

  async fn movie_where(
    &self,
    clause: &'static str,
    value: rusqlite::types::Value,
  ) -> Result<Option<Movie>> {
    let raw: Option<RawMovie> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE {clause} = ?1"),
            rusqlite::params![value],
            |row| RawMovie::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;
    raw.map(RawMovie::into_movie).transpose()
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, user: NewUser) -> Result<User> {
    let NewUser { user_name, first_name, last_name, password_hash } = user;

    let user = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_name, first_name, last_name, password_hash)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_name, first_name, last_name, password_hash],
        )?;
        Ok(User {
          id: UserId(conn.last_insert_rowid()),
          user_name,
          first_name,
          last_name,
          password_hash: Some(password_hash),
        })
      })
      .await?;

    debug!(user = %user.user_name, id = %user.id, "user inserted");
    Ok(user)
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    self.user_where("id", id.0.into()).await
  }

  async fn get_user_by_name<'a>(&'a self, user_name: &'a str) -> Result<Option<User>> {
    self.user_where("user_name", user_name.to_owned().into()).await
  }

  async fn default_user(&self) -> Result<User> {
    self
      .get_user_by_name(DEFAULT_USER_NAME)
      .await?
      .ok_or_else(|| Error::Missing(format!("user {DEFAULT_USER_NAME:?}")))
  }

  // ── Movies ────────────────────────────────────────────────────────────────

  async fn add_movie(&self, movie: NewMovie) -> Result<Movie> {
    let NewMovie { external_id, title, year, image_url, external_rating } = movie;
    let external_str = external_id.as_str().to_owned();
    let title_c = title.clone();
    let image_c = image_url.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO movies (external_id, title, year, image_url, external_rating)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![external_str, title_c, year, image_c, external_rating],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    debug!(%external_id, id, "movie inserted");
    Ok(Movie {
      id: MovieId(id),
      external_id,
      title,
      year,
      image_url,
      external_rating,
    })
  }

  async fn get_movie(&self, id: MovieId) -> Result<Option<Movie>> {
    self.movie_where("id", id.0.into()).await
  }

  async fn get_movie_by_external_id<'a>(
    &'a self,
    external_id: &'a ExternalId,
  ) -> Result<Option<Movie>> {
    self
      .movie_where("external_id", external_id.as_str().to_owned().into())
      .await
  }

  // ── Countries ─────────────────────────────────────────────────────────────

  async fn add_country(&self, country: NewCountry) -> Result<Country> {
    let NewCountry { name, code } = country;

    let country = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO countries (name, code) VALUES (?1, ?2)",
          rusqlite::params![name, code],
        )?;
        Ok(Country { id: CountryId(conn.last_insert_rowid()), name, code })
      })
      .await?;

    debug!(name = %country.name, id = %country.id, "country inserted");
    Ok(country)
  }

  async fn get_country_by_name<'a>(&'a self, name: &'a str) -> Result<Option<Country>> {
    let name = name.to_owned();
    let country = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE name = ?1"),
            rusqlite::params![name],
            country_row,
          )
          .optional()?)
      })
      .await?;
    Ok(country)
  }

  async fn countries_for_movie(&self, movie_id: MovieId) -> Result<Vec<Country>> {
    let countries = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.id, c.name, c.code
           FROM countries c
           JOIN movies_countries mc ON mc.country_id = c.id
           WHERE mc.movie_id = ?1
           ORDER BY c.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![movie_id.0], country_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(countries)
  }

  async fn link_country(&self, movie_id: MovieId, country_id: CountryId) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO movies_countries (movie_id, country_id) VALUES (?1, ?2)",
          rusqlite::params![movie_id.0, country_id.0],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Ratings ───────────────────────────────────────────────────────────────

  async fn add_rating(&self, rating: Rating) -> Result<()> {
    let Rating { user_id, movie_id, rating, note } = rating;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ratings (user_id, movie_id, rating, note) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id.0, movie_id.0, rating.value(), note],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_rating(&self, rating: Rating) -> Result<()> {
    let Rating { user_id, movie_id, rating, note } = rating;
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE ratings SET rating = ?3, note = ?4 WHERE user_id = ?1 AND movie_id = ?2",
          rusqlite::params![user_id.0, movie_id.0, rating.value(), note],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(reel_core::Error::RatingNotFound { user_id, movie_id }.into());
    }
    Ok(())
  }

  async fn delete_rating(&self, user_id: UserId, movie_id: MovieId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM ratings WHERE user_id = ?1 AND movie_id = ?2",
          rusqlite::params![user_id.0, movie_id.0],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn get_rating(&self, user_id: UserId, movie_id: MovieId) -> Result<Option<Rating>> {
    let raw: Option<RawRating> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, movie_id, rating, note FROM ratings
             WHERE user_id = ?1 AND movie_id = ?2",
            rusqlite::params![user_id.0, movie_id.0],
            |row| {
              Ok(RawRating {
                user_id:  row.get(0)?,
                movie_id: row.get(1)?,
                rating:   row.get(2)?,
                note:     row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRating::into_rating).transpose()
  }

  async fn rated_movies(&self, user_id: UserId) -> Result<Vec<RatedMovie>> {
    let (raws, links): (Vec<RawRatedMovie>, Vec<(i64, Country)>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.id, m.external_id, m.title, m.year, m.image_url, m.external_rating,
                  r.rating, r.note
           FROM ratings r
           JOIN movies m ON m.id = r.movie_id
           WHERE r.user_id = ?1
           ORDER BY m.id",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![user_id.0], |row| {
            Ok(RawRatedMovie {
              movie:  RawMovie::from_row(row, 0)?,
              rating: row.get(6)?,
              note:   row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT mc.movie_id, c.id, c.name, c.code
           FROM movies_countries mc
           JOIN countries c ON c.id = mc.country_id
           JOIN ratings r ON r.movie_id = mc.movie_id
           WHERE r.user_id = ?1
           ORDER BY c.name",
        )?;
        let links = stmt
          .query_map(rusqlite::params![user_id.0], |row| {
            Ok((
              row.get(0)?,
              Country {
                id:   CountryId(row.get(1)?),
                name: row.get(2)?,
                code: row.get(3)?,
              },
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((raws, links))
      })
      .await?;

    let mut by_movie: HashMap<i64, Vec<Country>> = HashMap::new();
    for (movie_id, country) in links {
      by_movie.entry(movie_id).or_default().push(country);
    }

    raws
      .into_iter()
      .map(|raw| -> Result<RatedMovie> {
        let countries = by_movie.remove(&raw.movie.id).unwrap_or_default();
        Ok(RatedMovie {
          movie: raw.movie.into_movie()?,
          rating: Score::new(raw.rating)?,
          note: raw.note,
          countries,
        })
      })
      .collect()
  }

  async fn count_ratings(&self, user_id: UserId) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM ratings WHERE user_id = ?1",
          rusqlite::params![user_id.0],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }
}
