//! The `CatalogStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `reel-store-sqlite`).
//! The resolver and rating engine depend on this abstraction, not on any
//! concrete backend. Every request type is a typed struct validated at
//! construction, so the backend only executes statements.

use std::future::Future;

use crate::{
  country::{Country, CountryId, NewCountry},
  movie::{ExternalId, Movie, MovieId, NewMovie, RatedMovie},
  rating::Rating,
  user::{NewUser, User, UserId},
};

/// Abstraction over a Reel catalog backend.
///
/// Each call is self-contained: implementations acquire whatever connection
/// they need, run their statements, and release it before returning. No
/// method holds a connection across calls.
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_name<'a>(
    &'a self,
    user_name: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// The system user active while nobody is logged in. Created with
  /// insert-or-ignore semantics, so this never fails on a fresh store.
  fn default_user(&self) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Movies ────────────────────────────────────────────────────────────

  /// Insert a movie. Backends reject a second row for the same external id.
  fn add_movie(
    &self,
    movie: NewMovie,
  ) -> impl Future<Output = Result<Movie, Self::Error>> + Send + '_;

  fn get_movie(
    &self,
    id: MovieId,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + '_;

  fn get_movie_by_external_id<'a>(
    &'a self,
    external_id: &'a ExternalId,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + 'a;

  // ── Countries ─────────────────────────────────────────────────────────

  fn add_country(
    &self,
    country: NewCountry,
  ) -> impl Future<Output = Result<Country, Self::Error>> + Send + '_;

  fn get_country_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Country>, Self::Error>> + Send + 'a;

  /// Countries linked to a movie, ordered by name.
  fn countries_for_movie(
    &self,
    movie_id: MovieId,
  ) -> impl Future<Output = Result<Vec<Country>, Self::Error>> + Send + '_;

  /// Create the movie–country relation. Takes a [`CountryId`], which only
  /// exists for persisted countries.
  fn link_country(
    &self,
    movie_id: MovieId,
    country_id: CountryId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Ratings ───────────────────────────────────────────────────────────

  fn add_rating(
    &self,
    rating: Rating,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_rating(
    &self,
    rating: Rating,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a rating; returns whether a row was removed.
  fn delete_rating(
    &self,
    user_id: UserId,
    movie_id: MovieId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn get_rating(
    &self,
    user_id: UserId,
    movie_id: MovieId,
  ) -> impl Future<Output = Result<Option<Rating>, Self::Error>> + Send + '_;

  /// Every movie the user rated, with rating, note, and countries.
  fn rated_movies(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<RatedMovie>, Self::Error>> + Send + '_;

  fn count_ratings(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
