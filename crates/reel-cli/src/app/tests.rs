//! Menu-level tests: a scripted console driving the app over an in-memory
//! store and canned metadata.

use std::path::PathBuf;

use reel_core::{
  MetadataError,
  console::Tone,
  country::{Country, CountryId, NewCountry},
  movie::{ExternalId, Movie, MovieId, MovieKind, NewMovie, RatedMovie},
  rating::{Rating, Score},
  store::CatalogStore,
  testing::{ScriptedConsole, StaticMetadata, details},
  user::{NewUser, User, UserId},
};
use reel_store_sqlite::SqliteStore;

use super::*;

type TestApp = App<SqliteStore, StaticMetadata, ScriptedConsole>;

async fn app(metadata: StaticMetadata, script: &[&str]) -> TestApp {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let console = ScriptedConsole::new(script.iter().copied());
  App::new(store, metadata, console, PathBuf::from("static"))
    .await
    .expect("app")
}

async fn add_user(app: &TestApp, name: &str, password: &str) -> User {
  let hash = auth::hash_password(password).unwrap();
  app.store.add_user(NewUser::new(name, hash).unwrap()).await.unwrap()
}

async fn rate(app: &TestApp, user: &User, id: &str, title: &str, year: i32, score: f64, note: &str) {
  let new = NewMovie::new(ExternalId::new(id).unwrap(), title, Some(year)).unwrap();
  let movie = app.store.add_movie(new).await.unwrap();
  let rating = Rating {
    user_id:  user.id,
    movie_id: movie.id,
    rating:   Score::new(score).unwrap(),
    note:     note.into(),
  };
  app.store.add_rating(rating).await.unwrap();
}

/// An app logged in as `bob` with three rated movies.
async fn bob(metadata: StaticMetadata, script: &[&str]) -> (TestApp, User) {
  let mut app = app(metadata, script).await;
  let user = add_user(&app, "bob", "secret").await;
  rate(&app, &user, "tt0133093", "The Matrix", 1999, 9.0, "").await;
  rate(&app, &user, "tt0113277", "Heat", 1995, 8.0, "great cast").await;
  rate(&app, &user, "tt0080339", "Airplane!", 1980, 7.0, "").await;
  app.session.switch_to(user.clone());
  (app, user)
}

fn has(list: &[&str], text: &str) -> bool { list.iter().any(|m| m.contains(text)) }

// ─── Menu ────────────────────────────────────────────────────────────────────

#[test]
fn menu_lines_are_right_aligned() {
  assert_eq!(MenuEntry::Exit.line(), " 0. Exit");
  assert_eq!(MenuEntry::Login.line(), "12. Log in / Switch user");
  assert_eq!(MenuEntry::iter().count(), 13);
}

#[test]
fn gating_prompts_list_enabled_choices() {
  assert_eq!(Access::NeedsLogin.choice_prompt(), "\nEnter choice (0, 12): ");
  assert_eq!(Access::NeedsRating.choice_prompt(), "\nEnter choice (0, 2, 12): ");
  assert_eq!(Access::Full.choice_prompt(), "\nEnter choice (0-12): ");
  assert!(!Access::NeedsRating.allows(MenuEntry::Stats));
  assert!(Access::Full.allows(MenuEntry::Website));
}

#[tokio::test]
async fn anonymous_user_is_asked_to_log_in() {
  let mut app = app(StaticMetadata::new(), &["1", "", "42", "", "0"]).await;
  app.run().await.unwrap();

  let errors = app.console.errors();
  assert_eq!(errors, vec!["Please login to use this function.", "\nInvalid choice"]);
  assert!(app.console.prompts().iter().any(|p| p == "\nEnter choice (0, 12): "));
  assert_eq!(app.console.infos().last(), Some(&"\nBye!"));
}

#[tokio::test]
async fn end_of_input_exits_cleanly() {
  let mut app = app(StaticMetadata::new(), &[]).await;
  app.run().await.unwrap();
  assert_eq!(app.console.infos(), vec!["\nBye!"]);
}

#[tokio::test]
async fn disabled_entry_explains_itself() {
  let mut app = app(StaticMetadata::new(), &["5", "", "0"]).await;
  let user = add_user(&app, "carol", "pw").await;
  app.session.switch_to(user);
  app.run().await.unwrap();
  assert_eq!(app.console.errors(), vec!["Add a movie rating to enable this function."]);
}

#[tokio::test]
async fn selected_entry_is_highlighted() {
  let (mut app, _) = bob(StaticMetadata::new(), &["1", "", "0"]).await;
  app.run().await.unwrap();
  let active: Vec<_> = app
    .console
    .messages()
    .iter()
    .filter(|(tone, _)| *tone == Tone::Active)
    .map(|(_, text)| text.as_str())
    .collect();
  assert_eq!(active, vec![" 1. List my movies"]);
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_up_then_rate_inception() {
  let metadata = StaticMetadata::new().with_movie(
    "inception",
    details("tt1375666", "Inception", "2010", "USA, UK"),
    MovieKind::Movie,
  );
  let script = [
    "12", "Alice", "y", "pw", "typo", "pw", "pw", "",
    "2", "Inception", "1", "9", "mind-bending", "",
    "1", "",
    "0",
  ];
  let mut app = app(metadata, &script).await;
  app.run().await.unwrap();

  assert_eq!(app.console.remaining(), 0);
  assert_eq!(app.session.user().user_name, "alice");
  let errors = app.console.errors();
  assert!(has(&errors, "Username alice does not exist."));
  assert!(has(&errors, "Passwords do not match. Please try again!"));

  let infos = app.console.infos();
  assert!(has(&infos, "New user 'alice' has been added and logged in."));
  assert!(has(&infos, "Successfully added rating for movie 'Inception'."));
  assert!(has(&infos, "Note for the movie's rating has been added."));

  let outputs = app.console.outputs();
  assert!(has(&outputs, "1 movies in total:"));
  assert!(outputs.contains(&"Inception (2010) - 9.0 - 🇬🇧 🇺🇸"));

  let stored = app.store.get_user_by_name("alice").await.unwrap().unwrap();
  let movies = app.store.rated_movies(stored.id).await.unwrap();
  assert_eq!(movies[0].note, "mind-bending");
}

#[tokio::test]
async fn wrong_password_keeps_the_session() {
  let mut app = app(StaticMetadata::new(), &["12", "dave", "nope", "", "0"]).await;
  add_user(&app, "dave", "right").await;
  app.run().await.unwrap();

  assert!(app.session.is_anonymous());
  assert_eq!(app.console.errors(), vec!["Authentication failed for the provided credentials!"]);
}

#[tokio::test]
async fn correct_password_switches_user() {
  let mut app = app(StaticMetadata::new(), &["12", "DAVE", "right", "", "0"]).await;
  add_user(&app, "dave", "right").await;
  app.run().await.unwrap();

  assert_eq!(app.session.user().user_name, "dave");
  assert!(has(&app.console.infos(), "You were successfully authenticated and logged in."));
}

#[tokio::test]
async fn declining_sign_up_cancels() {
  let mut app = app(StaticMetadata::new(), &["12", "erin", "n", "", "0"]).await;
  app.run().await.unwrap();
  assert!(app.session.is_anonymous());
  assert!(has(&app.console.infos(), "Action canceled, returning back to menu..."));
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn rating_a_known_movie_twice_is_refused() {
  let metadata = StaticMetadata::new().with_movie(
    "heat",
    details("tt0113277", "Heat", "1995", "USA"),
    MovieKind::Movie,
  );
  let (mut app, _) = bob(metadata, &["2", "Heat", "1", "", "0"]).await;
  app.run().await.unwrap();

  assert!(has(&app.console.infos(), "Found movie 'Heat (tt0113277)' in the database."));
  assert_eq!(app.console.errors(), vec!["You already rated 'Heat'!"]);
  assert_eq!(app.metadata.fetch_count(), 0);
}

// "heat" also resembles "The Matrix", which is listed first.
#[tokio::test]
async fn update_keeps_rating_and_note_on_blank() {
  let (mut app, user) = bob(StaticMetadata::new(), &["4", "heat", "2", "", "", "", "0"]).await;
  app.run().await.unwrap();

  let infos = app.console.infos();
  assert!(has(&infos, "Leave previous rating of '8.0' unchanged."));
  assert!(has(&infos, "Note for the movie's rating has been left unchanged."));

  let movies = app.store.rated_movies(user.id).await.unwrap();
  let heat = movies.iter().find(|m| m.movie.title == "Heat").unwrap();
  assert_eq!(heat.rating.value(), 8.0);
  assert_eq!(heat.note, "great cast");
}

#[tokio::test]
async fn update_can_delete_the_note() {
  let (mut app, user) = bob(StaticMetadata::new(), &["4", "heat", "2", "6.5", "DELETE", "", "0"]).await;
  app.run().await.unwrap();

  let movies = app.store.rated_movies(user.id).await.unwrap();
  let heat = movies.iter().find(|m| m.movie.title == "Heat").unwrap();
  assert_eq!(heat.rating.value(), 6.5);
  assert_eq!(heat.note, "");
}

#[tokio::test]
async fn delete_removes_the_rating() {
  let (mut app, user) = bob(StaticMetadata::new(), &["3", "heat", "2", "", "0"]).await;
  app.run().await.unwrap();

  assert!(has(&app.console.infos(), "Rating for 'Heat' successfully deleted"));
  assert_eq!(app.store.count_ratings(user.id).await.unwrap(), 2);
}

#[tokio::test]
async fn picking_an_unknown_title_reports_it() {
  let (mut app, _) = bob(StaticMetadata::new(), &["3", "zzzz", "", "0"]).await;
  app.run().await.unwrap();
  assert!(has(&app.console.infos(), "A movie containing 'zzzz' could not be found."));
}

#[tokio::test]
async fn metadata_timeout_is_reported_and_the_menu_continues() {
  let (mut app, _) = bob(StaticMetadata::new(), &["2", "Alien", "", "1", "", "0"]).await;
  app.metadata.fail_next(MetadataError::Timeout);
  app.run().await.unwrap();

  assert_eq!(app.console.errors(), vec!["Connection to the OMDb API has timed out."]);
  assert!(has(&app.console.outputs(), "3 movies in total:"));
}

// ─── Browsing ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_show_average_median_and_extremes() {
  let (mut app, _) = bob(StaticMetadata::new(), &["5", "", "0"]).await;
  app.run().await.unwrap();

  let outputs = app.console.outputs();
  assert!(outputs.contains(&"\nAverage rating: 8.0"));
  assert!(outputs.contains(&"Median rating: 8.0"));
  assert!(has(&outputs, "Best movie(s): The Matrix (1999) - 9.0"));
  assert!(has(&outputs, "Worst movie(s): Airplane! (1980) - 7.0"));
}

#[tokio::test]
async fn random_movie_comes_from_the_library() {
  let (mut app, _) = bob(StaticMetadata::new(), &["6", "", "0"]).await;
  app.run().await.unwrap();

  let outputs = app.console.outputs();
  let pick = outputs.iter().find(|o| o.contains("Your movie for tonight:")).unwrap();
  assert!(["The Matrix", "Heat", "Airplane!"].iter().any(|t| pick.contains(t)));
}

#[tokio::test]
async fn search_is_fuzzy_and_suggests_on_a_miss() {
  let (mut app, _) = bob(StaticMetadata::new(), &["7", "mtrx", "", "7", "Matirx", "", "0"]).await;
  app.run().await.unwrap();

  let outputs = app.console.outputs();
  assert_eq!(outputs.iter().filter(|o| o.starts_with("The Matrix (1999)")).count(), 2);
  assert!(outputs.contains(&"\nDid you mean:\n"));
  assert!(has(&app.console.infos(), "A movie containing 'Matirx' could not be found."));
}

#[tokio::test]
async fn sort_by_year_latest_last() {
  let (mut app, _) = bob(StaticMetadata::new(), &["9", "sideways", "last", "", "0"]).await;
  app.run().await.unwrap();

  let titles: Vec<_> = app
    .console
    .outputs()
    .into_iter()
    .filter(|o| o.contains(" - "))
    .collect();
  assert!(titles[0].starts_with("Airplane!"));
  assert!(titles[2].starts_with("The Matrix"));
  assert_eq!(app.console.errors(), vec!["Invalid input"]);
}

#[tokio::test]
async fn filter_by_rating_and_years() {
  let (mut app, _) = bob(StaticMetadata::new(), &["10", "7.5", "1990", "", "", "0"]).await;
  app.run().await.unwrap();

  let outputs = app.console.outputs();
  let start = outputs.iter().position(|o| *o == "\nFiltered Movies:").unwrap();
  let listed: Vec<_> = outputs[start + 1..].iter().filter(|o| o.contains(" - ")).collect();
  assert_eq!(listed.len(), 2);
  assert!(listed[0].starts_with("The Matrix"));
  assert!(listed[1].starts_with("Heat"));
}

#[tokio::test]
async fn website_is_written_for_the_user() {
  let dir = tempfile::tempdir().unwrap();
  let (mut app, _) = bob(StaticMetadata::new(), &["11", "", "0"]).await;
  app.site_dir = dir.path().to_path_buf();
  app.run().await.unwrap();

  assert!(has(&app.console.infos(), "Website for 'bob' was generated successfully."));
  let html = std::fs::read_to_string(dir.path().join("bob.html")).unwrap();
  assert!(html.contains("bob&#39;s movie ratings"));
  assert!(html.find("The Matrix").unwrap() < html.find("Airplane!").unwrap());
}

// ─── Store failures ──────────────────────────────────────────────────────────

/// Delegates to SQLite but cannot count ratings.
struct CountlessStore(SqliteStore);

impl CatalogStore for CountlessStore {
  type Error = reel_store_sqlite::Error;

  async fn add_user(&self, user: NewUser) -> Result<User, Self::Error> {
    self.0.add_user(user).await
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>, Self::Error> {
    self.0.get_user(id).await
  }

  async fn get_user_by_name<'a>(&'a self, user_name: &'a str) -> Result<Option<User>, Self::Error> {
    self.0.get_user_by_name(user_name).await
  }

  async fn default_user(&self) -> Result<User, Self::Error> { self.0.default_user().await }

  async fn add_movie(&self, movie: NewMovie) -> Result<Movie, Self::Error> {
    self.0.add_movie(movie).await
  }

  async fn get_movie(&self, id: MovieId) -> Result<Option<Movie>, Self::Error> {
    self.0.get_movie(id).await
  }

  async fn get_movie_by_external_id<'a>(
    &'a self,
    external_id: &'a ExternalId,
  ) -> Result<Option<Movie>, Self::Error> {
    self.0.get_movie_by_external_id(external_id).await
  }

  async fn add_country(&self, country: NewCountry) -> Result<Country, Self::Error> {
    self.0.add_country(country).await
  }

  async fn get_country_by_name<'a>(&'a self, name: &'a str) -> Result<Option<Country>, Self::Error> {
    self.0.get_country_by_name(name).await
  }

  async fn countries_for_movie(&self, movie_id: MovieId) -> Result<Vec<Country>, Self::Error> {
    self.0.countries_for_movie(movie_id).await
  }

  async fn link_country(&self, movie_id: MovieId, country_id: CountryId) -> Result<(), Self::Error> {
    self.0.link_country(movie_id, country_id).await
  }

  async fn add_rating(&self, rating: Rating) -> Result<(), Self::Error> {
    self.0.add_rating(rating).await
  }

  async fn update_rating(&self, rating: Rating) -> Result<(), Self::Error> {
    self.0.update_rating(rating).await
  }

  async fn delete_rating(&self, user_id: UserId, movie_id: MovieId) -> Result<bool, Self::Error> {
    self.0.delete_rating(user_id, movie_id).await
  }

  async fn get_rating(
    &self,
    user_id: UserId,
    movie_id: MovieId,
  ) -> Result<Option<Rating>, Self::Error> {
    self.0.get_rating(user_id, movie_id).await
  }

  async fn rated_movies(&self, user_id: UserId) -> Result<Vec<RatedMovie>, Self::Error> {
    self.0.rated_movies(user_id).await
  }

  async fn count_ratings(&self, _user_id: UserId) -> Result<u64, Self::Error> {
    Err(reel_store_sqlite::Error::Missing("disk I/O error".into()))
  }
}

#[tokio::test]
async fn failing_rating_count_keeps_the_menu_alive() {
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  let hash = auth::hash_password("secret").unwrap();
  let user = store.add_user(NewUser::new("bob", hash).unwrap()).await.unwrap();

  let console = ScriptedConsole::new(["1", "", "0"]);
  let mut app = App::new(CountlessStore(store), StaticMetadata::new(), console, PathBuf::from("static"))
    .await
    .expect("app");
  app.session.switch_to(user);
  app.run().await.unwrap();

  let db_error = "The following error was raised during a database operation:";
  assert_eq!(
    app.console.errors(),
    vec![db_error, "Please login to use this function.", db_error]
  );
  assert!(app.console.prompts().iter().any(|p| p == "\nEnter choice (0, 12): "));
  assert_eq!(app.console.infos().last(), Some(&"\nBye!"));
  assert_eq!(app.console.remaining(), 0);
}
