//! Test doubles for the metadata source and the console.
//!
//! Public so backend crates can drive the resolver in their own tests.

use std::{
  collections::{HashMap, VecDeque},
  io,
  sync::{Mutex, MutexGuard},
};

use crate::{
  MetadataError,
  console::{Console, Tone},
  metadata::{MetadataSource, MovieDetails, SearchHit},
  movie::{ExternalId, MovieKind},
};

/// A recorded metadata call, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedQuery {
  Search(String),
  FetchDetails(ExternalId),
}

/// In-memory [`MetadataSource`] with canned responses.
///
/// Search results are keyed by the lowercased query; unknown queries return
/// no hits. Detail records are keyed by external id.
#[derive(Debug, Default)]
pub struct StaticMetadata {
  hits:        Mutex<HashMap<String, Vec<SearchHit>>>,
  details:     Mutex<HashMap<ExternalId, MovieDetails>>,
  queries:     Mutex<Vec<RecordedQuery>>,
  next_error:  Mutex<Option<MetadataError>>,
  fetch_error: Mutex<Option<MetadataError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl StaticMetadata {
  pub fn new() -> Self { Self::default() }

  /// Register a movie: a search hit for `query` plus its detail record.
  pub fn with_movie(self, query: &str, details: MovieDetails, kind: MovieKind) -> Self {
    let hit = SearchHit {
      external_id: details.external_id.clone(),
      title:       details.title.clone(),
      year:        details.year_field.clone(),
      kind,
    };
    lock(&self.hits).entry(query.to_lowercase()).or_default().push(hit);
    lock(&self.details).insert(details.external_id.clone(), details);
    self
  }

  /// Register a bare search hit with no detail record.
  pub fn with_hit(self, query: &str, hit: SearchHit) -> Self {
    lock(&self.hits).entry(query.to_lowercase()).or_default().push(hit);
    self
  }

  /// Fail the next call with `err`.
  pub fn fail_next(&self, err: MetadataError) { *lock(&self.next_error) = Some(err); }

  /// Fail the next detail fetch with `err`; searches still succeed.
  pub fn fail_next_fetch(&self, err: MetadataError) { *lock(&self.fetch_error) = Some(err); }

  pub fn queries(&self) -> Vec<RecordedQuery> { lock(&self.queries).clone() }

  /// How many detail fetches were made.
  pub fn fetch_count(&self) -> usize {
    lock(&self.queries)
      .iter()
      .filter(|q| matches!(q, RecordedQuery::FetchDetails(_)))
      .count()
  }

  fn take_error(&self) -> Option<MetadataError> { lock(&self.next_error).take() }
}

impl MetadataSource for StaticMetadata {
  async fn search<'a>(&'a self, query: &'a str) -> Result<Vec<SearchHit>, MetadataError> {
    lock(&self.queries).push(RecordedQuery::Search(query.to_owned()));
    if let Some(err) = self.take_error() {
      return Err(err);
    }
    Ok(lock(&self.hits).get(&query.to_lowercase()).cloned().unwrap_or_default())
  }

  async fn fetch_details<'a>(
    &'a self,
    external_id: &'a ExternalId,
  ) -> Result<MovieDetails, MetadataError> {
    lock(&self.queries).push(RecordedQuery::FetchDetails(external_id.clone()));
    if let Some(err) = self.take_error().or_else(|| lock(&self.fetch_error).take()) {
      return Err(err);
    }
    lock(&self.details)
      .get(external_id)
      .cloned()
      .ok_or_else(|| MetadataError::NotFound(external_id.to_string()))
  }
}

/// Detail record fixture.
pub fn details(id: &str, title: &str, year: &str, countries: &str) -> MovieDetails {
  MovieDetails {
    external_id:        ExternalId::new(id).unwrap_or_else(|_| panic!("bad fixture id {id:?}")),
    title:              title.to_owned(),
    year_field:         year.to_owned(),
    release_date_field: String::new(),
    poster_url:         None,
    external_rating:    None,
    country_field:      countries.to_owned(),
  }
}

// ─── Console ─────────────────────────────────────────────────────────────────

/// A [`Console`] fed from a queue of input lines.
///
/// Running out of input is an `UnexpectedEof` error, so a prompt loop that
/// would spin forever fails the test instead.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
  input:    VecDeque<String>,
  prompts:  Vec<String>,
  messages: Vec<(Tone, String)>,
}

impl ScriptedConsole {
  pub fn new<I, S>(lines: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self { input: lines.into_iter().map(Into::into).collect(), ..Self::default() }
  }

  pub fn remaining(&self) -> usize { self.input.len() }

  pub fn prompts(&self) -> &[String] { &self.prompts }

  pub fn messages(&self) -> &[(Tone, String)] { &self.messages }

  pub fn errors(&self) -> Vec<&str> { self.with_tone(Tone::Error) }

  pub fn infos(&self) -> Vec<&str> { self.with_tone(Tone::Info) }

  pub fn outputs(&self) -> Vec<&str> { self.with_tone(Tone::Output) }

  fn with_tone(&self, tone: Tone) -> Vec<&str> {
    self
      .messages
      .iter()
      .filter(|(t, _)| *t == tone)
      .map(|(_, text)| text.as_str())
      .collect()
  }
}

impl Console for ScriptedConsole {
  fn read_line(&mut self, prompt: &str) -> io::Result<String> {
    self.prompts.push(prompt.to_owned());
    self.input.pop_front().ok_or_else(|| {
      io::Error::new(io::ErrorKind::UnexpectedEof, format!("no scripted input for {prompt:?}"))
    })
  }

  fn print(&mut self, tone: Tone, text: &str) { self.messages.push((tone, text.to_owned())); }
}
