//! The [`CatalogResolver`]: turn a typed title into a persisted movie.
//!
//! ```text
//! AwaitingTitle → SearchingRemote → AwaitingUserSelection
//!   → KnownLocally | UnknownFetchingDetails → Persisted → Done
//! ```
//!
//! Every prompt can end in `Cancelled`. A movie row is written only once its
//! details and year are known; countries are persisted one at a time and are
//! guarded against duplication, so a retry after a failure is safe.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::{
  Error, Result,
  console::Console,
  country::CountryResolver,
  input,
  metadata::{self, Candidate, MetadataSource, MovieDetails},
  movie::{ExternalId, Movie, MovieId, NewMovie},
  store::CatalogStore,
};

/// Where the resolved movie came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
  /// Already in the catalog; nothing was fetched.
  Local,
  /// Fetched from the metadata source and inserted.
  Fetched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMovie {
  pub movie_id:    MovieId,
  pub external_id: ExternalId,
  pub title:       String,
  pub origin:      Origin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  Resolved(ResolvedMovie),
  /// The metadata source had no hits. Not an error.
  NoRemoteMatch,
  Cancelled,
}

pub struct CatalogResolver<'a, S, M> {
  store:        &'a S,
  metadata:     &'a M,
  current_year: i32,
}

impl<'a, S: CatalogStore, M: MetadataSource> CatalogResolver<'a, S, M> {
  pub fn new(store: &'a S, metadata: &'a M) -> Self {
    Self { store, metadata, current_year: input::current_year() }
  }

  /// Pin the year used to reject future manual years.
  pub fn with_current_year(mut self, year: i32) -> Self {
    self.current_year = year;
    self
  }

  /// Search, let the user choose, and make sure the choice is in the catalog.
  pub async fn resolve(&self, console: &mut impl Console, query: &str) -> Result<Resolution> {
    debug!(query, "searching remote");
    console.info("Looking up in OMDb...");
    let hits = self.metadata.search(query).await?;
    if hits.is_empty() {
      debug!(query, "no remote match");
      console.info(&format!("Online search couldn't find any movies matching '{query}'"));
      return Ok(Resolution::NoRemoteMatch);
    }

    let candidates = metadata::candidates(hits);
    debug!(count = candidates.len(), "awaiting user selection");
    let Some(chosen) = self.select(console, query, &candidates)? else {
      debug!("cancelled at selection");
      return Ok(Resolution::Cancelled);
    };

    self.ensure_persisted(console, chosen).await
  }

  /// Resolve one already-chosen candidate.
  pub async fn ensure_persisted(
    &self,
    console: &mut impl Console,
    chosen: &Candidate,
  ) -> Result<Resolution> {
    if let Some(movie) = self.find(&chosen.external_id).await? {
      debug!(external_id = %movie.external_id, id = %movie.id, "known locally");
      return Ok(Resolution::Resolved(resolved(movie, Origin::Local)));
    }

    debug!(external_id = %chosen.external_id, "unknown, fetching details");
    let details = self.metadata.fetch_details(&chosen.external_id).await?;

    let year = match metadata::normalize_year(&details) {
      year if year.is_empty() => {
        console.info(&format!("No release year is known for '{}'.", details.title));
        let prompt = "Enter the year of release or '..' to cancel: ";
        match input::read_year(console, prompt, false, self.current_year)? {
          Some(year) => year,
          None => {
            debug!("cancelled at manual year");
            return Ok(Resolution::Cancelled);
          }
        }
      }
      year => year.parse().ok(),
    };

    let movie = self.insert(&details, year).await?;
    self.link_countries(movie.id, &details).await?;
    debug!(id = %movie.id, "persisted");

    Ok(Resolution::Resolved(resolved(movie, Origin::Fetched)))
  }

  fn select<'c>(
    &self,
    console: &mut impl Console,
    query: &str,
    candidates: &'c [Candidate],
  ) -> Result<Option<&'c Candidate>> {
    console.output(&format!("\nMovies matching search term '{query}':"));
    let listing: String = candidates
      .iter()
      .enumerate()
      .map(|(i, c)| {
        let year = if c.year.is_empty() { "N/A" } else { &c.year };
        format!("\n{:>3}: {} ({year}) [{}]", i + 1, c.title, c.kind)
      })
      .collect();
    console.output(&listing);

    let index = input::read_selection(console, "Please select a movie", candidates.len())?;
    Ok(index.map(|i| &candidates[i]))
  }

  async fn insert(&self, details: &MovieDetails, year: Option<i32>) -> Result<Movie> {
    let new = NewMovie::new(details.external_id.clone(), &details.title, year)?
      .with_image_url(details.poster_url.clone())
      .with_external_rating(details.external_rating);

    // Lookup-before-insert already ran; a hit here means another writer.
    if self.find(&new.external_id).await?.is_some() {
      return Err(Error::DuplicateMovie(new.external_id));
    }

    let movie = self.store.add_movie(new).await.map_err(Error::store)?;
    info!(external_id = %movie.external_id, id = %movie.id, title = %movie.title, "movie added");
    Ok(movie)
  }

  async fn link_countries(&self, movie_id: MovieId, details: &MovieDetails) -> Result<()> {
    let countries = CountryResolver::new(self.store);
    let mut linked: HashSet<_> = self
      .store
      .countries_for_movie(movie_id)
      .await
      .map_err(Error::store)?
      .into_iter()
      .map(|c| c.id)
      .collect();

    for name in details.countries() {
      let resolved = countries.resolve(name).await?;
      let country_id = countries.persist_if_new(&resolved).await?;
      if !linked.insert(country_id) {
        debug!(%movie_id, %country_id, "country already linked");
        continue;
      }
      self
        .store
        .link_country(movie_id, country_id)
        .await
        .map_err(Error::store)?;
      debug!(%movie_id, %country_id, country = resolved.name(), "country linked");
    }
    Ok(())
  }

  async fn find(&self, external_id: &ExternalId) -> Result<Option<Movie>> {
    self
      .store
      .get_movie_by_external_id(external_id)
      .await
      .map_err(Error::store)
  }
}

fn resolved(movie: Movie, origin: Origin) -> ResolvedMovie {
  ResolvedMovie {
    movie_id: movie.id,
    external_id: movie.external_id,
    title: movie.title,
    origin,
  }
}
