//! The [`MetadataSource`] trait and year normalisation.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  MetadataError,
  movie::{ExternalId, MovieKind},
};

/// External provider of movie search results and detail records.
pub trait MetadataSource: Send + Sync {
  /// Search by title. No hits is an empty `Vec`, not an error.
  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<SearchHit>, MetadataError>> + Send + 'a;

  fn fetch_details<'a>(
    &'a self,
    external_id: &'a ExternalId,
  ) -> impl Future<Output = Result<MovieDetails, MetadataError>> + Send + 'a;
}

/// One row of a remote search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
  pub external_id: ExternalId,
  pub title:       String,
  /// Raw year text; series report ranges such as `2008–2013`.
  pub year:        String,
  pub kind:        MovieKind,
}

/// Full detail record for a single movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
  pub external_id:        ExternalId,
  pub title:              String,
  pub year_field:         String,
  pub release_date_field: String,
  pub poster_url:         Option<String>,
  pub external_rating:    Option<f64>,
  /// Comma-and-space delimited list, e.g. `"USA, UK"`.
  pub country_field:      String,
}

impl MovieDetails {
  /// Individual country names. The field is split on exactly `", "`.
  pub fn countries(&self) -> Vec<&str> {
    if self.country_field.trim().is_empty() {
      return Vec::new();
    }
    self
      .country_field
      .split(", ")
      .filter(|name| !name.trim().is_empty())
      .collect()
  }
}

// ─── Year normalisation ──────────────────────────────────────────────────────

/// Extract a 4-digit release year, or `""` when unknown.
///
/// Tries the year field, then the last four characters of the release date.
pub fn normalize_year(details: &MovieDetails) -> String {
  if is_valid_year(&details.year_field) {
    return details.year_field.clone();
  }
  let tail = last_chars(&details.release_date_field, 4);
  if is_valid_year(tail) {
    return tail.to_owned();
  }
  String::new()
}

/// Exactly four ASCII digits.
pub fn is_valid_year(text: &str) -> bool {
  text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit())
}

fn last_chars(text: &str, n: usize) -> &str {
  match text.char_indices().rev().nth(n - 1) {
    Some((idx, _)) => &text[idx..],
    None => text,
  }
}

// ─── Candidates ──────────────────────────────────────────────────────────────

/// A search hit normalised for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
  pub external_id: ExternalId,
  pub title:       String,
  pub year:        String,
  pub kind:        MovieKind,
}

impl From<SearchHit> for Candidate {
  fn from(hit: SearchHit) -> Self {
    Self {
      external_id: hit.external_id,
      title:       hit.title.trim().to_owned(),
      year:        hit.year.trim().to_owned(),
      kind:        hit.kind,
    }
  }
}

/// Normalise hits and order them newest first. The sort is stable, so equal
/// years keep the source order.
pub fn candidates(hits: Vec<SearchHit>) -> Vec<Candidate> {
  let mut out: Vec<Candidate> = hits.into_iter().map(Candidate::from).collect();
  out.sort_by(|a, b| b.year.cmp(&a.year));
  out
}
