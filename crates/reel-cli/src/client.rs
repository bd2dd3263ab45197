//! OMDb client implementing [`MetadataSource`].
//!
//! OMDb answers every request with HTTP 200 and a `"Response"` flag; a
//! `"False"` search means no hits, a `"False"` detail lookup means the id is
//! unknown. Missing values are reported as the string `"N/A"`.

use std::time::Duration;

use reel_core::{
  MetadataError,
  metadata::{MetadataSource, MovieDetails, SearchHit},
  movie::{ExternalId, MovieKind},
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

const MISSING: &str = "N/A";

/// Connection settings for OMDb.
#[derive(Debug, Clone)]
pub struct OmdbConfig {
  pub api_key:  String,
  pub base_url: String,
  pub timeout:  Duration,
}

pub struct OmdbClient {
  client:   Client,
  base_url: String,
  api_key:  String,
}

impl OmdbClient {
  pub fn new(config: OmdbConfig) -> Result<Self, MetadataError> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(|e| MetadataError::Unreachable(format!("failed to build HTTP client: {e}")))?;
    Ok(Self { client, base_url: config.base_url, api_key: config.api_key })
  }

  async fn get(&self, query: &[(&str, &str)]) -> Result<String, MetadataError> {
    if self.api_key.is_empty() {
      return Err(MetadataError::NotConfigured(
        "set omdb_api_key in reel.toml or REEL_OMDB_API_KEY".into(),
      ));
    }

    let response = self
      .client
      .get(&self.base_url)
      .query(&[("apikey", self.api_key.as_str())])
      .query(query)
      .send()
      .await
      .map_err(transport)?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
      return Err(MetadataError::NotConfigured("invalid OMDb API key".into()));
    }
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(MetadataError::Rejected { status: status.as_u16(), message: body });
    }
    response.text().await.map_err(transport)
  }
}

impl MetadataSource for OmdbClient {
  async fn search<'a>(&'a self, query: &'a str) -> Result<Vec<SearchHit>, MetadataError> {
    debug!(query, "OMDb search");
    let term = query.to_lowercase();
    let body = self.get(&[("s", term.as_str())]).await?;
    parse_search(&body)
  }

  async fn fetch_details<'a>(
    &'a self,
    external_id: &'a ExternalId,
  ) -> Result<MovieDetails, MetadataError> {
    debug!(%external_id, "OMDb details");
    let body = self.get(&[("i", external_id.as_str())]).await?;
    parse_details(&body, external_id)
  }
}

/// The request URL carries the API key, so it is stripped before the error
/// is rendered anywhere.
fn transport(err: reqwest::Error) -> MetadataError {
  let err = err.without_url();
  if err.is_timeout() {
    MetadataError::Timeout
  } else if err.is_decode() {
    MetadataError::Parse(err.to_string())
  } else {
    MetadataError::Unreachable(err.to_string())
  }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchResponse {
  response: String,
  #[serde(default)]
  search:   Vec<WireHit>,
  #[serde(default)]
  error:    Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireHit {
  title:   String,
  #[serde(default)]
  year:    String,
  #[serde(rename = "imdbID")]
  imdb_id: String,
  #[serde(rename = "Type", default)]
  kind:    String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetailResponse {
  response:    String,
  #[serde(default)]
  error:       Option<String>,
  #[serde(default)]
  title:       String,
  #[serde(default)]
  year:        String,
  #[serde(default)]
  released:    String,
  #[serde(default)]
  poster:      String,
  #[serde(rename = "imdbRating", default)]
  imdb_rating: String,
  #[serde(default)]
  country:     String,
}

fn accepted(flag: &str) -> bool { flag.eq_ignore_ascii_case("true") }

/// `"N/A"` and blank become `None`.
fn present(value: String) -> Option<String> {
  let value = value.trim();
  (!value.is_empty() && value != MISSING).then(|| value.to_owned())
}

pub(crate) fn parse_search(body: &str) -> Result<Vec<SearchHit>, MetadataError> {
  let parsed: SearchResponse = serde_json::from_str(body)
    .map_err(|e| MetadataError::Parse(format!("failed to parse search response: {e}")))?;

  if !accepted(&parsed.response) {
    debug!(reason = parsed.error.as_deref().unwrap_or_default(), "OMDb search returned nothing");
    return Ok(Vec::new());
  }

  let hits = parsed
    .search
    .into_iter()
    .filter_map(|hit| {
      let external_id = match ExternalId::new(&hit.imdb_id) {
        Ok(id) => id,
        Err(e) => {
          warn!(title = %hit.title, error = %e, "skipping search hit without an id");
          return None;
        }
      };
      let kind = hit.kind.parse().unwrap_or_else(|_| MovieKind::Other(hit.kind.clone()));
      Some(SearchHit {
        external_id,
        title: hit.title,
        year: present(hit.year).unwrap_or_default(),
        kind,
      })
    })
    .collect();
  Ok(hits)
}

pub(crate) fn parse_details(
  body: &str,
  external_id: &ExternalId,
) -> Result<MovieDetails, MetadataError> {
  let parsed: DetailResponse = serde_json::from_str(body)
    .map_err(|e| MetadataError::Parse(format!("failed to parse detail response: {e}")))?;

  if !accepted(&parsed.response) {
    let reason = parsed.error.unwrap_or_else(|| "unknown id".into());
    return Err(MetadataError::NotFound(format!("{external_id}: {reason}")));
  }

  let external_rating = present(parsed.imdb_rating).and_then(|r| r.parse::<f64>().ok());

  Ok(MovieDetails {
    external_id: external_id.clone(),
    title: parsed.title,
    year_field: present(parsed.year).unwrap_or_default(),
    release_date_field: present(parsed.released).unwrap_or_default(),
    poster_url: present(parsed.poster),
    external_rating,
    country_field: present(parsed.country).unwrap_or_default(),
  })
}
