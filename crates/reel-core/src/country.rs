//! Countries and the [`CountryResolver`].
//!
//! Free-text country names arrive from the metadata source in whatever form
//! it chose (`USA`, `UK`, `West Germany`). The resolver canonicalises them
//! against the local store first and the embedded reference table second.
//! Names nobody recognises are kept verbatim, so resolution never blocks.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Error, Result, reference, store::CatalogStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(pub i64);

impl fmt::Display for CountryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A persisted country row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
  pub id:   CountryId,
  pub name: String,
  pub code: String,
}

impl Country {
  /// Flag glyph for display, falling back to the name.
  pub fn symbol(&self) -> String { flag_symbol(&self.code, &self.name) }
}

/// Input for [`CatalogStore::add_country`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCountry {
  pub name: String,
  pub code: String,
}

impl NewCountry {
  pub fn new(name: &str, code: &str) -> Result<Self> {
    let name = name.trim();
    let code = code.trim();
    if name.is_empty() {
      return Err(Error::InvalidField {
        field:  "country.name",
        reason: "must not be empty".into(),
      });
    }
    if code.is_empty() {
      return Err(Error::InvalidField {
        field:  "country.code",
        reason: "must not be empty".into(),
      });
    }
    Ok(Self { name: name.to_owned(), code: code.to_owned() })
  }
}

/// Derive the display symbol for a country code.
///
/// A two-letter alphabetic code becomes a regional-indicator flag; anything
/// else degrades to `fallback`.
pub fn flag_symbol(code: &str, fallback: &str) -> String {
  reference::flag(code).unwrap_or_else(|| fallback.to_owned())
}

// ─── Resolution result ───────────────────────────────────────────────────────

/// Outcome of [`CountryResolver::resolve`].
///
/// Only `Persisted` carries a [`CountryId`], so an unsaved country cannot be
/// linked to a movie by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCountry {
  Persisted { country: Country, symbol: String },
  Pending { country: NewCountry, symbol: String },
}

impl ResolvedCountry {
  pub fn name(&self) -> &str {
    match self {
      Self::Persisted { country, .. } => &country.name,
      Self::Pending { country, .. } => &country.name,
    }
  }

  pub fn code(&self) -> &str {
    match self {
      Self::Persisted { country, .. } => &country.code,
      Self::Pending { country, .. } => &country.code,
    }
  }

  pub fn symbol(&self) -> &str {
    match self {
      Self::Persisted { symbol, .. } | Self::Pending { symbol, .. } => symbol,
    }
  }

  /// The stored id, `None` while pending.
  pub fn id(&self) -> Option<CountryId> {
    match self {
      Self::Persisted { country, .. } => Some(country.id),
      Self::Pending { .. } => None,
    }
  }

  fn persisted(country: Country) -> Self {
    let symbol = country.symbol();
    Self::Persisted { country, symbol }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

pub struct CountryResolver<'a, S> {
  store: &'a S,
}

impl<'a, S: CatalogStore> CountryResolver<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Map a free-text name to a canonical country.
  ///
  /// Lookup-miss is not an error: an unrecognised name comes back as
  /// `Pending` with the raw text as both name and code.
  pub async fn resolve(&self, name: &str) -> Result<ResolvedCountry> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::InvalidField {
        field:  "country.name",
        reason: "must not be empty".into(),
      });
    }

    if let Some(country) = self.find(name).await? {
      debug!(name, id = %country.id, "country known locally");
      return Ok(ResolvedCountry::persisted(country));
    }

    let Some(entry) = reference::lookup(name) else {
      warn!(name, "country not in reference table; keeping raw name");
      return Ok(ResolvedCountry::Pending {
        country: NewCountry { name: name.to_owned(), code: name.to_owned() },
        symbol:  name.to_owned(),
      });
    };

    if entry.name != name {
      if let Some(country) = self.find(entry.name).await? {
        debug!(name, canonical = entry.name, id = %country.id, "country known under canonical name");
        return Ok(ResolvedCountry::persisted(country));
      }
    }

    debug!(name, canonical = entry.name, code = entry.alpha2, "country pending");
    Ok(ResolvedCountry::Pending {
      country: NewCountry {
        name: entry.name.to_owned(),
        code: entry.alpha2.to_owned(),
      },
      symbol:  flag_symbol(entry.alpha2, entry.name),
    })
  }

  /// Return the id of a resolved country, inserting it first if pending.
  ///
  /// Re-checks the store by name before inserting, so calling this twice for
  /// the same name yields one row and the same id.
  pub async fn persist_if_new(&self, resolved: &ResolvedCountry) -> Result<CountryId> {
    let pending = match resolved {
      ResolvedCountry::Persisted { country, .. } => return Ok(country.id),
      ResolvedCountry::Pending { country, .. } => country,
    };

    if let Some(existing) = self.find(&pending.name).await? {
      return Ok(existing.id);
    }

    let country = self
      .store
      .add_country(pending.clone())
      .await
      .map_err(Error::store)?;
    info!(name = %country.name, code = %country.code, id = %country.id, "country added");
    Ok(country.id)
  }

  async fn find(&self, name: &str) -> Result<Option<Country>> {
    self
      .store
      .get_country_by_name(name)
      .await
      .map_err(Error::store)
  }
}
