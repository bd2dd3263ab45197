//! Runtime settings, read from `reel.toml` and `REEL_*` environment
//! variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
  pub database_path:     PathBuf,
  /// Empty until configured; metadata lookups then fail with a clear message.
  pub omdb_api_key:      String,
  pub omdb_base_url:     String,
  pub omdb_timeout_secs: u64,
  /// Where generated user pages are written.
  pub site_dir:          PathBuf,
}

impl Settings {
  /// Defaults, overlaid by the file at `path` (if present), overlaid by the
  /// environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let builder = defaults()?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("REEL"));
    build(builder)
  }

  pub fn omdb_timeout(&self) -> Duration { Duration::from_secs(self.omdb_timeout_secs) }
}

fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
  Ok(
    Config::builder()
      .set_default("database_path", "data/movies.sqlite3")?
      .set_default("omdb_api_key", "")?
      .set_default("omdb_base_url", "http://www.omdbapi.com/")?
      .set_default("omdb_timeout_secs", 4_i64)?
      .set_default("site_dir", "static")?,
  )
}

fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Settings> {
  builder
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
