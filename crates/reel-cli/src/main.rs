//! `reel`: rate movies from the terminal.
//!
//! Reads `reel.toml` (or the path given with `--config`), opens the SQLite
//! catalog, and runs the interactive menu. Movie metadata comes from OMDb;
//! set `omdb_api_key` in the config file or `REEL_OMDB_API_KEY`.
//!
//! # Usage
//!
//! ```
//! reel
//! reel --config ~/.config/reel/reel.toml --database ~/movies.sqlite3
//! reel --hash-password
//! ```

mod app;
mod auth;
mod client;
mod error;
mod settings;
mod site;
mod terminal;

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
};

use anyhow::Context as _;
use app::App;
use clap::Parser;
use client::{OmdbClient, OmdbConfig};
use reel_store_sqlite::SqliteStore;
use settings::{Settings, expand_tilde};
use terminal::TerminalConsole;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reel", version, about = "Rate and browse movies")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "reel.toml")]
  config: PathBuf,

  /// Database file; overrides `database_path` from the config.
  #[arg(long, value_name = "FILE")]
  database: Option<PathBuf>,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so they stay out of the menu.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password_line()?;
    println!("{}", auth::hash_password(&password)?);
    return Ok(());
  }

  let mut settings = Settings::load(&cli.config)?;
  if let Some(database) = cli.database {
    settings.database_path = database;
  }

  let database_path = expand_tilde(&settings.database_path);
  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open catalog at {database_path:?}"))?;

  let metadata = OmdbClient::new(OmdbConfig {
    api_key:  settings.omdb_api_key.clone(),
    base_url: settings.omdb_base_url.clone(),
    timeout:  settings.omdb_timeout(),
  })
  .context("failed to build OMDb client")?;

  let site_dir = expand_tilde(&settings.site_dir);
  let mut app = App::new(store, metadata, TerminalConsole::new(), site_dir)
    .await
    .context("failed to start session")?;
  app.run().await?;

  Ok(())
}

fn read_password_line() -> anyhow::Result<String> {
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
