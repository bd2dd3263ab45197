//! Static HTML page listing one user's ratings.

use std::{
  fmt::Write as _,
  fs,
  io,
  path::{Path, PathBuf},
};

use reel_core::{library, movie::RatedMovie};

const TEMPLATE: &str = include_str!("../templates/page.html");
const PLACEHOLDER_TITLE: &str = "__TEMPLATE_TITLE__";
const PLACEHOLDER_GRID: &str = "        __TEMPLATE_MOVIE_GRID__";

const INDENT: &str = "    ";
const IMDB_URL: &str = "https://imdb.com/title/";
const DUMMY_POSTER_URL: &str =
  "https://images.template.net/wp-content/uploads/2017/02/17221912/Printable-Blank-Movie-Poster.jpg";

/// Render the page for `user_name`: best rated first, newest first among
/// equal ratings.
pub fn render_page(user_name: &str, movies: &[RatedMovie]) -> String {
  let mut sorted: Vec<&RatedMovie> = movies.iter().collect();
  sorted.sort_by(|a, b| library::by_rating_then_year(a, b));

  let grid: String = sorted.iter().map(|m| movie_item(m) + "\n").collect();
  let title = escape(&format!("{user_name}'s movie ratings"));

  TEMPLATE.replace(PLACEHOLDER_TITLE, &title).replace(PLACEHOLDER_GRID, &grid)
}

/// Write `<dir>/<user_name>.html`, creating `dir` if needed.
pub fn write_page(dir: &Path, user_name: &str, movies: &[RatedMovie]) -> io::Result<PathBuf> {
  fs::create_dir_all(dir)?;
  let path = dir.join(format!("{user_name}.html"));
  fs::write(&path, render_page(user_name, movies))?;
  tracing::info!(path = %path.display(), movies = movies.len(), "website written");
  Ok(path)
}

fn movie_item(rated: &RatedMovie) -> String {
  let movie = &rated.movie;
  let poster = movie.image_url.as_deref().unwrap_or(DUMMY_POSTER_URL);
  let flags: String = rated.countries.iter().map(|c| numeric_entities(&c.symbol())).collect();
  let i2 = INDENT.repeat(2);
  let i3 = INDENT.repeat(3);
  let i4 = INDENT.repeat(4);

  let mut out = String::new();
  let _ = write!(out, "{i2}<li>");
  let _ = write!(
    out,
    "\n{i3}<div class=\"movie\"><a href=\"{IMDB_URL}{}\" title=\"{}\" target=\"_blank\">",
    escape(movie.external_id.as_str()),
    escape(&rated.note)
  );
  let _ = write!(out, "\n{i4}<img class=\"movie-poster\" src=\"{}\"/></a>", escape(poster));
  let _ = write!(out, "\n{i4}<div class=\"movie-title\">{}</div>", escape(&movie.title));
  let _ = write!(out, "\n{i4}<div class=\"movie-year\">{}</div>", rated.year_label());
  let _ = write!(out, "\n{i4}<div class=\"rating\">{}</div>", rated.rating);
  let _ = write!(out, "\n{i4}<div class=\"rating\">{flags}</div>");
  let _ = write!(out, "\n{i3}</div>");
  let _ = write!(out, "\n{i2}</li>");
  out
}

/// Non-ASCII symbols (flag emojis) as `&#NNN;` entities. ASCII fallbacks
/// such as a bare country code render as nothing.
fn numeric_entities(symbol: &str) -> String {
  if symbol.is_ascii() {
    return String::new();
  }
  symbol.chars().map(|c| format!("&#{};", c as u32)).collect()
}

fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}
