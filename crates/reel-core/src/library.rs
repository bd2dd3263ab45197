//! Queries over one user's rated movies: statistics, ordering, filtering.

use std::cmp::Ordering;

use crate::{fuzzy, input::SortOrder, movie::RatedMovie};

/// Fuzzy suggestion parameters used wherever the user names a rated movie.
pub const SUGGESTION_LIMIT: usize = 4;
pub const SUGGESTION_CUTOFF: f64 = 0.3;

/// `Title (year) - 8.5 - 🇺🇸 🇬🇧`
pub fn entry_line(movie: &RatedMovie) -> String {
  let flags: Vec<String> = movie.countries.iter().map(|c| c.symbol()).collect();
  format!(
    "{} ({}) - {} - {}",
    movie.movie.title,
    movie.year_label(),
    movie.rating,
    flags.join(" ")
  )
}

fn round1(value: f64) -> f64 { (value * 10.0).round() / 10.0 }

// ─── Stats ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Stats<'a> {
  pub average: f64,
  pub median:  f64,
  /// Every movie sharing the top rating, in input order.
  pub best:    Vec<&'a RatedMovie>,
  /// Every movie sharing the bottom rating, in input order.
  pub worst:   Vec<&'a RatedMovie>,
}

/// `None` for an empty library.
pub fn stats(movies: &[RatedMovie]) -> Option<Stats<'_>> {
  if movies.is_empty() {
    return None;
  }
  let mut ratings: Vec<f64> = movies.iter().map(|m| m.rating.value()).collect();
  let average = ratings.iter().sum::<f64>() / ratings.len() as f64;

  ratings.sort_by(f64::total_cmp);
  let mid = ratings.len() / 2;
  let median = if ratings.len() % 2 == 0 {
    (ratings[mid - 1] + ratings[mid]) / 2.0
  } else {
    ratings[mid]
  };

  let top = ratings[ratings.len() - 1];
  let bottom = ratings[0];
  let with = |r: f64| movies.iter().filter(|m| m.rating.value() == r).collect::<Vec<_>>();

  Some(Stats {
    average: round1(average),
    median:  round1(median),
    best:    with(top),
    worst:   with(bottom),
  })
}

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Highest rating first; ties keep their order.
pub fn sort_by_rating(movies: &mut [RatedMovie]) {
  movies.sort_by(|a, b| b.rating.value().total_cmp(&a.rating.value()));
}

/// Chronological order. Unknown years sort as the oldest.
pub fn sort_by_year(movies: &mut [RatedMovie], order: SortOrder) {
  movies.sort_by(|a, b| match order {
    SortOrder::LatestFirst => b.movie.year.cmp(&a.movie.year),
    SortOrder::LatestLast => a.movie.year.cmp(&b.movie.year),
  });
}

// ─── Filtering ───────────────────────────────────────────────────────────────

/// Optional bounds; `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Filter {
  pub min_rating: Option<f64>,
  pub start_year: Option<i32>,
  pub end_year:   Option<i32>,
}

impl Filter {
  pub fn matches(&self, movie: &RatedMovie) -> bool {
    if self.min_rating.is_some_and(|min| movie.rating.value() < min) {
      return false;
    }
    let year_bounded = self.start_year.is_some() || self.end_year.is_some();
    match movie.movie.year {
      None => !year_bounded,
      Some(year) => {
        self.start_year.is_none_or(|start| year >= start)
          && self.end_year.is_none_or(|end| year <= end)
      }
    }
  }

  /// Matching movies, newest first.
  pub fn apply<'a>(&self, movies: &'a [RatedMovie]) -> Vec<&'a RatedMovie> {
    let mut out: Vec<_> = movies.iter().filter(|m| self.matches(m)).collect();
    out.sort_by(|a, b| b.movie.year.cmp(&a.movie.year));
    out
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Rated movies whose title resembles `query`, via [`fuzzy::top_matches`].
pub fn suggestions<'a>(movies: &'a [RatedMovie], query: &str) -> Vec<&'a RatedMovie> {
  let titles = movies.iter().map(|m| (m, m.movie.title.clone()));
  fuzzy::top_matches(query, titles, SUGGESTION_LIMIT, SUGGESTION_CUTOFF)
    .into_iter()
    .map(|(m, _)| m)
    .collect()
}

/// Best rating first, then most recent.
pub fn by_rating_then_year(a: &RatedMovie, b: &RatedMovie) -> Ordering {
  b.rating
    .value()
    .total_cmp(&a.rating.value())
    .then_with(|| b.movie.year.cmp(&a.movie.year))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    country::{Country, CountryId},
    movie::{ExternalId, Movie, MovieId},
    rating::Score,
  };

  fn rated(id: i64, title: &str, year: Option<i32>, rating: f64) -> RatedMovie {
    RatedMovie {
      movie:     Movie {
        id:              MovieId(id),
        external_id:     ExternalId::new(format!("tt{id:07}")).unwrap(),
        title:           title.into(),
        year,
        image_url:       None,
        external_rating: None,
      },
      rating:    Score::new(rating).unwrap(),
      note:      String::new(),
      countries: Vec::new(),
    }
  }

  fn library() -> Vec<RatedMovie> {
    vec![
      rated(1, "The Matrix", Some(1999), 9.0),
      rated(2, "Matrix Reloaded", Some(2003), 6.5),
      rated(3, "Airplane", Some(1980), 9.0),
      rated(4, "Heat", Some(1995), 5.0),
    ]
  }

  #[test]
  fn stats_round_and_keep_ties() {
    let movies = library();
    let stats = stats(&movies).unwrap();
    assert_eq!(stats.average, 7.4);
    assert_eq!(stats.median, 7.8);
    let best: Vec<_> = stats.best.iter().map(|m| m.movie.title.as_str()).collect();
    assert_eq!(best, vec!["The Matrix", "Airplane"]);
    assert_eq!(stats.worst.len(), 1);
    assert_eq!(stats.worst[0].movie.title, "Heat");
  }

  #[test]
  fn stats_of_nothing_is_none() {
    assert!(stats(&[]).is_none());
  }

  #[test]
  fn sorts_are_stable() {
    let mut movies = library();
    sort_by_rating(&mut movies);
    let ids: Vec<_> = movies.iter().map(|m| m.movie.id.0).collect();
    assert_eq!(ids, vec![1, 3, 2, 4]);

    sort_by_year(&mut movies, SortOrder::LatestLast);
    let ids: Vec<_> = movies.iter().map(|m| m.movie.id.0).collect();
    assert_eq!(ids, vec![3, 4, 1, 2]);
  }

  #[test]
  fn filter_bounds_are_inclusive() {
    let mut movies = library();
    movies.push(rated(5, "Unknown Year", None, 8.0));

    let filter = Filter { min_rating: Some(6.5), start_year: Some(1980), end_year: Some(2003) };
    let ids: Vec<_> = filter.apply(&movies).iter().map(|m| m.movie.id.0).collect();
    assert_eq!(ids, vec![2, 1, 3]);

    let unbounded = Filter::default().apply(&movies);
    assert_eq!(unbounded.len(), 5);
  }

  #[test]
  fn suggestions_for_a_typo() {
    let movies = library();
    let hints: Vec<_> = suggestions(&movies, "Matirx").iter().map(|m| m.movie.id.0).collect();
    assert!(hints.contains(&1));
    assert!(!hints.contains(&3));
  }

  #[test]
  fn entry_line_shows_flags() {
    let mut movie = rated(1, "Inception", Some(2010), 9.0);
    movie.countries = vec![
      Country { id: CountryId(1), name: "United Kingdom".into(), code: "GB".into() },
      Country { id: CountryId(2), name: "United States".into(), code: "US".into() },
    ];
    assert_eq!(entry_line(&movie), "Inception (2010) - 9.0 - 🇬🇧 🇺🇸");
  }
}
