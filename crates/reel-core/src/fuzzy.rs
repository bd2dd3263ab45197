//! Title similarity.
//!
//! [`ratio`] is the Ratcliff/Obershelp "gestalt" score: twice the number of
//! characters in recursively found longest common blocks, over the combined
//! length. It rewards shared runs of characters rather than counting edits.

/// Similarity in `[0, 1]`. Identical strings (including two empty ones)
/// score 1.0; strings with no character in common score 0.0.
pub fn ratio(a: &str, b: &str) -> f64 {
  let a: Vec<char> = a.chars().collect();
  let b: Vec<char> = b.chars().collect();
  let total = a.len() + b.len();
  if total == 0 {
    return 1.0;
  }
  let matched = matching_chars(&a, &b);
  2.0 * matched as f64 / total as f64
}

/// Sum of the sizes of all matching blocks.
fn matching_chars(a: &[char], b: &[char]) -> usize {
  let mut queue = vec![(0, a.len(), 0, b.len())];
  let mut total = 0;
  while let Some((alo, ahi, blo, bhi)) = queue.pop() {
    let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
    if size == 0 {
      continue;
    }
    total += size;
    if alo < i && blo < j {
      queue.push((alo, i, blo, j));
    }
    if i + size < ahi && j + size < bhi {
      queue.push((i + size, ahi, j + size, bhi));
    }
  }
  total
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`. Ties resolve to
/// the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
  a: &[char],
  b: &[char],
  alo: usize,
  ahi: usize,
  blo: usize,
  bhi: usize,
) -> (usize, usize, usize) {
  let (mut best_i, mut best_j, mut best) = (alo, blo, 0);
  // lengths[j] = length of the common run ending at a[i-1], b[j-1]
  let mut prev = vec![0usize; bhi - blo + 1];
  for i in alo..ahi {
    let mut row = vec![0usize; bhi - blo + 1];
    for j in blo..bhi {
      if a[i] == b[j] {
        let k = prev[j - blo] + 1;
        row[j - blo + 1] = k;
        if k > best {
          best = k;
          best_i = i + 1 - k;
          best_j = j + 1 - k;
        }
      }
    }
    prev = row;
  }
  (best_i, best_j, best)
}

/// Candidates whose similarity to `query` is at least `cutoff`, in input
/// order.
///
/// The collection stops once it holds more than `limit` entries, so up to
/// `limit + 1` matches can come back.
pub fn top_matches<K, I>(query: &str, candidates: I, limit: usize, cutoff: f64) -> Vec<(K, String)>
where
  I: IntoIterator<Item = (K, String)>,
{
  let mut matches = Vec::new();
  for (key, text) in candidates {
    if matches.len() > limit {
      break;
    }
    if ratio(query, &text) >= cutoff {
      matches.push((key, text));
    }
  }
  matches
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

  #[test]
  fn ratio_extremes() {
    assert!(close(ratio("matrix", "matrix"), 1.0));
    assert!(close(ratio("", ""), 1.0));
    assert!(close(ratio("abc", "xyz"), 0.0));
    assert!(close(ratio("abc", ""), 0.0));
  }

  #[test]
  fn ratio_matches_gestalt_scores() {
    // "abcd" / "bcde": one block "bcd" -> 2*3/8
    assert!(close(ratio("abcd", "bcde"), 0.75));
    // "Matrix" inside "The Matrix": 2*6/16
    assert!(close(ratio("Matrix", "The Matrix"), 0.75));
    // blocks "a" and "c" once "b" is out of order
    assert!(close(ratio("abc", "acb"), 2.0 * 2.0 / 6.0));
  }

  #[test]
  fn matrix_titles_match_and_airplane_does_not() {
    let candidates = vec![
      ("A", "The Matrix".to_owned()),
      ("B", "Matrix Reloaded".to_owned()),
      ("C", "Airplane".to_owned()),
    ];
    let found = top_matches("Matrix", candidates, 4, 0.3);
    let keys: Vec<_> = found.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec!["A", "B"]);
  }

  #[test]
  fn top_matches_admits_one_past_limit() {
    let candidates = (0..10).map(|i| (i, format!("Alien {i}")));
    let found = top_matches("Alien", candidates, 2, 0.3);
    assert_eq!(found.len(), 3);
    assert_eq!(found.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![0, 1, 2]);
  }

  #[test]
  fn nothing_above_cutoff_is_empty() {
    let found = top_matches("zzz", vec![(1, "Heat".to_owned())], 4, 0.3);
    assert!(found.is_empty());
  }
}
