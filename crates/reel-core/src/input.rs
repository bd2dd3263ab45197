//! Validated prompts.
//!
//! Every helper loops until the input is valid, reporting problems through
//! the console, and returns `Ok(None)` when the user types [`CANCEL_TOKEN`].
//! Validation errors never escape this module.

use chrono::Datelike;

use crate::{
  Result,
  console::Console,
  rating::{MAX_SCORE, MIN_SCORE, NoteDirective},
  user::normalize_user_name,
};

/// Typed at any prompt to abandon the current action.
pub const CANCEL_TOKEN: &str = "..";

/// Typed at the note prompt of an update to clear the note.
pub const DELETE_KEYWORD: &str = "DELETE";

fn ask(console: &mut impl Console, prompt: &str) -> Result<Option<String>> {
  let line = console.read_line(prompt)?;
  let line = line.trim().to_owned();
  Ok((line != CANCEL_TOKEN).then_some(line))
}

/// A non-empty line of text, e.g. a movie title.
pub fn read_text(console: &mut impl Console, prompt: &str, what: &str) -> Result<Option<String>> {
  loop {
    let Some(text) = ask(console, prompt)? else { return Ok(None) };
    if text.is_empty() {
      console.error(&format!("{what} should not be empty!"));
      continue;
    }
    return Ok(Some(text));
  }
}

/// A rating in `[0, 10]`. With `allow_blank`, an empty line yields
/// `Some(None)`.
pub fn read_rating(
  console: &mut impl Console,
  prompt: &str,
  allow_blank: bool,
) -> Result<Option<Option<f64>>> {
  loop {
    let Some(text) = ask(console, prompt)? else { return Ok(None) };
    if text.is_empty() && allow_blank {
      return Ok(Some(None));
    }
    match text.parse::<f64>() {
      Ok(value) if (MIN_SCORE..=MAX_SCORE).contains(&value) => return Ok(Some(Some(value))),
      Ok(_) => console.error("Rating must be between 0 and 10 (inclusive)."),
      Err(_) => console.error("Invalid input"),
    }
  }
}

/// The current calendar year in local time.
pub fn current_year() -> i32 { chrono::Local::now().year() }

/// A release year no later than `current_year`. With `allow_blank`, an
/// empty line yields `Some(None)`.
pub fn read_year(
  console: &mut impl Console,
  prompt: &str,
  allow_blank: bool,
  current_year: i32,
) -> Result<Option<Option<i32>>> {
  loop {
    let Some(text) = ask(console, prompt)? else { return Ok(None) };
    if text.is_empty() && allow_blank {
      return Ok(Some(None));
    }
    match text.parse::<i32>() {
      Ok(year) if year > current_year => console.error("Year should not lie in the future."),
      Ok(year) if year > 0 => return Ok(Some(Some(year))),
      _ => console.error("Invalid input"),
    }
  }
}

/// Whether the note prompt belongs to a new rating or an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteMode {
  Add,
  Update,
}

/// Read a note and decide its directive.
///
/// On update, blank keeps the stored note and [`DELETE_KEYWORD`] clears it.
/// On add, blank means no note.
pub fn read_note(console: &mut impl Console, mode: NoteMode) -> Result<Option<NoteDirective>> {
  let mut prompt = String::from("Here you can add a note for the movie...\n");
  match mode {
    NoteMode::Update => prompt.push_str(" - leave empty to keep existing note\n"),
    NoteMode::Add => prompt.push_str(" - leave empty to skip\n"),
  }
  prompt.push_str(" - type '..' to cancel and go back to the menu\n");
  if mode == NoteMode::Update {
    prompt.push_str(" - type 'DELETE' (all uppercase) to delete a previous note\n");
  }
  prompt.push_str("Enter your note here: ");

  let Some(text) = ask(console, &prompt)? else { return Ok(None) };
  let directive = match mode {
    NoteMode::Update if text.is_empty() => NoteDirective::Keep,
    NoteMode::Update if text == DELETE_KEYWORD => NoteDirective::Delete,
    _ => NoteDirective::SetTo(text),
  };
  Ok(Some(directive))
}

/// A 1-based choice among `count` entries, returned 0-based.
pub fn read_selection(console: &mut impl Console, prompt: &str, count: usize) -> Result<Option<usize>> {
  let range = if count == 1 { "1".to_owned() } else { format!("1-{count}") };
  let prompt = format!("\n{prompt} ({range}): ");
  loop {
    let Some(text) = ask(console, &prompt)? else { return Ok(None) };
    match text.parse::<usize>() {
      Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
      _ => console.error("Invalid choice"),
    }
  }
}

/// Where the most recent movies go when sorting by year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
  LatestFirst,
  LatestLast,
}

pub fn read_sort_order(console: &mut impl Console) -> Result<Option<SortOrder>> {
  let prompt = "\nDo you want to see the latest movies first or last?\nEnter 'first' or 'last': ";
  loop {
    let Some(text) = ask(console, prompt)? else { return Ok(None) };
    match text.to_lowercase().as_str() {
      "first" => return Ok(Some(SortOrder::LatestFirst)),
      "last" => return Ok(Some(SortOrder::LatestLast)),
      _ => console.error("Invalid input"),
    }
  }
}

/// `y`/`yes` or `n`/`no`, case-insensitive.
pub fn confirm(console: &mut impl Console, prompt: &str) -> Result<Option<bool>> {
  loop {
    let Some(text) = ask(console, prompt)? else { return Ok(None) };
    match text.to_lowercase().as_str() {
      "y" | "yes" => return Ok(Some(true)),
      "n" | "no" => return Ok(Some(false)),
      _ => console.error("Please answer 'y' or 'n'."),
    }
  }
}

/// A user name, lowercased.
pub fn read_user_name(console: &mut impl Console) -> Result<Option<String>> {
  loop {
    let Some(text) = ask(console, "Enter your username or '..' to cancel: ")? else {
      return Ok(None);
    };
    match normalize_user_name(&text) {
      Ok(name) => return Ok(Some(name)),
      Err(crate::Error::InvalidField { reason, .. }) => console.error(&format!("Username {reason}!")),
      Err(err) => return Err(err),
    }
  }
}

/// A non-empty password, read without echo.
pub fn read_password(console: &mut impl Console, prompt: &str) -> Result<Option<String>> {
  let prompt = format!("{prompt} or '..' to cancel: ");
  loop {
    let secret = console.read_secret(&prompt)?;
    if secret == CANCEL_TOKEN {
      return Ok(None);
    }
    if secret.is_empty() {
      console.error("Password should not be empty!");
      continue;
    }
    return Ok(Some(secret));
  }
}
