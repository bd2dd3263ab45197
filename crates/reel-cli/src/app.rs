//! The interactive menu: gating, dispatch, and one method per action.

use std::path::PathBuf;

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use rand::seq::SliceRandom;
use reel_core::{
  Error as CoreError, MetadataError,
  console::{Console, Tone},
  input::{self, NoteMode},
  library::{self, Filter},
  metadata::MetadataSource,
  movie::RatedMovie,
  rating::{NoteDirective, RatingEngine},
  resolve::{CatalogResolver, Origin, Resolution},
  store::CatalogStore,
  user::{NewUser, Session},
};
use strum::{EnumIter, FromRepr, IntoEnumIterator};
use tracing::{debug, warn};

use crate::{
  auth,
  error::{Error, Result},
  site,
};

// ─── Menu ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, FromRepr)]
#[repr(u8)]
pub enum MenuEntry {
  Exit = 0,
  List,
  Add,
  Delete,
  Update,
  Stats,
  Random,
  Search,
  SortByRating,
  SortByYear,
  Filter,
  Website,
  Login,
}

impl MenuEntry {
  pub fn label(self) -> &'static str {
    match self {
      Self::Exit => "Exit",
      Self::List => "List my movies",
      Self::Add => "Add movie rating",
      Self::Delete => "Delete movie rating",
      Self::Update => "Update movie rating",
      Self::Stats => "Stats",
      Self::Random => "Random movie",
      Self::Search => "Search movie",
      Self::SortByRating => "Sort movies by rating",
      Self::SortByYear => "Sort movies by year",
      Self::Filter => "Filter movies",
      Self::Website => "Generate website",
      Self::Login => "Log in / Switch user",
    }
  }

  fn line(self) -> String { format!("{:>2}. {}", self as u8, self.label()) }
}

/// Which menu entries the current session may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  /// Nobody logged in.
  NeedsLogin,
  /// Logged in, no ratings yet.
  NeedsRating,
  Full,
}

impl Access {
  pub fn allows(self, entry: MenuEntry) -> bool {
    match self {
      Access::Full => true,
      Access::NeedsRating => {
        matches!(entry, MenuEntry::Exit | MenuEntry::Add | MenuEntry::Login)
      }
      Access::NeedsLogin => matches!(entry, MenuEntry::Exit | MenuEntry::Login),
    }
  }

  fn hint(self) -> &'static str {
    match self {
      Access::NeedsLogin => "Please login to use this function.",
      _ => "Add a movie rating to enable this function.",
    }
  }

  fn choice_prompt(self) -> String {
    let choices = match self {
      Access::Full => "0-12".to_owned(),
      gated => {
        let enabled: Vec<String> = MenuEntry::iter()
          .filter(|e| gated.allows(*e))
          .map(|e| (e as u8).to_string())
          .collect();
        enabled.join(", ")
      }
    };
    format!("\nEnter choice ({choices}): ")
  }
}

enum Flow {
  Continue,
  Exit,
}

// ─── App ─────────────────────────────────────────────────────────────────────

pub struct App<S, M, C> {
  store:    S,
  metadata: M,
  console:  C,
  session:  Session,
  site_dir: PathBuf,
}

impl<S, M, C> App<S, M, C>
where
  S: CatalogStore,
  M: MetadataSource,
  C: Console,
{
  /// Start a session as the default user.
  pub async fn new(store: S, metadata: M, console: C, site_dir: PathBuf) -> Result<Self> {
    let user = store.default_user().await.map_err(CoreError::store)?;
    Ok(Self { store, metadata, console, session: Session::new(user), site_dir })
  }

  /// Run the menu until the user exits or input ends. Other errors are
  /// reported and the loop carries on.
  pub async fn run(&mut self) -> Result<()> {
    loop {
      match self.step().await {
        Ok(Flow::Continue) => {}
        Ok(Flow::Exit) => return Ok(()),
        Err(e) if e.is_end_of_input() => {
          self.console.info("\nBye!");
          return Ok(());
        }
        Err(e) => report(&mut self.console, &e),
      }
    }
  }

  async fn step(&mut self) -> Result<Flow> {
    // Without a rating count only login and exit stay reachable.
    let (access, failure) = match self.access().await {
      Ok(access) => (access, None),
      Err(e) => (Access::NeedsLogin, Some(e)),
    };
    self.console.clear();
    self.show_menu(access, None);
    if let Some(e) = failure {
      report(&mut self.console, &e);
    }

    let line = self.console.read_line(&access.choice_prompt()).map_err(CoreError::from)?;
    let entry = line.trim().parse::<u8>().ok().and_then(MenuEntry::from_repr);
    let Some(entry) = entry else {
      self.console.error("\nInvalid choice");
      self.pause()?;
      return Ok(Flow::Continue);
    };

    self.console.clear();
    self.show_menu(access, Some(entry));

    if entry == MenuEntry::Exit {
      self.console.info("\nBye!");
      return Ok(Flow::Exit);
    }
    if !access.allows(entry) {
      self.console.error(access.hint());
      self.pause()?;
      return Ok(Flow::Continue);
    }

    debug!(?entry, user = %self.session.user().user_name, "dispatch");
    if let Err(e) = self.dispatch(entry).await {
      if e.is_end_of_input() {
        return Err(e);
      }
      report(&mut self.console, &e);
    }
    self.pause()?;
    Ok(Flow::Continue)
  }

  async fn access(&self) -> Result<Access> {
    if self.session.is_anonymous() {
      return Ok(Access::NeedsLogin);
    }
    let count = self
      .store
      .count_ratings(self.session.user_id())
      .await
      .map_err(CoreError::store)?;
    Ok(if count == 0 { Access::NeedsRating } else { Access::Full })
  }

  fn show_menu(&mut self, access: Access, active: Option<MenuEntry>) {
    self.console.print(Tone::Plain, "********** My Movies Database **********");
    let name = self.session.user().user_name.clone();
    self.console.output(&format!("Currently logged in: {name}\n"));
    self.console.print(Tone::Plain, "Menu:");
    for entry in MenuEntry::iter() {
      let tone = if !access.allows(entry) {
        Tone::Inactive
      } else if active == Some(entry) && entry != MenuEntry::Exit {
        Tone::Active
      } else {
        Tone::Plain
      };
      self.console.print(tone, &entry.line());
    }
  }

  fn pause(&mut self) -> Result<()> {
    self
      .console
      .read_line("\nPress enter key to continue.")
      .map_err(CoreError::from)?;
    Ok(())
  }

  async fn dispatch(&mut self, entry: MenuEntry) -> Result<()> {
    match entry {
      MenuEntry::Exit => Ok(()),
      MenuEntry::List => self.list_movies().await,
      MenuEntry::Add => self.add_rating().await,
      MenuEntry::Delete => self.delete_rating().await,
      MenuEntry::Update => self.update_rating().await,
      MenuEntry::Stats => self.show_stats().await,
      MenuEntry::Random => self.random_movie().await,
      MenuEntry::Search => self.search_movies().await,
      MenuEntry::SortByRating => self.sort_by_rating().await,
      MenuEntry::SortByYear => self.sort_by_year().await,
      MenuEntry::Filter => self.filter_movies().await,
      MenuEntry::Website => self.generate_website().await,
      MenuEntry::Login => self.log_in().await,
    }
  }

  async fn rated(&self) -> Result<Vec<RatedMovie>> {
    let movies = self
      .store
      .rated_movies(self.session.user_id())
      .await
      .map_err(CoreError::store)?;
    Ok(movies)
  }

  fn print_entries<'m>(&mut self, movies: impl IntoIterator<Item = &'m RatedMovie>) {
    for movie in movies {
      self.console.output(&library::entry_line(movie));
    }
  }

  // ── Actions ───────────────────────────────────────────────────────────

  async fn list_movies(&mut self) -> Result<()> {
    let movies = self.rated().await?;
    self.console.output(&format!("\n{} movies in total:\n", movies.len()));
    self.print_entries(&movies);
    Ok(())
  }

  async fn add_rating(&mut self) -> Result<()> {
    let user_id = self.session.user_id();
    let prompt = "\nEnter the movie name or '..' to cancel: ";
    let Some(title) = input::read_text(&mut self.console, prompt, "Movie name")? else {
      cancelled(&mut self.console);
      return Ok(());
    };

    let resolution = CatalogResolver::new(&self.store, &self.metadata)
      .resolve(&mut self.console, &title)
      .await?;
    let movie = match resolution {
      Resolution::Resolved(movie) => movie,
      Resolution::NoRemoteMatch => return Ok(()),
      Resolution::Cancelled => {
        cancelled(&mut self.console);
        return Ok(());
      }
    };
    if movie.origin == Origin::Local {
      self.console.info(&format!(
        "Found movie '{} ({})' in the database.",
        movie.title, movie.external_id
      ));
    }

    let engine = RatingEngine::new(&self.store);
    if engine.has_rating(user_id, movie.movie_id).await? {
      self.console.error(&format!("You already rated '{}'!", movie.title));
      return Ok(());
    }

    let prompt = "Enter the movie rating (0-10) or '..' to cancel: ";
    let Some(Some(rating)) = input::read_rating(&mut self.console, prompt, false)? else {
      cancelled(&mut self.console);
      return Ok(());
    };
    let Some(note) = input::read_note(&mut self.console, NoteMode::Add)? else {
      cancelled(&mut self.console);
      return Ok(());
    };
    let note = match note {
      NoteDirective::SetTo(text) => text,
      NoteDirective::Keep | NoteDirective::Delete => String::new(),
    };

    engine.add_rating(user_id, movie.movie_id, rating, &note).await?;
    self
      .console
      .info(&format!("Successfully added rating for movie '{}'.", movie.title));
    if note.is_empty() {
      self.console.info("No note has been added.");
    } else {
      self.console.info("Note for the movie's rating has been added.");
    }
    Ok(())
  }

  /// Let the user pick one of their rated movies by (part of) its title.
  fn pick_rated(&mut self, movies: &[RatedMovie]) -> Result<Option<RatedMovie>> {
    let prompt = "\nEnter movie name, a part of it or '..' to cancel: ";
    let what = "Movie name or part of it";
    let Some(term) = input::read_text(&mut self.console, prompt, what)? else {
      cancelled(&mut self.console);
      return Ok(None);
    };

    let matches = library::suggestions(movies, &term);
    if matches.is_empty() {
      self
        .console
        .info(&format!("A movie containing '{term}' could not be found."));
      return Ok(None);
    }

    self.console.output(&format!("\nMovies matching search term '{term}':"));
    for (i, movie) in matches.iter().enumerate() {
      self
        .console
        .output(&format!("{:>3}: {}", i + 1, library::entry_line(movie)));
    }
    let Some(index) = input::read_selection(&mut self.console, "Please select a movie", matches.len())?
    else {
      cancelled(&mut self.console);
      return Ok(None);
    };
    Ok(Some(matches[index].clone()))
  }

  async fn delete_rating(&mut self) -> Result<()> {
    let movies = self.rated().await?;
    let Some(chosen) = self.pick_rated(&movies)? else { return Ok(()) };

    let title = &chosen.movie.title;
    let removed = RatingEngine::new(&self.store)
      .delete_rating(self.session.user_id(), chosen.movie.id)
      .await?;
    if removed {
      self.console.info(&format!("Rating for '{title}' successfully deleted"));
    } else {
      self.console.info(&format!("There was no rating for '{title}' to delete."));
    }
    Ok(())
  }

  async fn update_rating(&mut self) -> Result<()> {
    let movies = self.rated().await?;
    let Some(chosen) = self.pick_rated(&movies)? else { return Ok(()) };

    let prompt = "Enter the movie rating (0-10), leave empty\nto keep previous rating or type '..' to cancel: ";
    let Some(rating) = input::read_rating(&mut self.console, prompt, true)? else {
      cancelled(&mut self.console);
      return Ok(());
    };
    let Some(note) = input::read_note(&mut self.console, NoteMode::Update)? else {
      cancelled(&mut self.console);
      return Ok(());
    };
    let note_msg = match note {
      NoteDirective::Keep => "Note for the movie's rating has been left unchanged.",
      NoteDirective::Delete => "Note for the movie's rating has been deleted.",
      NoteDirective::SetTo(_) => "Note for the movie's rating has been updated.",
    };

    let updated = RatingEngine::new(&self.store)
      .update_rating(self.session.user_id(), chosen.movie.id, rating, note)
      .await?;
    match rating {
      None => self
        .console
        .info(&format!("Leave previous rating of '{}' unchanged.", updated.rating)),
      Some(_) => self.console.info(&format!("Change rating to '{}'.", updated.rating)),
    }
    self.console.info(&format!(
      "Successfully updated rating entry for '{}'.",
      chosen.movie.title
    ));
    self.console.info(note_msg);
    Ok(())
  }

  async fn show_stats(&mut self) -> Result<()> {
    let movies = self.rated().await?;
    let Some(stats) = library::stats(&movies) else {
      self.console.info("No movies rated yet.");
      return Ok(());
    };
    let joined = |list: &[&RatedMovie]| {
      list
        .iter()
        .map(|m| library::entry_line(m))
        .collect::<Vec<_>>()
        .join(" | ")
    };
    self.console.output(&format!("\nAverage rating: {:.1}", stats.average));
    self.console.output(&format!("Median rating: {:.1}", stats.median));
    self.console.output(&format!("Best movie(s): {}", joined(&stats.best)));
    self.console.output(&format!("Worst movie(s): {}", joined(&stats.worst)));
    Ok(())
  }

  async fn random_movie(&mut self) -> Result<()> {
    let movies = self.rated().await?;
    let Some(pick) = movies.choose(&mut rand::thread_rng()) else {
      self.console.info("No movies rated yet.");
      return Ok(());
    };
    let flags: Vec<String> = pick.countries.iter().map(|c| c.symbol()).collect();
    self.console.output(&format!(
      "\nYour movie for tonight: {} ({}) - {}, it's rated {}",
      pick.movie.title,
      pick.year_label(),
      flags.join(" "),
      pick.rating
    ));
    Ok(())
  }

  async fn search_movies(&mut self) -> Result<()> {
    let movies = self.rated().await?;
    let prompt = "\nEnter movie name, a part of it or '..' to cancel: ";
    let what = "Movie name or part of it";
    let Some(term) = input::read_text(&mut self.console, prompt, what)? else {
      cancelled(&mut self.console);
      return Ok(());
    };

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut found: Vec<(i64, &RatedMovie)> = movies
      .iter()
      .filter_map(|m| matcher.fuzzy_match(&m.movie.title, &term).map(|score| (score, m)))
      .collect();
    found.sort_by(|a, b| b.0.cmp(&a.0));

    if !found.is_empty() {
      self.print_entries(found.into_iter().map(|(_, m)| m));
      return Ok(());
    }

    self
      .console
      .info(&format!("A movie containing '{term}' could not be found."));
    let hints = library::suggestions(&movies, &term);
    if !hints.is_empty() {
      self.console.output("\nDid you mean:\n");
      self.print_entries(hints);
    }
    Ok(())
  }

  async fn sort_by_rating(&mut self) -> Result<()> {
    let mut movies = self.rated().await?;
    library::sort_by_rating(&mut movies);
    self.console.output("");
    self.print_entries(&movies);
    Ok(())
  }

  async fn sort_by_year(&mut self) -> Result<()> {
    let Some(order) = input::read_sort_order(&mut self.console)? else {
      cancelled(&mut self.console);
      return Ok(());
    };
    let mut movies = self.rated().await?;
    library::sort_by_year(&mut movies, order);
    self.console.output("");
    self.print_entries(&movies);
    Ok(())
  }

  async fn filter_movies(&mut self) -> Result<()> {
    let current_year = input::current_year();
    let prompt = "\nEnter minimum rating (leave blank for no minimum rating): ";
    let Some(min_rating) = input::read_rating(&mut self.console, prompt, true)? else {
      cancelled(&mut self.console);
      return Ok(());
    };
    let prompt = "Enter start year (leave blank for no start year): ";
    let Some(start_year) = input::read_year(&mut self.console, prompt, true, current_year)? else {
      cancelled(&mut self.console);
      return Ok(());
    };
    let prompt = "Enter end year (leave blank for no end year): ";
    let Some(end_year) = input::read_year(&mut self.console, prompt, true, current_year)? else {
      cancelled(&mut self.console);
      return Ok(());
    };

    let filter = Filter { min_rating, start_year, end_year };
    let movies = self.rated().await?;
    self.console.output("\nFiltered Movies:");
    self.print_entries(filter.apply(&movies));
    Ok(())
  }

  async fn generate_website(&mut self) -> Result<()> {
    let movies = self.rated().await?;
    let user_name = self.session.user().user_name.clone();
    site::write_page(&self.site_dir, &user_name, &movies).map_err(Error::Site)?;
    self
      .console
      .info(&format!("\nWebsite for '{user_name}' was generated successfully."));
    Ok(())
  }

  async fn log_in(&mut self) -> Result<()> {
    self.console.print(Tone::Plain, "");
    let Some(name) = input::read_user_name(&mut self.console)? else {
      cancelled(&mut self.console);
      return Ok(());
    };
    let existing = self
      .store
      .get_user_by_name(&name)
      .await
      .map_err(CoreError::store)?;

    let user = match existing {
      Some(user) => {
        let Some(password) = input::read_password(&mut self.console, "Enter your password")? else {
          cancelled(&mut self.console);
          return Ok(());
        };
        let verified = user
          .password_hash
          .as_deref()
          .is_some_and(|hash| auth::verify_password(&password, hash));
        if !verified {
          self
            .console
            .error("Authentication failed for the provided credentials!");
          return Ok(());
        }
        self
          .console
          .info("You were successfully authenticated and logged in.");
        user
      }
      None => {
        self.console.error(&format!("Username {name} does not exist."));
        let prompt = "Do you want to add this user? ('y'/'n'): ";
        if input::confirm(&mut self.console, prompt)? != Some(true) {
          cancelled(&mut self.console);
          return Ok(());
        }
        let Some(password) = self.new_password()? else {
          cancelled(&mut self.console);
          return Ok(());
        };
        let new_user = NewUser::new(&name, auth::hash_password(&password)?)?;
        let user = self.store.add_user(new_user).await.map_err(CoreError::store)?;
        self
          .console
          .info(&format!("New user '{name}' has been added and logged in."));
        user
      }
    };

    self.session.switch_to(user);
    Ok(())
  }

  /// Password plus confirmation, repeated until both match.
  fn new_password(&mut self) -> Result<Option<String>> {
    loop {
      let Some(password) = input::read_password(&mut self.console, "Enter your password")? else {
        return Ok(None);
      };
      let Some(confirmed) = input::read_password(&mut self.console, "Confirm your password")? else {
        return Ok(None);
      };
      if password == confirmed {
        return Ok(Some(password));
      }
      self.console.error("Passwords do not match. Please try again!");
    }
  }
}

fn cancelled(console: &mut impl Console) {
  console.info("Action canceled, returning back to menu...");
}

/// Print an action error and carry on.
fn report(console: &mut impl Console, err: &Error) {
  match err {
    Error::Core(CoreError::Metadata(e)) if e.is_unavailable() => {
      warn!(error = %err, "metadata source unavailable");
    }
    _ => warn!(error = %err, "action failed"),
  }
  match err {
    Error::Core(CoreError::Metadata(MetadataError::Timeout)) => {
      console.error("Connection to the OMDb API has timed out.");
    }
    Error::Core(CoreError::Metadata(MetadataError::Unreachable(_))) => {
      console.error("Couldn't connect to the OMDb API.");
    }
    Error::Core(CoreError::Store(source)) => {
      console.error("The following error was raised during a database operation:");
      console.print(Tone::Inactive, &source.to_string());
    }
    other => console.error(&other.to_string()),
  }
}

#[cfg(test)]
mod tests;
