//! Users and the interactive session.
//!
//! The active user is carried in an explicit [`Session`] value owned by the
//! front end. It lives for one process and is only replaced on login or user
//! switch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name of the system user that is active while nobody is logged in.
/// The store inserts it with insert-or-ignore semantics on start-up.
pub const DEFAULT_USER_NAME: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub id:            UserId,
  pub user_name:     String,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  /// argon2 PHC string; `None` only for the system user.
  pub password_hash: Option<String>,
}

impl User {
  pub fn is_default(&self) -> bool { self.user_name == DEFAULT_USER_NAME }
}

/// Input for [`CatalogStore::add_user`](crate::store::CatalogStore::add_user).
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
  pub user_name:     String,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub password_hash: String,
}

impl NewUser {
  /// Build a signup request. The user name is lowercased and must be
  /// non-empty ASCII alphanumeric.
  pub fn new(user_name: &str, password_hash: impl Into<String>) -> Result<Self> {
    let user_name = normalize_user_name(user_name)?;
    Ok(Self {
      user_name,
      first_name: None,
      last_name: None,
      password_hash: password_hash.into(),
    })
  }

  pub fn with_names(mut self, first: Option<String>, last: Option<String>) -> Self {
    self.first_name = first.filter(|s| !s.is_empty());
    self.last_name = last.filter(|s| !s.is_empty());
    self
  }
}

/// Lowercase a user name and check it is alphanumeric.
pub fn normalize_user_name(raw: &str) -> Result<String> {
  let name = raw.trim().to_lowercase();
  if name.is_empty() {
    return Err(Error::InvalidField {
      field:  "user_name",
      reason: "must not be empty".into(),
    });
  }
  if !name.chars().all(|c| c.is_alphanumeric()) {
    return Err(Error::InvalidField {
      field:  "user_name",
      reason: "must only contain letters and numbers".into(),
    });
  }
  Ok(name)
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The user driving the current process.
#[derive(Debug, Clone)]
pub struct Session {
  user: User,
}

impl Session {
  pub fn new(user: User) -> Self { Self { user } }

  pub fn user(&self) -> &User { &self.user }

  pub fn user_id(&self) -> UserId { self.user.id }

  /// `true` while nobody has logged in.
  pub fn is_anonymous(&self) -> bool { self.user.is_default() }

  /// Replace the active user (login / switch user).
  pub fn switch_to(&mut self, user: User) {
    tracing::info!(user = %user.user_name, "session switched");
    self.user = user;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn user_names_are_lowercased() {
    let new = NewUser::new("  Alice42 ", "hash").unwrap();
    assert_eq!(new.user_name, "alice42");
  }

  #[test]
  fn user_names_reject_punctuation_and_blank() {
    assert!(NewUser::new("bob!", "hash").is_err());
    assert!(NewUser::new("   ", "hash").is_err());
  }

  #[test]
  fn session_tracks_default_user() {
    let default = User {
      id:            UserId(1),
      user_name:     DEFAULT_USER_NAME.into(),
      first_name:    None,
      last_name:     None,
      password_hash: None,
    };
    let mut session = Session::new(default);
    assert!(session.is_anonymous());

    session.switch_to(User {
      id:            UserId(2),
      user_name:     "carol".into(),
      first_name:    None,
      last_name:     None,
      password_hash: Some("x".into()),
    });
    assert!(!session.is_anonymous());
    assert_eq!(session.user_id(), UserId(2));
  }
}
