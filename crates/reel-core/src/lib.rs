//! Core types and the reconciliation / rating engine for Reel.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! SQLite backend (`reel-store-sqlite`) and the terminal front end
//! (`reel-cli`) plug into the traits defined here.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod console;
pub mod country;
pub mod error;
pub mod fuzzy;
pub mod input;
pub mod library;
pub mod metadata;
pub mod movie;
pub mod rating;
pub mod reference;
pub mod resolve;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod user;

pub use error::{Error, MetadataError, Result};
