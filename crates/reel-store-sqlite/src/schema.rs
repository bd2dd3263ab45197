//! SQL schema for the Reel SQLite store.
//!
//! Executed at connection startup; `CREATE TABLE IF NOT EXISTS` keeps it
//! idempotent and `PRAGMA user_version` records the layout.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name     TEXT NOT NULL UNIQUE,
    first_name    TEXT,
    last_name     TEXT,
    password_hash TEXT              -- NULL only for the default user
);

CREATE TABLE IF NOT EXISTS countries (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    code TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS movies (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id     TEXT NOT NULL UNIQUE,
    title           TEXT NOT NULL,
    year            INTEGER,        -- NULL when unknown
    image_url       TEXT,
    external_rating REAL
);

CREATE TABLE IF NOT EXISTS movies_countries (
    movie_id   INTEGER NOT NULL REFERENCES movies(id),
    country_id INTEGER NOT NULL REFERENCES countries(id),
    PRIMARY KEY (movie_id, country_id)
);

CREATE TABLE IF NOT EXISTS ratings (
    user_id  INTEGER NOT NULL REFERENCES users(id),
    movie_id INTEGER NOT NULL REFERENCES movies(id),
    rating   REAL    NOT NULL CHECK (rating BETWEEN 0 AND 10),
    note     TEXT    NOT NULL DEFAULT '',
    PRIMARY KEY (user_id, movie_id)
);

CREATE INDEX IF NOT EXISTS ratings_movie_idx   ON ratings(movie_id);
CREATE INDEX IF NOT EXISTS relation_country_idx ON movies_countries(country_id);

PRAGMA user_version = 1;
";
