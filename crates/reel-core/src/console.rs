//! The [`Console`] trait: line-oriented prompts and styled messages.
//!
//! The CLI implements it over stdin/stdout with colours; tests use
//! `testing::ScriptedConsole` (behind the `testing` feature).

use std::io;

/// Message class, mapped to a colour by the terminal implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
  Plain,
  Info,
  Error,
  Output,
  /// Enabled menu entry.
  Active,
  /// Disabled menu entry.
  Inactive,
}

pub trait Console {
  /// Print `prompt` and read one line, without the trailing newline.
  fn read_line(&mut self, prompt: &str) -> io::Result<String>;

  /// Like [`read_line`](Self::read_line) but without echoing input.
  fn read_secret(&mut self, prompt: &str) -> io::Result<String> { self.read_line(prompt) }

  fn print(&mut self, tone: Tone, text: &str);

  fn clear(&mut self) {}

  fn info(&mut self, text: &str) { self.print(Tone::Info, text) }

  fn error(&mut self, text: &str) { self.print(Tone::Error, text) }

  fn output(&mut self, text: &str) { self.print(Tone::Output, text) }
}
