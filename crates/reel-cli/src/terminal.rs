//! [`Console`] over the real terminal, coloured with crossterm.

use std::io::{self, BufRead, Write};

use crossterm::{
  cursor::MoveTo,
  event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
  execute,
  style::Stylize,
  terminal::{self, Clear, ClearType},
};
use reel_core::{
  console::{Console, Tone},
  input::CANCEL_TOKEN,
};

#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
  pub fn new() -> Self { Self }

  fn prompt(&self, prompt: &str) -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "{}", prompt.yellow())?;
    out.flush()
  }
}

impl Console for TerminalConsole {
  fn read_line(&mut self, prompt: &str) -> io::Result<String> {
    self.prompt(prompt)?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
      return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_owned())
  }

  /// Read in raw mode so nothing is echoed. Esc cancels; Ctrl-C ends input.
  fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
    self.prompt(prompt)?;
    terminal::enable_raw_mode()?;
    let secret = read_hidden();
    terminal::disable_raw_mode()?;
    println!();
    secret
  }

  fn print(&mut self, tone: Tone, text: &str) {
    let styled = match tone {
      Tone::Plain => text.green(),
      Tone::Info => text.cyan(),
      Tone::Error => text.red(),
      Tone::Output => text.blue(),
      Tone::Active => text.magenta(),
      Tone::Inactive => text.dark_grey(),
    };
    println!("{styled}");
  }

  fn clear(&mut self) {
    // Cosmetic; a terminal that refuses is still usable.
    let _ = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0));
  }
}

fn read_hidden() -> io::Result<String> {
  let mut secret = String::new();
  loop {
    let Event::Key(KeyEvent { code, modifiers, kind, .. }) = event::read()? else { continue };
    if kind != KeyEventKind::Press {
      continue;
    }
    match code {
      KeyCode::Enter => return Ok(secret),
      KeyCode::Esc => return Ok(CANCEL_TOKEN.to_owned()),
      KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "interrupted"));
      }
      KeyCode::Backspace => {
        secret.pop();
      }
      KeyCode::Char(c) => secret.push(c),
      _ => {}
    }
  }
}
