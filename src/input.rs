use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::components::Dir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Dir),
    Quit,
}

impl Command {
    /// `wasd` and vi keys move, `q` quits. Case is ignored.
    pub fn from_symbol(symbol: char) -> Option<Command> {
        match symbol.to_ascii_lowercase() {
            'w' | 'k' => Some(Command::Move(Dir::Up)),
            's' | 'j' => Some(Command::Move(Dir::Down)),
            'a' | 'h' => Some(Command::Move(Dir::Left)),
            'd' | 'l' => Some(Command::Move(Dir::Right)),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }
}

pub trait InputSource {
    /// One raw symbol, or `None` when nothing usable arrived this round.
    fn next_symbol(&mut self) -> io::Result<Option<char>>;
}

/// Reads key presses from the terminal. Must be used in raw mode.
pub struct KeyInput {
    poll: Duration,
}

impl KeyInput {
    pub fn new(poll: Duration) -> Self {
        Self { poll }
    }
}

impl InputSource for KeyInput {
    fn next_symbol(&mut self) -> io::Result<Option<char>> {
        if !event::poll(self.poll)? {
            return Ok(None);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(None);
        };
        if key.kind == KeyEventKind::Release {
            return Ok(None);
        }
        let symbol = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => 'q',
            KeyCode::Char(c) => c,
            KeyCode::Up => 'w',
            KeyCode::Down => 's',
            KeyCode::Left => 'a',
            KeyCode::Right => 'd',
            KeyCode::Esc => 'q',
            _ => return Ok(None),
        };
        Ok(Some(symbol))
    }
}
