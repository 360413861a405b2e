//! # Command Definitions
//!
//! Decoding of terminal events into key presses and map cells.

use crate::game::Position;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// One decoded unit of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Key(KeyCode),
    /// A map cell clicked with the left mouse button
    Target(Position),
    /// A map cell under the mouse pointer
    Hover(Position),
}

impl Command {
    /// A plain character key.
    pub fn char(ch: char) -> Self {
        Command::Key(KeyCode::Char(ch))
    }

    /// Decodes one terminal event.
    ///
    /// Only key presses count; repeats and releases are dropped. Ctrl+C
    /// reads as Escape because raw mode swallows the signal. Mouse cells are
    /// screen cells, which match map cells since the map is drawn at the
    /// top-left corner.
    ///
    /// # Examples
    ///
    /// ```
    /// use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    /// use tombs::Command;
    ///
    /// let event = Event::Key(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE));
    /// assert_eq!(Command::from_event(&event), Some(Command::char('k')));
    /// ```
    pub fn from_event(event: &Event) -> Option<Command> {
        match event {
            Event::Key(key) => from_key(key),
            Event::Mouse(mouse) => from_mouse(mouse),
            _ => None,
        }
    }
}

fn from_key(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return (key.code == KeyCode::Char('c')).then_some(Command::Key(KeyCode::Esc));
    }
    Some(Command::Key(key.code))
}

fn from_mouse(mouse: &MouseEvent) -> Option<Command> {
    let cell = Position::new(i32::from(mouse.column), i32::from(mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Command::Target(cell)),
        MouseEventKind::Moved => Some(Command::Hover(cell)),
        _ => None,
    }
}
