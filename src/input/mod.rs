use std::io;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::{Stream, StreamExt, future};
use minesweeper_common::{
    models::NAME_LENGTH,
    protocol::{InputEvent, Key},
};

/// Translates a terminal event, dropping the ones the game has no use for.
pub fn translate(event: Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => translate_key(key).map(InputEvent::Key),
        Event::Resize(width, height) => Some(InputEvent::Resize { width, height }),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<Key> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')).then_some(Key::Interrupt);
    }

    Some(match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Esc => Key::Esc,
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    })
}

/// Live terminal input as a stream of game events.
pub fn terminal_events() -> impl Stream<Item = io::Result<InputEvent>> + Unpin {
    EventStream::new().filter_map(|event| {
        future::ready(match event {
            Ok(event) => translate(event).map(Ok),
            Err(e) => Some(Err(e)),
        })
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameEdit {
    Editing,
    Submitted,
    Cancelled,
}

/// Single-line editor for the high-score name prompt.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NameEntry {
    buffer: String,
}

impl NameEntry {
    pub fn apply(&mut self, key: Key) -> NameEdit {
        match key {
            Key::Enter => return NameEdit::Submitted,
            Key::Esc | Key::Interrupt => return NameEdit::Cancelled,
            Key::Backspace => {
                self.buffer.pop();
            }
            Key::Char(c) if !c.is_control() && self.buffer.chars().count() < NAME_LENGTH => {
                self.buffer.push(c);
            }
            _ => {}
        }
        NameEdit::Editing
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }
}
