//! Platform-independent key chords and the outline key map.

use notionship_core::MoveDirection;
use serde::{Deserialize, Serialize};

use crate::command::Command;

/// A key as reported by the input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Tab,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    /// Any printable character.
    Char(char),
}

impl Key {
    /// Parse a DOM-style key name (`"Enter"`, `"ArrowUp"`, `"a"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Enter" => Some(Key::Enter),
            "Tab" => Some(Key::Tab),
            "Backspace" => Some(Key::Backspace),
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            "Escape" => Some(Key::Escape),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(Key::Char(ch)),
                    _ => None,
                }
            }
        }
    }
}

/// A key together with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: Key,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub ctrl: bool,
}

impl KeyChord {
    /// A chord with no modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            alt: false,
            ctrl: false,
        }
    }

    /// Add Shift.
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Add Alt.
    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// The outline command bound to this chord, if any.
    ///
    /// - Enter: new row below
    /// - Tab / Shift+Tab: indent / outdent
    /// - Backspace: delete the row if it is empty
    /// - Alt+Up / Alt+Down: move the row
    pub fn command(&self) -> Option<Command> {
        match self.key {
            Key::Enter => Some(Command::NewRowBelow),
            Key::Tab if self.shift => Some(Command::IndentOut),
            Key::Tab => Some(Command::IndentIn),
            Key::Backspace => Some(Command::DeleteBackwardIfEmpty),
            Key::ArrowUp if self.alt => Some(Command::MoveRow {
                direction: MoveDirection::Up,
            }),
            Key::ArrowDown if self.alt => Some(Command::MoveRow {
                direction: MoveDirection::Down,
            }),
            _ => None,
        }
    }
}
