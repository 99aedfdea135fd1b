//! Command kinds and their resolution result.

use notionship_core::{Document, MoveDirection, RowId};
use serde::{Deserialize, Serialize};

/// A discrete editing intent reported by the input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Split/commit the line: open an empty row below at the same level.
    NewRowBelow,
    /// Nest the row one level deeper.
    IndentIn,
    /// Move the row one level towards the root.
    IndentOut,
    /// Erase an empty row and continue on the row above.
    DeleteBackwardIfEmpty,
    /// Swap the row with its neighbour.
    MoveRow { direction: MoveDirection },
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::NewRowBelow => "new_row_below",
            Command::IndentIn => "indent_in",
            Command::IndentOut => "indent_out",
            Command::DeleteBackwardIfEmpty => "delete_backward_if_empty",
            Command::MoveRow {
                direction: MoveDirection::Up,
            } => "move_row_up",
            Command::MoveRow {
                direction: MoveDirection::Down,
            } => "move_row_down",
        }
    }
}

/// Outcome of interpreting a command against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The document after the command. Equal to the input when nothing
    /// changed.
    pub document: Document,

    /// Row that should receive input next, if any.
    pub focus: Option<RowId>,

    /// Whether the command's trigger condition matched. When false the input
    /// surface should carry on with its default behaviour for the key.
    pub handled: bool,
}

impl Resolution {
    /// A handled resolution.
    pub fn handled(document: Document, focus: Option<RowId>) -> Self {
        Self {
            document,
            focus,
            handled: true,
        }
    }

    /// Nothing matched: document unchanged, no focus directive.
    pub fn unhandled(document: &Document) -> Self {
        Self {
            document: document.clone(),
            focus: None,
            handled: false,
        }
    }
}
