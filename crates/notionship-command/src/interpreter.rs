//! Command interpreter.
//!
//! Turns a [`Command`] aimed at a row index into at most one document
//! operation plus a focus directive. Focus follows intent rather than
//! position: a new row takes focus, a deleted row hands it to the row that
//! was above it, and reindented or moved rows keep it. Focus targets are
//! resolved against the document as it was before the mutation, since ids
//! survive the mutation and positions do not.

use notionship_core::{Document, IndentDirection, Row};
use tracing::{debug, trace};

use crate::command::{Command, Resolution};

/// Trait for command interpreters.
pub trait CommandInterpreter: Send + Sync {
    /// Resolve `command` for the row at `index` of `document`.
    fn apply(&self, document: &Document, command: Command, index: usize) -> Resolution;
}

/// The outline editing rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineInterpreter;

impl OutlineInterpreter {
    /// Create a new interpreter.
    pub fn new() -> Self {
        Self
    }
}

impl CommandInterpreter for OutlineInterpreter {
    fn apply(&self, document: &Document, command: Command, index: usize) -> Resolution {
        let Some(here) = document.row(index) else {
            trace!(command = command.name(), index, "no row at index");
            return Resolution::unhandled(document);
        };

        let resolution = match command {
            Command::NewRowBelow => {
                let fresh = Row::new(here.level);
                let focus = fresh.id;
                Resolution::handled(document.insert_after(index as isize, fresh), Some(focus))
            }
            Command::IndentIn => Resolution::handled(
                document.reindent(index, IndentDirection::In),
                Some(here.id),
            ),
            Command::IndentOut => Resolution::handled(
                document.reindent(index, IndentDirection::Out),
                Some(here.id),
            ),
            Command::DeleteBackwardIfEmpty => {
                if !here.is_empty() {
                    trace!(index, "row has text, leaving erase to the input surface");
                    return Resolution::unhandled(document);
                }

                // Resolve the row above before it shifts.
                let focus = index
                    .checked_sub(1)
                    .and_then(|above| document.row(above))
                    .map(|row| row.id);
                Resolution::handled(document.remove_at(index), focus)
            }
            Command::MoveRow { direction } => {
                let focus = here.id;
                let next = match direction.neighbour(index) {
                    Some(other) => document.swap(index, other),
                    None => document.clone(),
                };
                Resolution::handled(next, Some(focus))
            }
        };

        debug!(
            command = command.name(),
            index,
            changed = resolution.document != *document,
            focus = ?resolution.focus,
            "Resolved command"
        );

        resolution
    }
}

/// Resolve a command with the default outline rules.
pub fn apply(document: &Document, command: Command, index: usize) -> Resolution {
    OutlineInterpreter.apply(document, command, index)
}
