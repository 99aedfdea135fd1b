//! # Notionship Command
//!
//! Keyboard command interpreter for Notionship outlines.

pub mod command;
pub mod focus;
pub mod interpreter;
pub mod key;

pub use command::{Command, Resolution};
pub use focus::FocusMover;
pub use interpreter::{apply, CommandInterpreter, OutlineInterpreter};
pub use key::{Key, KeyChord};
