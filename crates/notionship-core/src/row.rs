//! Row type for the outline.
//!
//! A Row is the only entity in a document: one line of text with a
//! completion flag, a nesting depth and a stable identity.

use serde::{Deserialize, Serialize};

use crate::types::{Level, RowId};

/// One outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Stable identity for the lifetime of the row.
    pub id: RowId,

    /// The row's content. May be empty.
    pub text: String,

    /// Completion flag.
    pub checked: bool,

    /// Nesting depth.
    pub level: Level,
}

impl Row {
    /// A fresh, empty, unchecked row at the given level.
    pub fn new(level: Level) -> Self {
        Self {
            id: RowId::new(),
            text: String::new(),
            checked: false,
            level,
        }
    }

    /// Set the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the completion flag.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// True if the row has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Default for Row {
    fn default() -> Self {
        Self::new(Level::ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_row() {
        let row = Row::default();
        assert!(row.is_empty());
        assert!(!row.checked);
        assert_eq!(row.level, Level::ROOT);
    }

    #[test]
    fn test_row_wire_format() {
        let row = Row::new(Level::saturating(2))
            .with_text("buy milk")
            .with_checked(true);
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["text"], "buy milk");
        assert_eq!(json["checked"], true);
        assert_eq!(json["level"], 2);
        assert_eq!(json["id"], row.id.to_string());
    }
}
