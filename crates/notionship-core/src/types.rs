//! Common types used across Notionship.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deepest indentation a row may have.
pub const MAX_LEVEL: u8 = 8;

/// Stable identity of a row. Never reused once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(Uuid);

impl RowId {
    /// Issue a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RowId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Indentation depth of a row, always within `0..=MAX_LEVEL`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    /// Level of a top-level row.
    pub const ROOT: Level = Level(0);

    /// The deepest level.
    pub const MAX: Level = Level(MAX_LEVEL);

    /// Create a level, returning `None` above `MAX_LEVEL`.
    pub fn new(value: u8) -> Option<Self> {
        (value <= MAX_LEVEL).then_some(Self(value))
    }

    /// Create a level, saturating at `MAX_LEVEL`.
    pub fn saturating(value: u8) -> Self {
        Self(value.min(MAX_LEVEL))
    }

    /// Raw depth.
    pub fn get(self) -> u8 {
        self.0
    }

    /// One level shallower, saturating at zero.
    pub fn shallower(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Level::new(value).ok_or_else(|| format!("level {value} exceeds maximum {MAX_LEVEL}"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Direction of a reindent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentDirection {
    /// Nest one level deeper.
    In,
    /// Move one level towards the root.
    Out,
}

/// Direction of a row move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    /// Position of the swap partner for a row at `index`, if it exists.
    pub fn neighbour(self, index: usize) -> Option<usize> {
        match self {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bounds() {
        assert_eq!(Level::new(0), Some(Level::ROOT));
        assert_eq!(Level::new(MAX_LEVEL), Some(Level::MAX));
        assert_eq!(Level::new(MAX_LEVEL + 1), None);
        assert_eq!(Level::saturating(200), Level::MAX);
    }

    #[test]
    fn test_level_steps_saturate() {
        assert_eq!(Level::ROOT.shallower(), Level::ROOT);
        assert_eq!(Level::new(1).unwrap().shallower(), Level::ROOT);
    }

    #[test]
    fn test_level_serde_rejects_out_of_range() {
        let ok: Level = serde_json::from_str("3").unwrap();
        assert_eq!(ok.get(), 3);
        assert!(serde_json::from_str::<Level>("9").is_err());
        assert_eq!(serde_json::to_string(&Level::MAX).unwrap(), "8");
    }

    #[test]
    fn test_row_ids_are_unique() {
        let a = RowId::new();
        let b = RowId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_move_neighbour() {
        assert_eq!(MoveDirection::Up.neighbour(0), None);
        assert_eq!(MoveDirection::Up.neighbour(2), Some(1));
        assert_eq!(MoveDirection::Down.neighbour(2), Some(3));
    }
}
