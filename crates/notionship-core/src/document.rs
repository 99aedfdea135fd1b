//! The outline document and its row operations.
//!
//! A [`Document`] is an ordered, never-empty sequence of [`Row`]s. Every
//! operation is a pure function of the document and its arguments and returns
//! a new document. Out-of-range indices, unknown ids and boundary conditions
//! (indenting past the cap, removing the last row) are absorbed as no-ops and
//! return an unchanged copy, so a stray keystroke at the edge of the list can
//! never fail.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{NotionshipError, Result};
use crate::row::Row;
use crate::types::{IndentDirection, Level, RowId, MAX_LEVEL};

/// An ordered sequence of rows. Never empty, ids unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Row>", into = "Vec<Row>")]
pub struct Document {
    rows: Vec<Row>,
}

impl Document {
    /// Build a document from rows, checking the document invariants.
    pub fn new(rows: Vec<Row>) -> Result<Self> {
        if rows.is_empty() {
            return Err(NotionshipError::MalformedDocument {
                message: "document has no rows".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.id) {
                return Err(NotionshipError::MalformedDocument {
                    message: format!("duplicate row id {}", row.id),
                });
            }
        }

        Ok(Self { rows })
    }

    /// Parse the persisted form: a JSON array of `{id, text, checked, level}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let rows: Vec<Row> = serde_json::from_str(raw)?;
        Self::new(rows)
    }

    /// Serialize to the persisted form.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }

    /// SHA-256 of the persisted form, hex encoded.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(&self.rows).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Number of rows. Always at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Iterate rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Row at a position.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Position of the row with the given id.
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    /// True if a row with this id exists.
    pub fn contains(&self, id: RowId) -> bool {
        self.position(id).is_some()
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Replace a row's text. No-op if `id` is absent.
    #[must_use]
    pub fn set_text(&self, id: RowId, text: impl Into<String>) -> Self {
        let text = text.into();
        self.map_row_by_id(id, |row| row.text = text)
    }

    /// Replace a row's completion flag. No-op if `id` is absent.
    #[must_use]
    pub fn set_checked(&self, id: RowId, checked: bool) -> Self {
        self.map_row_by_id(id, |row| row.checked = checked)
    }

    /// Insert `row` right after position `index`.
    ///
    /// A negative index inserts at the head; an index at or past the last
    /// position appends. If `row.id` is already present the document is
    /// returned unchanged.
    #[must_use]
    pub fn insert_after(&self, index: isize, row: Row) -> Self {
        if self.contains(row.id) {
            return self.clone();
        }

        let at = if index < 0 {
            0
        } else {
            (index as usize).saturating_add(1).min(self.rows.len())
        };

        let mut rows = self.rows.clone();
        rows.insert(at, row);
        Self { rows }
    }

    /// Append `row` at the end of the document.
    #[must_use]
    pub fn append(&self, row: Row) -> Self {
        self.insert_after(self.rows.len() as isize - 1, row)
    }

    /// Remove the row at `index`.
    ///
    /// No-op when the document has a single row or `index` is out of range.
    #[must_use]
    pub fn remove_at(&self, index: usize) -> Self {
        if self.rows.len() == 1 || index >= self.rows.len() {
            return self.clone();
        }

        let mut rows = self.rows.clone();
        rows.remove(index);
        Self { rows }
    }

    /// Exchange the rows at `i` and `j`. No-op if either is out of range.
    #[must_use]
    pub fn swap(&self, i: usize, j: usize) -> Self {
        if i >= self.rows.len() || j >= self.rows.len() {
            return self.clone();
        }

        let mut rows = self.rows.clone();
        rows.swap(i, j);
        Self { rows }
    }

    /// Change the level of the row at `index` by one step.
    ///
    /// Indenting is capped at one level deeper than the previous row (and at
    /// zero for the first row). When the target equals the current level, or
    /// `index` is out of range, the document is returned unchanged.
    #[must_use]
    pub fn reindent(&self, index: usize, direction: IndentDirection) -> Self {
        let Some(here) = self.rows.get(index) else {
            return self.clone();
        };

        let target = self.reindent_target(index, direction);
        if target == here.level {
            return self.clone();
        }

        let mut rows = self.rows.clone();
        rows[index].level = target;
        Self { rows }
    }

    /// The level `reindent` would give the row at `index`.
    pub fn reindent_target(&self, index: usize, direction: IndentDirection) -> Level {
        let Some(here) = self.rows.get(index) else {
            return Level::ROOT;
        };

        match direction {
            IndentDirection::In => {
                let cap = index
                    .checked_sub(1)
                    .and_then(|prev| self.rows.get(prev))
                    .map_or(0, |prev| prev.level.get() + 1);
                let ceiling = cap.min(MAX_LEVEL);
                Level::saturating((here.level.get() + 1).min(ceiling))
            }
            IndentDirection::Out => here.level.shallower(),
        }
    }

    /// Rows to display, dropping checked rows when `hide_completed` is set.
    pub fn visible(&self, hide_completed: bool) -> Vec<&Row> {
        self.rows
            .iter()
            .filter(|row| !(hide_completed && row.checked))
            .collect()
    }

    /// Like [`Document::visible`], pairing each row with its position in the
    /// full document. Commands always address full-document positions.
    pub fn visible_indexed(&self, hide_completed: bool) -> Vec<(usize, &Row)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !(hide_completed && row.checked))
            .collect()
    }

    fn map_row_by_id(&self, id: RowId, f: impl FnOnce(&mut Row)) -> Self {
        let Some(index) = self.position(id) else {
            return self.clone();
        };

        let mut rows = self.rows.clone();
        f(&mut rows[index]);
        Self { rows }
    }
}

impl Default for Document {
    /// The minimum viable document: one empty, unchecked, top-level row.
    fn default() -> Self {
        Self {
            rows: vec![Row::default()],
        }
    }
}

impl TryFrom<Vec<Row>> for Document {
    type Error = NotionshipError;

    fn try_from(rows: Vec<Row>) -> Result<Self> {
        Document::new(rows)
    }
}

impl From<Document> for Vec<Row> {
    fn from(document: Document) -> Self {
        document.rows
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Free-function form of [`Document::visible`].
pub fn visible(document: &Document, hide_completed: bool) -> Vec<&Row> {
    document.visible(hide_completed)
}
