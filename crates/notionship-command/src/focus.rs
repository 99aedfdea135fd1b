//! Focus capability.
//!
//! The interpreter only names the row that should take input next. Moving
//! focus onto that row's editing surface is the host's job.

use notionship_core::RowId;

/// Moves input focus to a row's editing surface.
pub trait FocusMover: Send + Sync {
    /// Focus the row with the given id.
    fn focus(&self, id: RowId);
}

impl<F> FocusMover for F
where
    F: Fn(RowId) + Send + Sync,
{
    fn focus(&self, id: RowId) {
        self(id)
    }
}
