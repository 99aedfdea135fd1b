//! # Notionship Core
//!
//! Outline document model for Notionship.
//!
//! This crate provides the fundamental building blocks:
//! - [`Row`] - One outline entry with text, completion flag and level
//! - [`Document`] - The ordered, never-empty sequence of rows and its pure operations
//! - [`Level`] / [`RowId`] - Bounded nesting depth and stable row identity
//! - [`NotionshipError`] - Error types for serialization and storage plumbing

pub mod document;
pub mod error;
pub mod row;
pub mod types;

// Re-exports for convenience
pub use document::{visible, Document};
pub use error::{NotionshipError, Result};
pub use row::Row;
pub use types::*;
