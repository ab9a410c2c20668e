//! Foundation types for the archscope toolchain.
//!
//! This module provides fundamental types used throughout the engine:
//! - [`FileId`] - Interned file identifiers
//! - [`FileSet`] - Path ↔ [`FileId`] interner
//! - [`Position`], [`Span`] - 0-indexed line/column positions
//! - [`LineIndex`] - Byte offset ↔ line/column conversion
//! - Import path normalization
//!
//! This module has NO dependencies on other archscope modules.

mod file_id;
mod file_set;
mod line_index;
mod paths;
mod position;

pub use file_id::FileId;
pub use file_set::FileSet;
pub use line_index::LineIndex;
pub use paths::{normalize_path, resolve_import_path};
pub use position::{Position, Span};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
