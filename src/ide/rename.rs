//! Rename: one coordinated edit set across documents.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::base::{Position, Span};
use crate::error::{Error, Result};

use super::references::ReferenceResult;
use super::text_utils::is_identifier;

/// Replace the text at `span` with `new_text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub new_text: Arc<str>,
}

/// Edits per document. Applying them is the caller's job and is not atomic
/// across documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenameResult {
    pub edits: IndexMap<Arc<str>, Vec<TextEdit>>,
}

impl RenameResult {
    pub fn file_count(&self) -> usize {
        self.edits.len()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Turn every reference into an edit, at most one per (document, position).
pub fn rename(references: &ReferenceResult, new_name: &str) -> Result<RenameResult> {
    if !is_identifier(new_name) {
        return Err(Error::InvalidName(new_name.to_string()));
    }
    let new_text: Arc<str> = Arc::from(new_name);
    let mut seen: FxHashSet<(Arc<str>, Position)> = FxHashSet::default();
    let mut result = RenameResult::default();
    for reference in &references.references {
        if !seen.insert((Arc::clone(&reference.path), reference.span.start)) {
            continue;
        }
        result
            .edits
            .entry(Arc::clone(&reference.path))
            .or_default()
            .push(TextEdit {
                span: reference.span,
                new_text: Arc::clone(&new_text),
            });
    }
    tracing::debug!(
        new_name,
        files = result.file_count(),
        edits = result.edit_count(),
        "rename"
    );
    Ok(result)
}
