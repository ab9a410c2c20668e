//! Find references implementation.
//!
//! Every open document is scanned for identifier tokens spelled like the
//! target; keywords, strings and comments never match. The scan does not
//! resolve each hit, so an unrelated element with the same local name counts
//! too; rename relies on exactly this behavior.

use std::sync::Arc;

use crate::base::Span;

use super::document::Document;

/// Result of a find-references request.
#[derive(Clone, Debug, Default)]
pub struct ReferenceResult {
    /// All references found, grouped by document in registry order.
    pub references: Vec<Reference>,
    /// Include the definition in the results.
    pub include_declaration: bool,
}

impl ReferenceResult {
    /// Check if any references were found.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Get the number of references.
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Distinct documents with at least one hit.
    pub fn paths(&self) -> Vec<Arc<str>> {
        let mut paths: Vec<Arc<str>> = Vec::new();
        for reference in &self.references {
            if !paths.contains(&reference.path) {
                paths.push(Arc::clone(&reference.path));
            }
        }
        paths
    }
}

/// One occurrence of the identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub path: Arc<str>,
    pub span: Span,
    /// Whether this is the definition (vs a reference).
    pub is_definition: bool,
}

/// Scan `documents` for `name`.
pub fn find_references<'a>(
    documents: impl IntoIterator<Item = &'a Document>,
    name: &str,
    include_declaration: bool,
) -> ReferenceResult {
    let mut references = Vec::new();
    for doc in documents {
        let defs = doc.local_definitions();
        for span in doc.identifier_spans(name) {
            let is_definition = defs.iter().any(|d| d.name_span == span);
            if is_definition && !include_declaration {
                continue;
            }
            references.push(Reference {
                path: Arc::clone(doc.uri()),
                span,
                is_definition,
            });
        }
    }
    tracing::trace!(name, found = references.len(), "find references");
    ReferenceResult {
        references,
        include_declaration,
    }
}
