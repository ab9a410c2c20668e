//! Go-to-definition implementation.

use std::sync::Arc;

use crate::base::{FileId, Span};
use crate::hir::{ElementReference, QualifiedId, SemanticIndex};

use super::cursor::CursorContext;
use super::local_defs::DefinitionKind;

/// Result of a go-to-definition request.
#[derive(Clone, Debug, Default)]
pub struct GotoResult {
    /// The targets to jump to.
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a result with a single target.
    pub fn single(target: GotoTarget) -> Self {
        Self {
            targets: vec![target],
        }
    }

    /// Check if any targets were found.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub file: FileId,
    /// Normalized path of the file containing the target.
    pub path: Arc<str>,
    /// The declared identifier, 0-indexed.
    pub span: Span,
    pub kind: DefinitionKind,
    pub name: Arc<str>,
    pub qualified_id: Option<QualifiedId>,
}

impl From<&ElementReference> for GotoTarget {
    fn from(element: &ElementReference) -> Self {
        Self {
            file: element.file,
            path: Arc::clone(&element.path),
            span: element.span,
            kind: DefinitionKind::Element(element.kind),
            name: Arc::from(element.id.as_str()),
            qualified_id: Some(element.qualified_id.clone()),
        }
    }
}

/// Find the declaration(s) of the identifier under the cursor.
///
/// Bound resolutions win. When the reference could not be bound, the index is
/// asked for the token as written and then for its last segment alone, so a
/// locally qualified token still finds its element.
pub fn goto_definition(index: &SemanticIndex, cursor: &CursorContext) -> GotoResult {
    if let Some(def) = &cursor.definition {
        if def.kind.element_kind().is_none() {
            return GotoResult::single(GotoTarget {
                file: cursor.file,
                path: Arc::clone(&cursor.path),
                span: def.name_span,
                kind: def.kind,
                name: Arc::from(def.name.as_str()),
                qualified_id: None,
            });
        }
    }

    // duplicate siblings share a target but are separate declarations
    let mut candidates = cursor.resolution.candidates().to_vec();
    candidates.dedup();
    let targets: Vec<GotoTarget> = candidates
        .iter()
        .flat_map(|target| {
            index
                .get_elements(&target.qid.to_string())
                .into_iter()
                .filter(move |e| e.file == target.file)
        })
        .map(|e| GotoTarget::from(&*e))
        .collect();
    if !targets.is_empty() {
        return GotoResult { targets };
    }

    let found = index
        .get_element(&cursor.token)
        .or_else(|| index.get_element(cursor.short_name()));
    match found {
        Some(element) => {
            tracing::trace!(token = %cursor.token, "definition found by index lookup");
            GotoResult::single(GotoTarget::from(&*element))
        }
        None => GotoResult::empty(),
    }
}
