//! Symbol listing for workspace and document views.

use std::sync::Arc;

use crate::base::{FileId, Span};
use crate::hir::{ElementReference, QualifiedId, SemanticIndex};
use crate::syntax::Name;

use super::local_defs::{DefinitionKind, LocalDefinitions};

/// A symbol for the workspace symbol list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub name: Name,
    pub kind: DefinitionKind,
    pub file: FileId,
    pub path: Arc<str>,
    /// The declared identifier.
    pub span: Span,
    pub qualified_id: QualifiedId,
}

impl SymbolInfo {
    pub fn from_element(element: &ElementReference) -> Self {
        Self {
            name: element.id.clone(),
            kind: DefinitionKind::Element(element.kind),
            file: element.file,
            path: Arc::clone(&element.path),
            span: element.span,
            qualified_id: element.qualified_id.clone(),
        }
    }

    /// The enclosing element's qualified id, `None` at top level.
    pub fn container_name(&self) -> Option<String> {
        self.qualified_id.parent().map(|parent| parent.to_string())
    }
}

/// Get all indexed elements, optionally filtered by a query.
///
/// The query is a case-insensitive substring of the identifier or of the
/// qualified id. Results are sorted by name, then by location.
pub fn workspace_symbols(index: &SemanticIndex, query: Option<&str>) -> Vec<SymbolInfo> {
    let query = query.map(str::to_lowercase).filter(|q| !q.is_empty());
    let mut results: Vec<SymbolInfo> = index
        .all_elements()
        .iter()
        .filter(|element| match &query {
            Some(q) => {
                element.id.to_lowercase().contains(q)
                    || element.qualified_id.to_string().to_lowercase().contains(q)
            }
            None => true,
        })
        .map(|element| SymbolInfo::from_element(element))
        .collect();
    // all_elements is already ordered by location; the sort is stable
    results.sort_by(|a, b| a.name.cmp(&b.name));
    results
}

/// A node of the document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSymbol {
    pub name: Name,
    pub kind: DefinitionKind,
    /// Whole declaration, body included.
    pub range: Span,
    /// The identifier.
    pub selection_range: Span,
    pub children: Vec<DocumentSymbol>,
}

/// Hierarchical outline of one document, from its local definition map.
pub fn document_symbols(defs: &LocalDefinitions) -> Vec<DocumentSymbol> {
    fn build(defs: &LocalDefinitions, parent: Option<usize>) -> Vec<DocumentSymbol> {
        defs.children_of(parent)
            .into_iter()
            .filter_map(|idx| {
                let def = defs.get(idx)?;
                Some(DocumentSymbol {
                    name: def.name.clone(),
                    kind: def.kind,
                    range: def.range,
                    selection_range: def.name_span,
                    children: build(defs, Some(idx)),
                })
            })
            .collect()
    }
    build(defs, None)
}
