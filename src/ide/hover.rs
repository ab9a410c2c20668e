//! Hover information implementation.

use std::fmt::Write;
use std::sync::Arc;

use crate::base::Span;
use crate::hir::{ElementReference, QualifiedId, Resolution, SemanticIndex, Target};

use super::cursor::CursorContext;
use super::local_defs::LocalDefinition;

/// Result of a hover request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    /// The hover content (markdown).
    pub contents: String,
    /// Qualified id of the hovered element.
    pub qualified_id: Option<QualifiedId>,
    /// Whether the cursor is on the declaration itself.
    pub is_definition: bool,
    /// The hovered token.
    pub span: Span,
}

/// Describe what the cursor is on.
///
/// A declaration under the cursor is answered from the document's own
/// definition map, enriched from the index when the element is indexed.
/// References go through their resolution, then through a plain index lookup.
pub fn hover(index: &SemanticIndex, cursor: &CursorContext) -> Option<HoverResult> {
    if let Some(def) = &cursor.definition {
        let target = def
            .qualified_id()
            .map(|qid| Target::new(cursor.file, qid));
        let contents = match target.as_ref().and_then(|t| lookup(index, t)) {
            Some(element) => render_element(&element),
            None => render_local(def),
        };
        return Some(HoverResult {
            contents,
            qualified_id: target.map(|t| t.qid),
            is_definition: true,
            span: def.name_span,
        });
    }

    let (contents, qualified_id) = match &cursor.resolution {
        Resolution::Resolved(target) => {
            let element = lookup(index, target)?;
            (render_element(&element), Some(target.qid.clone()))
        }
        Resolution::Ambiguous(targets) => (render_ambiguous(&cursor.token, targets), None),
        Resolution::Unresolved => {
            let element = index.get_element(&cursor.token)?;
            (render_element(&element), Some(element.qualified_id.clone()))
        }
    };
    Some(HoverResult {
        contents,
        qualified_id,
        is_definition: false,
        span: cursor.span,
    })
}

fn lookup(index: &SemanticIndex, target: &Target) -> Option<Arc<ElementReference>> {
    index
        .get_elements(&target.qid.to_string())
        .into_iter()
        .find(|e| e.file == target.file)
}

fn render_element(element: &ElementReference) -> String {
    let mut out = format!("**{}** `{}`", element.kind, element.label);
    let _ = write!(out, "\n\n`{}`", element.qualified_id);
    if let Some(description) = &element.description {
        let _ = write!(out, "\n\n{description}");
    }
    if let Some(technology) = &element.technology {
        let _ = write!(out, "\n\n*Technology:* {technology}");
    }
    let _ = write!(
        out,
        "\n\n*Defined in* `{}` line {}",
        element.path, element.line
    );
    out
}

fn render_local(def: &LocalDefinition) -> String {
    match def.qualified_id() {
        Some(qid) => format!("**{}** `{}`\n\n`{qid}`", def.kind, def.name),
        None => format!("**{}** `{}`", def.kind, def.name),
    }
}

fn render_ambiguous(token: &str, targets: &[Target]) -> String {
    let mut out = format!("`{token}` is ambiguous:");
    for target in targets {
        let _ = write!(out, "\n- `{}`", target.qid);
    }
    out
}
