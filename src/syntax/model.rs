//! The per-file model and its non-element declarations.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use super::element::{Declared, Element};
use crate::base::Span;

/// A local identifier.
pub type Name = SmolStr;

/// An identifier token as written in source: `Api` or `Shop.Web.Api`.
///
/// Whether it is short or fully qualified is only known after resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Dot-separated segments; never empty.
    pub segments: Vec<Name>,
    pub span: Span,
}

impl Reference {
    pub fn new(segments: Vec<Name>, span: Span) -> Self {
        debug_assert!(!segments.is_empty(), "reference without segments");
        Self { segments, span }
    }

    /// Parse `A.B.C` into a reference. Returns `None` for empty segments.
    pub fn parse(text: &str, span: Span) -> Option<Self> {
        let segments: Vec<Name> = text.split('.').map(Name::from).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments, span })
    }

    pub fn first(&self) -> &Name {
        &self.segments[0]
    }

    pub fn last(&self) -> &Name {
        &self.segments[self.segments.len() - 1]
    }

    pub fn is_dotted(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// A directed edge `from -> to`.
///
/// Endpoints stay unresolved references; the resolver binds them in a side
/// table so the same relation can resolve differently across edits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    pub from: Reference,
    pub to: Reference,
    pub verb: Option<Name>,
    pub label: Option<Arc<str>>,
    pub span: Span,
}

impl Relation {
    pub fn new(from: Reference, to: Reference) -> Self {
        let span = from.span.cover(to.span);
        Self {
            from,
            to,
            verb: None,
            label: None,
            span,
        }
    }
}

/// `import "path" as Alias`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    /// The path as written, relative to the importing file.
    pub path: Arc<str>,
    pub alias: Option<Name>,
    pub span: Span,
}

/// A named sequence of interaction steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub name: Name,
    pub name_span: Span,
    pub label: Option<Arc<str>>,
    pub steps: Vec<Relation>,
    pub span: Span,
}

/// An architecture decision record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub name: Name,
    pub name_span: Span,
    pub title: Option<Arc<str>>,
    pub status: Option<Arc<str>>,
    pub description: Option<Arc<str>>,
    pub span: Span,
}

/// One parsed source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    /// Name from an `architecture "..." { }` wrapper, if present.
    pub name: Option<Arc<str>>,
    pub imports: Vec<Import>,
    pub elements: Vec<Element>,
    /// Relations declared at model root.
    pub relations: Vec<Relation>,
    pub scenarios: Vec<Scenario>,
    pub decisions: Vec<Decision>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level element with the given identifier (first in declaration order).
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name() == name)
    }

    /// Follow a path of local identifiers from the root.
    pub fn find(&self, path: &[Name]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        let mut current = self.element(first)?;
        for segment in rest {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// Every element with its path from the root, pre-order in declaration order.
    pub fn walk(&self) -> Vec<(Vec<Name>, &Element)> {
        fn visit<'m>(
            element: &'m Element,
            prefix: &[Name],
            out: &mut Vec<(Vec<Name>, &'m Element)>,
        ) {
            let mut path = prefix.to_vec();
            path.push(element.name().clone());
            out.push((path.clone(), element));
            for child in element.children() {
                visit(child, &path, out);
            }
        }

        let mut out = Vec::new();
        for element in &self.elements {
            visit(element, &[], &mut out);
        }
        out
    }

    /// Every relation in the model: root relations first, then element bodies
    /// in pre-order. Scenario steps are not included.
    pub fn all_relations(&self) -> Vec<(Vec<Name>, &Relation)> {
        let mut out: Vec<(Vec<Name>, &Relation)> =
            self.relations.iter().map(|r| (Vec::new(), r)).collect();
        for (path, element) in self.walk() {
            for relation in element.relations() {
                out.push((path.clone(), relation));
            }
        }
        out
    }
}
