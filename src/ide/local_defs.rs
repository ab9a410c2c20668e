//! Per-document definition map.
//!
//! Built by one linear pass over the token stream, tracking a stack of open
//! blocks. It does not need a successful parse, so outline and hover keep
//! working while the document is broken, and it never consults the
//! semantic index.

use std::fmt;

use crate::base::{LineIndex, Position, Span};
use crate::hir::QualifiedId;
use crate::parser::{TokenKind, tokenize};
use crate::syntax::{ElementKind, Name};

/// What a local definition declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Element(ElementKind),
    Scenario,
    Decision,
}

impl DefinitionKind {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::ScenarioKw => Some(Self::Scenario),
            TokenKind::AdrKw => Some(Self::Decision),
            other => other.element_kind().map(Self::Element),
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Self::Element(kind) => kind.display(),
            Self::Scenario => "scenario",
            Self::Decision => "decision",
        }
    }

    /// LSP `SymbolKind` number.
    pub fn to_lsp(self) -> u32 {
        match self {
            Self::Element(ElementKind::System) => 2,     // Module
            Self::Element(ElementKind::Container) => 3,  // Namespace
            Self::Element(ElementKind::Component) => 5,  // Class
            Self::Element(ElementKind::DataStore) => 23, // Struct
            Self::Element(ElementKind::Queue) => 24,     // Event
            Self::Element(ElementKind::Person) => 19,    // Object
            Self::Scenario => 12,                        // Function
            Self::Decision => 15,                        // String
        }
    }

    pub fn element_kind(self) -> Option<ElementKind> {
        match self {
            Self::Element(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

/// One definition found by the scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDefinition {
    pub name: Name,
    pub kind: DefinitionKind,
    /// The identifier.
    pub name_span: Span,
    /// Keyword to closing brace, or to the end of the header without a body.
    pub range: Span,
    /// Names of the enclosing definitions, outermost first.
    pub scope: Vec<Name>,
    /// Index of the enclosing definition.
    pub parent: Option<usize>,
}

impl LocalDefinition {
    /// The id this definition gets in the model. Scenarios and decisions
    /// live in their own namespaces and have none.
    pub fn qualified_id(&self) -> Option<QualifiedId> {
        self.kind.element_kind()?;
        let mut segments = self.scope.clone();
        segments.push(self.name.clone());
        QualifiedId::new(segments)
    }
}

/// Every definition of one document, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalDefinitions {
    defs: Vec<LocalDefinition>,
}

impl LocalDefinitions {
    pub fn build(text: &str, line_index: &LineIndex) -> Self {
        let tokens: Vec<_> = tokenize(text)
            .into_iter()
            .filter(|t| !t.is_trivia())
            .collect();
        let pos = |offset| line_index.position(text, offset);

        let mut defs: Vec<LocalDefinition> = Vec::new();
        // One entry per open brace; `None` for anonymous blocks.
        let mut stack: Vec<Option<usize>> = Vec::new();
        // Definition whose body the next `{` opens.
        let mut pending: Option<usize> = None;

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];
            match token.kind {
                TokenKind::LBrace => stack.push(pending.take()),
                TokenKind::RBrace => {
                    pending = None;
                    if let Some(Some(idx)) = stack.pop() {
                        defs[idx].range.end = pos(token.range.end());
                    }
                }
                TokenKind::MetadataKw | TokenKind::ArchitectureKw => pending = None,
                kind => {
                    let Some(def_kind) = DefinitionKind::from_token(kind) else {
                        i += 1;
                        continue;
                    };
                    let Some(name) = tokens.get(i + 1).filter(|t| t.kind == TokenKind::Ident)
                    else {
                        pending = None;
                        i += 1;
                        continue;
                    };
                    let header_end = match tokens.get(i + 2) {
                        Some(label) if label.kind == TokenKind::String => label.range.end(),
                        _ => name.range.end(),
                    };
                    let scope = stack
                        .iter()
                        .flatten()
                        .map(|idx| defs[*idx].name.clone())
                        .collect();
                    defs.push(LocalDefinition {
                        name: Name::from(name.text),
                        kind: def_kind,
                        name_span: Span::new(pos(name.range.start()), pos(name.range.end())),
                        range: Span::new(pos(token.range.start()), pos(header_end)),
                        scope,
                        parent: stack.iter().rev().flatten().next().copied(),
                    });
                    pending = Some(defs.len() - 1);
                    i += 1;
                }
            }
            i += 1;
        }

        Self { defs }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalDefinition> {
        self.defs.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LocalDefinition> {
        self.defs.get(index)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions with this identifier.
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LocalDefinition> + 'a {
        self.defs.iter().filter(move |d| d.name.as_str() == name)
    }

    /// The definition whose identifier is under the cursor.
    pub fn at(&self, position: Position) -> Option<&LocalDefinition> {
        self.defs.iter().find(|d| d.name_span.contains(position))
    }

    /// Element path whose body encloses `position`; empty at the model root.
    pub fn scope_at(&self, position: Position) -> Vec<Name> {
        self.defs
            .iter()
            .filter(|d| d.kind.element_kind().is_some())
            .filter(|d| d.range.contains(position) && position > d.name_span.end)
            .max_by_key(|d| d.scope.len())
            .map(|d| {
                let mut path = d.scope.clone();
                path.push(d.name.clone());
                path
            })
            .unwrap_or_default()
    }

    /// Indices of the direct children of `parent` (`None` = top level).
    pub fn children_of(&self, parent: Option<usize>) -> Vec<usize> {
        (0..self.defs.len())
            .filter(|idx| self.defs[*idx].parent == parent)
            .collect()
    }
}
