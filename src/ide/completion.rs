//! Completion suggestions implementation.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::hir::{ElementReference, SemanticIndex};
use crate::syntax::Name;

use super::local_defs::{LocalDefinition, LocalDefinitions};

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    /// An element, local or from the index.
    Element,
    /// An import alias.
    Alias,
    Keyword,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Element => 7, // Class
            CompletionKind::Alias => 9,   // Module
            CompletionKind::Keyword => 14,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Documentation (shown in popup).
    pub documentation: Option<Arc<str>>,
    /// Text to insert (if different from label).
    pub insert_text: Option<Arc<str>>,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            insert_text: None,
            sort_priority: 100,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the documentation.
    pub fn with_documentation(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    /// Set the insert text.
    pub fn with_insert_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.insert_text = Some(text.into());
        self
    }

    /// Set the sort priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }

    fn from_element(element: &ElementReference) -> Self {
        let mut item = Self::new(element.id.as_str(), CompletionKind::Element).with_detail(
            format!("{} {} ({})", element.kind, element.qualified_id, element.path),
        );
        if let Some(description) = &element.description {
            item = item.with_documentation(Arc::clone(description));
        }
        item
    }

    fn from_local(def: &LocalDefinition) -> Self {
        let detail = match def.qualified_id() {
            Some(qid) => format!("{} {qid}", def.kind),
            None => def.kind.to_string(),
        };
        Self::new(def.name.as_str(), CompletionKind::Element).with_detail(detail)
    }
}

const PRIORITY_LOCAL: u32 = 10;
const PRIORITY_ALIAS: u32 = 15;
const PRIORITY_INDEX: u32 = 20;
const PRIORITY_KEYWORD: u32 = 50;

/// Completion candidates for the partially typed reference `prefix`.
///
/// A bare prefix offers local definitions, import aliases, indexed elements
/// from other files, then keywords. A dotted prefix `Qualifier.part` offers
/// the children of whatever `Qualifier` names: an import alias (top-level
/// elements of the imported file) or an element. Matching ignores case.
pub fn completions(
    defs: &LocalDefinitions,
    index: &SemanticIndex,
    path: &str,
    prefix: &str,
) -> Vec<CompletionItem> {
    let mut items = match prefix.rsplit_once('.') {
        Some((qualifier, partial)) => member_completions(defs, index, path, qualifier, partial),
        None => general_completions(defs, index, path, prefix),
    };

    items.sort_by(|a, b| {
        a.sort_priority
            .cmp(&b.sort_priority)
            .then_with(|| a.label.cmp(&b.label))
    });
    // first occurrence wins, so local beats index for the same label
    let mut seen = FxHashSet::default();
    items.retain(|item| seen.insert(Arc::clone(&item.label)));
    items
}

fn matches(label: &str, partial: &str) -> bool {
    label.to_lowercase().starts_with(&partial.to_lowercase())
}

fn general_completions(
    defs: &LocalDefinitions,
    index: &SemanticIndex,
    path: &str,
    partial: &str,
) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = defs
        .iter()
        .filter(|d| d.kind.element_kind().is_some() && matches(&d.name, partial))
        .map(|d| CompletionItem::from_local(d).with_priority(PRIORITY_LOCAL))
        .collect();

    for (alias, target) in index.get_import_aliases(path) {
        if matches(&alias, partial) {
            items.push(
                CompletionItem::new(alias.as_str(), CompletionKind::Alias)
                    .with_detail(format!("import {target}"))
                    .with_priority(PRIORITY_ALIAS),
            );
        }
    }

    let own = index.file_id(path);
    items.extend(
        index
            .get_by_prefix(partial)
            .iter()
            .filter(|e| Some(e.file) != own)
            .map(|e| CompletionItem::from_element(e).with_priority(PRIORITY_INDEX)),
    );

    items.extend(keyword_completions().into_iter().filter(|k| matches(&k.label, partial)));
    items
}

fn member_completions(
    defs: &LocalDefinitions,
    index: &SemanticIndex,
    path: &str,
    qualifier: &str,
    partial: &str,
) -> Vec<CompletionItem> {
    let mut items = Vec::new();

    // the local map still works while the document does not parse
    let segments: Vec<Name> = qualifier.split('.').map(Name::from).collect();
    items.extend(
        defs.iter()
            .filter(|d| d.scope == segments && matches(&d.name, partial))
            .map(|d| CompletionItem::from_local(d).with_priority(PRIORITY_LOCAL)),
    );

    let aliased = index
        .get_import_aliases(path)
        .into_iter()
        .find(|(alias, _)| alias == qualifier);
    let children: Vec<Arc<ElementReference>> = match aliased {
        Some((_, target)) => index
            .elements_in_file(&target)
            .into_iter()
            .filter(|e| e.qualified_id.is_top_level())
            .collect(),
        None => match index.resolve_qualified_id(qualifier, path) {
            Some(parent) => index
                .get_qualified_elements(&parent.qualified_id.to_string())
                .into_iter()
                .filter(|e| e.file == parent.file)
                .collect(),
            None => Vec::new(),
        },
    };
    items.extend(
        children
            .iter()
            .filter(|e| matches(&e.id, partial))
            .map(|e| CompletionItem::from_element(e).with_priority(PRIORITY_INDEX)),
    );
    items
}

/// Get keyword completions.
fn keyword_completions() -> Vec<CompletionItem> {
    let keywords = [
        ("system", "system ${1:Name} {\n\t$0\n}"),
        ("container", "container ${1:Name} {\n\t$0\n}"),
        ("component", "component ${1:Name}"),
        ("datastore", "datastore ${1:Name}"),
        ("queue", "queue ${1:Name}"),
        ("person", "person ${1:Name}"),
        ("scenario", "scenario ${1:Name} {\n\t$0\n}"),
        ("adr", "adr ${1:Name} \"${2:Title}\" {\n\tstatus \"${3:proposed}\"\n}"),
        ("import", "import \"${1:path}\" as ${2:Alias}"),
        ("description", "description \"$1\""),
        ("technology", "technology \"$1\""),
        ("metadata", "metadata {\n\t${1:key}: \"$2\"\n}"),
        ("architecture", "architecture \"${1:Name}\" {\n\t$0\n}"),
    ];

    keywords
        .iter()
        .map(|(label, snippet)| {
            CompletionItem::new(*label, CompletionKind::Keyword)
                .with_insert_text(*snippet)
                .with_priority(PRIORITY_KEYWORD)
        })
        .collect()
}
