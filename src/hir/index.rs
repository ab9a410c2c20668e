//! Semantic index: the cross-file element table behind navigation features.
//!
//! Entries are partitioned by defining file. Re-indexing a file removes every
//! entry it contributed, from every secondary map, before inserting the new
//! set, all under one write lock, so readers never observe a half-replaced
//! file and repeated edits never leave stale duplicates.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::ids::{QualifiedId, Target};
use super::resolve::{ExternalLookup, ImportEdge, ImportGraph, ModelSet};
use crate::base::{FileId, FileSet, Span, normalize_path, resolve_import_path};
use crate::syntax::{Declared, ElementKind, Model, Name};

/// One indexed element declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementReference {
    /// Local identifier.
    pub id: Name,
    pub kind: ElementKind,
    /// Label, or the identifier when none was given.
    pub label: Arc<str>,
    pub description: Option<Arc<str>>,
    pub technology: Option<Arc<str>>,
    pub file: FileId,
    /// Normalized path of the defining file.
    pub path: Arc<str>,
    /// 1-based line of the identifier.
    pub line: u32,
    /// 1-based column of the identifier.
    pub column: u32,
    /// Identifier range, 0-based.
    pub span: Span,
    pub qualified_id: QualifiedId,
    /// Name of the architecture (model) declaring the element.
    pub architecture: Arc<str>,
}

impl ElementReference {
    pub fn target(&self) -> Target {
        Target::new(self.file, self.qualified_id.clone())
    }
}

/// An import of an indexed file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportBinding {
    pub alias: Option<Name>,
    /// Normalized path of the imported file.
    pub path: Arc<str>,
    pub target: FileId,
    pub span: Span,
}

#[derive(Debug)]
struct FileEntry {
    model: Arc<Model>,
    elements: Vec<Arc<ElementReference>>,
    imports: Vec<ImportBinding>,
}

#[derive(Debug, Default)]
struct IndexState {
    files: FileSet,
    entries: FxHashMap<FileId, FileEntry>,
    by_id: FxHashMap<Name, Vec<Arc<ElementReference>>>,
    by_qualified: FxHashMap<QualifiedId, Vec<Arc<ElementReference>>>,
    by_kind: FxHashMap<ElementKind, Vec<Arc<ElementReference>>>,
    by_architecture: FxHashMap<Arc<str>, Vec<Arc<ElementReference>>>,
}

impl IndexState {
    fn remove(&mut self, file: FileId) -> Option<FileEntry> {
        let entry = self.entries.remove(&file)?;
        let keep = |r: &Arc<ElementReference>| r.file != file;
        for element in &entry.elements {
            prune(&mut self.by_id, &element.id, keep);
            prune(&mut self.by_qualified, &element.qualified_id, keep);
            prune(&mut self.by_kind, &element.kind, keep);
            prune(&mut self.by_architecture, &element.architecture, keep);
        }
        Some(entry)
    }

    fn insert(&mut self, file: FileId, entry: FileEntry) {
        for element in &entry.elements {
            self.by_id
                .entry(element.id.clone())
                .or_default()
                .push(Arc::clone(element));
            self.by_qualified
                .entry(element.qualified_id.clone())
                .or_default()
                .push(Arc::clone(element));
            self.by_kind
                .entry(element.kind)
                .or_default()
                .push(Arc::clone(element));
            self.by_architecture
                .entry(Arc::clone(&element.architecture))
                .or_default()
                .push(Arc::clone(element));
        }
        self.entries.insert(file, entry);
    }
}

fn prune<K: std::hash::Hash + Eq>(
    map: &mut FxHashMap<K, Vec<Arc<ElementReference>>>,
    key: &K,
    keep: impl Fn(&Arc<ElementReference>) -> bool,
) {
    if let Some(list) = map.get_mut(key) {
        list.retain(|r| keep(r));
        if list.is_empty() {
            map.remove(key);
        }
    }
}

/// Sort by file, then position, so results do not depend on indexing order.
fn sorted(mut elements: Vec<Arc<ElementReference>>) -> Vec<Arc<ElementReference>> {
    elements.sort_by(|a, b| {
        (&*a.path, a.line, a.column).cmp(&(&*b.path, b.line, b.column))
    });
    elements
}

/// Concurrent, file-partitioned element table.
///
/// Owned by whoever constructs it and passed by reference; there is no global
/// instance.
#[derive(Debug, Default)]
pub struct SemanticIndex {
    state: RwLock<IndexState>,
}

impl SemanticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a path (normalized) and return its id.
    pub fn intern(&self, path: &str) -> FileId {
        let path = normalize_path(path);
        if let Some(file) = self.state.read().files.get(&path) {
            return file;
        }
        self.state.write().files.intern(&path)
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.state.read().files.get(&normalize_path(path))
    }

    pub fn path(&self, file: FileId) -> Option<Arc<str>> {
        self.state.read().files.path(file).cloned()
    }

    /// Replace every entry of `path` with the elements of `model`.
    pub fn index_file(&self, path: &str, model: Arc<Model>) -> FileId {
        let path = normalize_path(path);
        let mut state = self.state.write();
        let file = state.files.intern(&path);
        let path: Arc<str> = Arc::from(path);

        let architecture: Arc<str> = match &model.name {
            Some(name) => Arc::clone(name),
            None => Arc::from(
                Path::new(&*path)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
        };

        let elements: Vec<Arc<ElementReference>> = model
            .walk()
            .into_iter()
            .filter_map(|(segments, element)| {
                let qualified_id = QualifiedId::new(segments)?;
                let decl = element.decl();
                let (line, column) = decl.name_span.start.one_based();
                Some(Arc::new(ElementReference {
                    id: decl.name.clone(),
                    kind: element.kind(),
                    label: Arc::from(element.label()),
                    description: decl.description.clone(),
                    technology: decl.technology.clone(),
                    file,
                    path: Arc::clone(&path),
                    line,
                    column,
                    span: decl.name_span,
                    qualified_id,
                    architecture: Arc::clone(&architecture),
                }))
            })
            .collect();

        let imports = model
            .imports
            .iter()
            .map(|import| {
                let target_path = resolve_import_path(&path, &import.path);
                let target = state.files.intern(&target_path);
                ImportBinding {
                    alias: import.alias.clone(),
                    path: Arc::from(target_path),
                    target,
                    span: import.span,
                }
            })
            .collect();

        let previous = state.remove(file).map(|e| e.elements.len()).unwrap_or(0);
        let count = elements.len();
        state.insert(
            file,
            FileEntry {
                model,
                elements,
                imports,
            },
        );
        tracing::debug!(path = %path, removed = previous, inserted = count, "indexed file");
        file
    }

    /// Drop every entry of `path`. Returns whether the file was indexed.
    pub fn remove_file(&self, path: &str) -> bool {
        let mut state = self.state.write();
        let Some(file) = state.files.get(&normalize_path(path)) else {
            return false;
        };
        let removed = state.remove(file);
        if let Some(entry) = &removed {
            tracing::debug!(path, removed = entry.elements.len(), "removed file from index");
        }
        removed.is_some()
    }

    pub fn contains_file(&self, path: &str) -> bool {
        let state = self.state.read();
        state
            .files
            .get(&normalize_path(path))
            .is_some_and(|file| state.entries.contains_key(&file))
    }

    /// First element whose qualified id or local identifier equals `id`.
    pub fn get_element(&self, id: &str) -> Option<Arc<ElementReference>> {
        self.get_elements(id).into_iter().next()
    }

    /// Every element whose qualified id equals `id`, or failing that, whose
    /// local identifier does.
    pub fn get_elements(&self, id: &str) -> Vec<Arc<ElementReference>> {
        let state = self.state.read();
        if let Some(found) = QualifiedId::parse(id).and_then(|qid| state.by_qualified.get(&qid)) {
            return sorted(found.clone());
        }
        state
            .by_id
            .get(id)
            .map(|found| sorted(found.clone()))
            .unwrap_or_default()
    }

    pub fn get_by_type(&self, kind: ElementKind) -> Vec<Arc<ElementReference>> {
        let state = self.state.read();
        sorted(state.by_kind.get(&kind).cloned().unwrap_or_default())
    }

    /// Elements whose identifier starts with `prefix`, ignoring case.
    pub fn get_by_prefix(&self, prefix: &str) -> Vec<Arc<ElementReference>> {
        let prefix = prefix.to_lowercase();
        let state = self.state.read();
        let found = state
            .by_id
            .iter()
            .filter(|(id, _)| id.to_lowercase().starts_with(&prefix))
            .flat_map(|(_, list)| list.iter().cloned())
            .collect();
        sorted(found)
    }

    pub fn get_by_architecture(&self, name: &str) -> Vec<Arc<ElementReference>> {
        let state = self.state.read();
        sorted(state.by_architecture.get(name).cloned().unwrap_or_default())
    }

    /// Elements nested directly under `prefix`. An empty prefix lists
    /// top-level elements.
    pub fn get_qualified_elements(&self, prefix: &str) -> Vec<Arc<ElementReference>> {
        let parent: Vec<&str> = if prefix.is_empty() {
            Vec::new()
        } else {
            prefix.split('.').collect()
        };
        let state = self.state.read();
        let found = state
            .by_qualified
            .iter()
            .filter(|(qid, _)| {
                let segments = qid.segments();
                segments.len() == parent.len() + 1
                    && segments.iter().zip(&parent).all(|(a, b)| a == b)
            })
            .flat_map(|(_, list)| list.iter().cloned())
            .collect();
        sorted(found)
    }

    /// Resolve a qualified id as written in `from_path`.
    ///
    /// `Alias.rest` goes through the file's import aliases; otherwise the file
    /// itself, then its unaliased imports, then any indexed file declaring
    /// exactly that id.
    pub fn resolve_qualified_id(&self, qualified_id: &str, from_path: &str) -> Option<Arc<ElementReference>> {
        let qid = QualifiedId::parse(qualified_id)?;
        let state = self.state.read();
        let from = state.files.get(&normalize_path(from_path));
        let imports = from
            .and_then(|file| state.entries.get(&file))
            .map(|entry| entry.imports.as_slice())
            .unwrap_or(&[]);
        let in_file = |file: FileId, qid: &QualifiedId| {
            state
                .by_qualified
                .get(qid)
                .and_then(|list| list.iter().find(|r| r.file == file).cloned())
        };

        let aliased = qid
            .segments()
            .split_first()
            .filter(|(_, rest)| !rest.is_empty());
        if let Some((alias, rest)) = aliased {
            let rest = QualifiedId::new(rest.to_vec())?;
            for import in imports.iter().filter(|i| i.alias.as_ref() == Some(alias)) {
                if let Some(found) = in_file(import.target, &rest) {
                    return Some(found);
                }
            }
        }

        if let Some(found) = from.and_then(|file| in_file(file, &qid)) {
            return Some(found);
        }
        for import in imports.iter().filter(|i| i.alias.is_none()) {
            if let Some(found) = in_file(import.target, &qid) {
                return Some(found);
            }
        }
        state
            .by_qualified
            .get(&qid)
            .filter(|list| list.len() == 1)
            .and_then(|list| list.first().cloned())
    }

    /// Alias → imported path for every aliased import of `path`.
    pub fn get_import_aliases(&self, path: &str) -> Vec<(Name, Arc<str>)> {
        self.imports(path)
            .into_iter()
            .filter_map(|import| Some((import.alias?, import.path)))
            .collect()
    }

    /// Every import of `path`, in declaration order.
    pub fn imports(&self, path: &str) -> Vec<ImportBinding> {
        let state = self.state.read();
        state
            .files
            .get(&normalize_path(path))
            .and_then(|file| state.entries.get(&file))
            .map(|entry| entry.imports.clone())
            .unwrap_or_default()
    }

    /// Import edges of every indexed file.
    pub fn import_graph(&self) -> ImportGraph {
        let state = self.state.read();
        state
            .entries
            .iter()
            .map(|(file, entry)| {
                let edges = entry
                    .imports
                    .iter()
                    .map(|i| ImportEdge::new(i.target, i.alias.clone()))
                    .collect();
                (*file, edges)
            })
            .collect()
    }

    /// The model last indexed for `path`.
    pub fn model(&self, path: &str) -> Option<Arc<Model>> {
        let state = self.state.read();
        let file = state.files.get(&normalize_path(path))?;
        state.entries.get(&file).map(|e| Arc::clone(&e.model))
    }

    /// Every indexed model, ordered by file id.
    pub fn models(&self) -> ModelSet {
        let state = self.state.read();
        let mut models: ModelSet = state
            .entries
            .iter()
            .map(|(file, entry)| (*file, Arc::clone(&entry.model)))
            .collect();
        models.sort_keys();
        models
    }

    pub fn elements_in_file(&self, path: &str) -> Vec<Arc<ElementReference>> {
        let state = self.state.read();
        state
            .files
            .get(&normalize_path(path))
            .and_then(|file| state.entries.get(&file))
            .map(|entry| entry.elements.clone())
            .unwrap_or_default()
    }

    /// Every entry, ordered by file and position.
    pub fn all_elements(&self) -> Vec<Arc<ElementReference>> {
        let state = self.state.read();
        sorted(
            state
                .entries
                .values()
                .flat_map(|entry| entry.elements.iter().cloned())
                .collect(),
        )
    }

    /// Paths of every indexed file, sorted.
    pub fn indexed_paths(&self) -> Vec<Arc<str>> {
        let state = self.state.read();
        let mut paths: Vec<Arc<str>> = state
            .entries
            .keys()
            .filter_map(|file| state.files.path(*file).cloned())
            .collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.values().map(|e| e.elements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_count(&self) -> usize {
        self.state.read().entries.len()
    }
}

impl ExternalLookup for SemanticIndex {
    fn lookup_qualified(&self, qid: &QualifiedId) -> Vec<Target> {
        let state = self.state.read();
        state
            .by_qualified
            .get(qid)
            .map(|list| list.iter().map(|r| r.target()).collect())
            .unwrap_or_default()
    }
}
