//! Name resolution: binding references to the elements they denote.
//!
//! Each file gets a flat name table per scope level (model root, then one per
//! element that owns children). A reference is resolved by walking outward
//! from the element whose body contains it:
//!
//! 1. `Alias.rest` with `Alias` bound by an import of the current file:
//!    `rest` is resolved from the imported model's root.
//! 2. The enclosing scope, then each parent scope, up to the model root.
//!    The innermost level with a match wins. Several matches at one level
//!    are ambiguous.
//! 3. Imports without an alias, as an extra scope after the root.
//! 4. Top-level elements of every other file (workspace fallback).
//!
//! The model is never touched. Results land in a [`Bindings`] side table so
//! a re-parsed file can be re-resolved without dangling pointers.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use super::ids::{QualifiedId, Target};
use crate::base::{FileId, Position, Span};
use crate::syntax::{Declared, Model, Name, Reference, Relation};

/// Parsed models by file, in a stable order.
pub type ModelSet = IndexMap<FileId, Arc<Model>>;

/// Import edges by importing file.
pub type ImportGraph = FxHashMap<FileId, Vec<ImportEdge>>;

/// `import "path" as alias`, with the path already mapped to a file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImportEdge {
    pub target: FileId,
    pub alias: Option<Name>,
}

impl ImportEdge {
    pub fn new(target: FileId, alias: Option<Name>) -> Self {
        Self { target, alias }
    }
}

// ============================================================================
// RESOLUTION RESULT
// ============================================================================

/// Outcome of resolving one reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Target),
    Unresolved,
    /// Several candidates at the deciding level, in declaration order.
    Ambiguous(Vec<Target>),
}

impl Resolution {
    pub fn target(&self) -> Option<&Target> {
        match self {
            Resolution::Resolved(target) => Some(target),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous(_))
    }

    /// Every target this resolution could mean.
    pub fn candidates(&self) -> &[Target] {
        match self {
            Resolution::Resolved(target) => std::slice::from_ref(target),
            Resolution::Unresolved => &[],
            Resolution::Ambiguous(targets) => targets,
        }
    }

    /// Several hits stay ambiguous even when they share a target: duplicate
    /// siblings have the same qualified id.
    fn from_hits(mut hits: Vec<Target>) -> Self {
        match hits.len() {
            0 => Resolution::Unresolved,
            1 => Resolution::Resolved(hits.remove(0)),
            _ => Resolution::Ambiguous(hits),
        }
    }
}

// ============================================================================
// BINDINGS (side table)
// ============================================================================

/// Where a relation came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelationOrigin {
    /// Declared at model root or in an element body.
    Declared,
    /// A step of the named scenario.
    ScenarioStep(Name),
}

/// A reference token and what it resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundReference {
    pub reference: Reference,
    pub resolution: Resolution,
}

/// A relation with both endpoints resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundRelation {
    pub origin: RelationOrigin,
    /// Element whose body declares the relation; `None` at root and in scenarios.
    pub scope: Option<QualifiedId>,
    pub from: BoundReference,
    pub to: BoundReference,
    pub span: Span,
}

impl BoundRelation {
    /// Both endpoints, if both resolved.
    pub fn edge(&self) -> Option<(&Target, &Target)> {
        Some((self.from.resolution.target()?, self.to.resolution.target()?))
    }
}

/// Resolution results for one file, in declaration order: model relations
/// (root first, then element bodies pre-order), then scenario steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bindings {
    pub file: FileId,
    pub relations: Vec<BoundRelation>,
}

impl Bindings {
    pub fn empty(file: FileId) -> Self {
        Self {
            file,
            relations: Vec::new(),
        }
    }

    pub fn declared(&self) -> impl Iterator<Item = &BoundRelation> {
        self.relations
            .iter()
            .filter(|r| r.origin == RelationOrigin::Declared)
    }

    pub fn scenario_steps(&self) -> impl Iterator<Item = &BoundRelation> {
        self.relations
            .iter()
            .filter(|r| matches!(r.origin, RelationOrigin::ScenarioStep(_)))
    }

    /// Every bound reference, `from` before `to`.
    pub fn references(&self) -> impl Iterator<Item = &BoundReference> {
        self.relations.iter().flat_map(|r| [&r.from, &r.to])
    }

    /// The reference token covering `position`.
    pub fn reference_at(&self, position: Position) -> Option<&BoundReference> {
        self.references().find(|r| r.reference.span.contains(position))
    }

    pub fn unresolved_count(&self) -> usize {
        self.references()
            .filter(|r| !r.resolution.is_resolved())
            .count()
    }
}

// ============================================================================
// SCOPE TABLES
// ============================================================================

/// Lookup of declarations that live outside the models handed to the
/// resolver, e.g. files only present in the semantic index.
pub trait ExternalLookup: Sync {
    /// Every element declared under exactly this qualified id.
    fn lookup_qualified(&self, qid: &QualifiedId) -> Vec<Target>;
}

/// Per-file name tables, one per scope level.
#[derive(Debug, Default)]
struct ScopeTable {
    /// Scope path (empty = root) → local name → declarations with that name.
    levels: FxHashMap<Vec<Name>, IndexMap<Name, Vec<QualifiedId>>>,
}

impl ScopeTable {
    fn build(model: &Model) -> Self {
        let mut levels: FxHashMap<Vec<Name>, IndexMap<Name, Vec<QualifiedId>>> =
            FxHashMap::default();

        let root = levels.entry(Vec::new()).or_default();
        for element in &model.elements {
            root.entry(element.name().clone())
                .or_default()
                .push(QualifiedId::root(element.name().clone()));
        }

        for (path, element) in model.walk() {
            if element.children().is_empty() {
                continue;
            }
            let Some(parent) = QualifiedId::new(path.clone()) else {
                continue;
            };
            let level = levels.entry(path).or_default();
            for child in element.children() {
                level
                    .entry(child.name().clone())
                    .or_default()
                    .push(parent.child(child.name().clone()));
            }
        }

        Self { levels }
    }

    fn lookup(&self, scope: &[Name], name: &str) -> &[QualifiedId] {
        self.levels
            .get(scope)
            .and_then(|level| level.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Follow `rest` down from `start` through child tables.
    fn descend(&self, start: &QualifiedId, rest: &[Name]) -> Vec<QualifiedId> {
        let mut current = vec![start.clone()];
        for segment in rest {
            current = current
                .iter()
                .flat_map(|qid| self.lookup(qid.segments(), segment).iter().cloned())
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Resolve a path written from the root of this file.
    fn from_root(&self, segments: &[Name]) -> Vec<QualifiedId> {
        let Some((first, rest)) = segments.split_first() else {
            return Vec::new();
        };
        self.lookup(&[], first)
            .iter()
            .flat_map(|qid| self.descend(qid, rest))
            .collect()
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolves references across a set of models linked by imports.
pub struct Resolver<'a> {
    imports: &'a ImportGraph,
    models: &'a ModelSet,
    scopes: FxHashMap<FileId, ScopeTable>,
    workspace_fallback: bool,
    external: Option<&'a dyn ExternalLookup>,
}

impl<'a> Resolver<'a> {
    pub fn new(models: &'a ModelSet, imports: &'a ImportGraph) -> Self {
        let scopes = models
            .iter()
            .map(|(file, model)| (*file, ScopeTable::build(model)))
            .collect();
        Self {
            imports,
            models,
            scopes,
            workspace_fallback: true,
            external: None,
        }
    }

    /// Toggle lookup of top-level elements in files that are not imported.
    pub fn with_workspace_fallback(mut self, enabled: bool) -> Self {
        self.workspace_fallback = enabled;
        self
    }

    /// Consult `external` during workspace fallback.
    pub fn with_external(mut self, external: &'a dyn ExternalLookup) -> Self {
        self.external = Some(external);
        self
    }

    /// Resolve every relation endpoint and scenario step of one file.
    pub fn resolve_file(&self, file: FileId) -> Option<Bindings> {
        let model = self.models.get(&file)?;
        let mut bindings = Bindings::empty(file);

        for (path, relation) in model.all_relations() {
            let scope = QualifiedId::new(path.clone());
            bindings.relations.push(self.bind(
                file,
                &path,
                relation,
                RelationOrigin::Declared,
                scope,
            ));
        }
        for scenario in &model.scenarios {
            for step in &scenario.steps {
                bindings.relations.push(self.bind(
                    file,
                    &[],
                    step,
                    RelationOrigin::ScenarioStep(scenario.name.clone()),
                    None,
                ));
            }
        }

        tracing::trace!(
            %file,
            relations = bindings.relations.len(),
            unresolved = bindings.unresolved_count(),
            "resolved file"
        );
        Some(bindings)
    }

    /// Resolve every file in the set.
    pub fn resolve_all(&self) -> IndexMap<FileId, Bindings> {
        self.models
            .keys()
            .filter_map(|file| Some((*file, self.resolve_file(*file)?)))
            .collect()
    }

    fn bind(
        &self,
        file: FileId,
        scope_path: &[Name],
        relation: &Relation,
        origin: RelationOrigin,
        scope: Option<QualifiedId>,
    ) -> BoundRelation {
        let bind_one = |reference: &Reference| BoundReference {
            reference: reference.clone(),
            resolution: self.resolve_reference(file, scope_path, reference),
        };
        BoundRelation {
            origin,
            scope,
            from: bind_one(&relation.from),
            to: bind_one(&relation.to),
            span: relation.span,
        }
    }

    /// Resolve `reference` as written inside the element at `scope`
    /// (empty = model root) of `file`.
    pub fn resolve_reference(&self, file: FileId, scope: &[Name], reference: &Reference) -> Resolution {
        let mut visited = FxHashSet::default();
        visited.insert(file);
        let mut resolution = self.resolve_in(file, scope, &reference.segments, &mut visited);
        if resolution == Resolution::Unresolved && self.workspace_fallback {
            resolution = self.resolve_fallback(file, &reference.segments);
        }
        if resolution == Resolution::Unresolved {
            tracing::debug!(%file, reference = %reference, "unresolved reference");
        }
        resolution
    }

    /// Steps 1 to 3. `file` must already be in `visited`.
    fn resolve_in(
        &self,
        file: FileId,
        scope: &[Name],
        segments: &[Name],
        visited: &mut FxHashSet<FileId>,
    ) -> Resolution {
        let Some(table) = self.scopes.get(&file) else {
            return Resolution::Unresolved;
        };
        let Some((first, rest)) = segments.split_first() else {
            return Resolution::Unresolved;
        };
        let edges = self.imports.get(&file).map(Vec::as_slice).unwrap_or(&[]);

        if !rest.is_empty() {
            for edge in edges.iter().filter(|e| e.alias.as_ref() == Some(first)) {
                match self.resolve_in_import(edge.target, rest, visited) {
                    Resolution::Unresolved => {}
                    found => {
                        tracing::trace!(%file, alias = %first, "resolved through import alias");
                        return found;
                    }
                }
            }
        }

        let local = self.resolve_local(file, table, scope, first, rest);
        if local != Resolution::Unresolved {
            return local;
        }

        let mut hits = Vec::new();
        for edge in edges.iter().filter(|e| e.alias.is_none()) {
            match self.resolve_in_import(edge.target, segments, visited) {
                // the same file may be imported twice
                Resolution::Resolved(target) if !hits.contains(&target) => hits.push(target),
                Resolution::Resolved(_) => {}
                Resolution::Ambiguous(targets) => return Resolution::Ambiguous(targets),
                Resolution::Unresolved => {}
            }
        }
        Resolution::from_hits(hits)
    }

    /// Resolve from the root of an imported file. A file already on the
    /// current resolution chain is skipped.
    fn resolve_in_import(
        &self,
        file: FileId,
        segments: &[Name],
        visited: &mut FxHashSet<FileId>,
    ) -> Resolution {
        if !visited.insert(file) {
            tracing::trace!(%file, "import cycle, skipping");
            return Resolution::Unresolved;
        }
        let resolution = self.resolve_in(file, &[], segments, visited);
        visited.remove(&file);
        resolution
    }

    fn resolve_local(
        &self,
        file: FileId,
        table: &ScopeTable,
        scope: &[Name],
        first: &Name,
        rest: &[Name],
    ) -> Resolution {
        let mut level = scope;
        loop {
            let hits = table.lookup(level, first);
            if !hits.is_empty() {
                let found: Vec<Target> = hits
                    .iter()
                    .flat_map(|qid| table.descend(qid, rest))
                    .map(|qid| Target::new(file, qid))
                    .collect();
                if !found.is_empty() {
                    tracing::trace!(%file, name = %first, level = level.len(), "scope hit");
                    return Resolution::from_hits(found);
                }
            }
            match level.split_last() {
                Some((_, parent)) => level = parent,
                None => return Resolution::Unresolved,
            }
        }
    }

    fn resolve_fallback(&self, file: FileId, segments: &[Name]) -> Resolution {
        let mut hits: Vec<Target> = Vec::new();
        for (other, table) in &self.scopes {
            if *other == file {
                continue;
            }
            hits.extend(
                table
                    .from_root(segments)
                    .into_iter()
                    .map(|qid| Target::new(*other, qid)),
            );
        }
        if let (Some(external), Some(qid)) = (self.external, QualifiedId::new(segments.to_vec())) {
            hits.extend(
                external
                    .lookup_qualified(&qid)
                    .into_iter()
                    .filter(|t| t.file != file && !self.scopes.contains_key(&t.file)),
            );
        }
        // FxHashMap iteration order is arbitrary
        hits.sort();
        let resolution = Resolution::from_hits(hits);
        if resolution != Resolution::Unresolved {
            tracing::trace!(%file, "resolved through workspace fallback");
        }
        resolution
    }
}

/// Resolve a single model on its own.
pub fn resolve(file: FileId, model: &Arc<Model>) -> Bindings {
    let mut models = ModelSet::default();
    models.insert(file, Arc::clone(model));
    let imports = ImportGraph::default();
    Resolver::new(&models, &imports)
        .resolve_file(file)
        .unwrap_or_else(|| Bindings::empty(file))
}

/// Resolve every model of a workspace against the others.
pub fn resolve_workspace(models: &ModelSet, imports: &ImportGraph) -> IndexMap<FileId, Bindings> {
    Resolver::new(models, imports).resolve_all()
}
