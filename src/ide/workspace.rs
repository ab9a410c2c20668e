//! Workspace: the registry of open documents and the entry point for editor
//! requests.
//!
//! Document mutation goes through one reader/writer lock over the registry.
//! The semantic index has its own lock, so index reads from other requests
//! proceed while a document is being edited. The lock order is always
//! registry first, then index.
//!
//! Parsing is lazy: an edit only drops the cached parse. The next request
//! that needs the model re-parses the document and re-indexes it.
//! Per-document diagnostics resolve the document against its imports
//! (transitively) and the files importing it, not the whole workspace.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockWriteGuard};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{FileId, Position, normalize_path};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::hir::{
    Bindings, Diagnostic, DiagnosticCollector, ImportGraph, ModelSet, QualifiedId, Resolution,
    Resolver, RuleContext, SemanticIndex, Target, Validator,
};
use crate::parser::{DslParser, ModelParser};
use crate::syntax::{Model, Reference};

use super::completion::{self, CompletionItem};
use super::cursor::{CursorContext, token_at};
use super::document::{Document, TextChange};
use super::goto::{self, GotoResult};
use super::hover::{self, HoverResult};
use super::local_defs::LocalDefinition;
use super::references::{self, ReferenceResult};
use super::rename::{self, RenameResult};
use super::symbols::{self, DocumentSymbol, SymbolInfo};
use super::text_utils::reference_prefix;

fn key(uri: &str) -> Arc<str> {
    Arc::from(normalize_path(uri))
}

fn not_open(key: &str) -> Error {
    Error::DocumentNotOpen(key.to_string())
}

/// Models and import edges a resolution pass may look at.
struct Scope {
    models: ModelSet,
    imports: ImportGraph,
    /// Files with an import edge to the scoped file.
    importers: Vec<FileId>,
}

/// Open documents plus the semantic index they feed.
pub struct Workspace {
    documents: RwLock<IndexMap<Arc<str>, Document>>,
    index: Arc<SemanticIndex>,
    config: AnalysisConfig,
    validator: Validator,
    parser: Box<dyn ModelParser>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("documents", &self.documents.read().len())
            .field("indexed_files", &self.index.file_count())
            .field("config", &self.config)
            .field("rules", &self.validator.rule_names())
            .finish()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            documents: RwLock::new(IndexMap::new()),
            index: Arc::new(SemanticIndex::new()),
            validator: Validator::from_config(&config),
            config,
            parser: Box::new(DslParser),
        }
    }

    /// Use another parser front end.
    pub fn with_parser(mut self, parser: impl ModelParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Share an existing index, e.g. one already filled by a loader.
    pub fn with_index(mut self, index: Arc<SemanticIndex>) -> Self {
        self.index = index;
        self
    }

    /// Replace the rule set, e.g. to add custom rules.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn index(&self) -> &Arc<SemanticIndex> {
        &self.index
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub(crate) fn parser(&self) -> &dyn ModelParser {
        self.parser.as_ref()
    }

    // ========================================================================
    // DOCUMENT LIFECYCLE
    // ========================================================================

    /// Open (or reopen) a document. Parsing waits for the first request.
    pub fn open(&self, uri: &str, text: impl Into<String>, version: i32) {
        let key = key(uri);
        tracing::debug!(uri = %key, version, "open document");
        // ids follow open order, not the order of parallel parsing
        self.index.intern(&key);
        self.documents
            .write()
            .insert(Arc::clone(&key), Document::new(key, text, version));
    }

    /// Apply one edit. The cached parse is dropped before this returns.
    pub fn apply_change(&self, uri: &str, version: i32, change: TextChange) -> Result<()> {
        let key = key(uri);
        let mut docs = self.documents.write();
        let doc = docs.get_mut(&*key).ok_or_else(|| not_open(&key))?;
        doc.apply_change(change, version)?;
        tracing::debug!(uri = %key, version, "applied change");
        Ok(())
    }

    /// Stop tracking a document. Its index entries stay: the file still
    /// exists and other files may reference it.
    pub fn close(&self, uri: &str) -> Result<()> {
        let key = key(uri);
        self.documents
            .write()
            .shift_remove(&*key)
            .ok_or_else(|| not_open(&key))?;
        tracing::debug!(uri = %key, "closed document");
        Ok(())
    }

    /// Forget a file entirely: close it and drop its index entries.
    /// Returns whether there was anything to forget.
    pub fn remove(&self, uri: &str) -> bool {
        let key = key(uri);
        let was_open = self.documents.write().shift_remove(&*key).is_some();
        let was_indexed = self.index.remove_file(&key);
        tracing::debug!(uri = %key, was_open, was_indexed, "removed file");
        was_open || was_indexed
    }

    pub fn is_open(&self, uri: &str) -> bool {
        self.documents.read().contains_key(&*key(uri))
    }

    pub fn document_count(&self) -> usize {
        self.documents.read().len()
    }

    /// Normalized paths of the open documents, in opening order.
    pub fn open_documents(&self) -> Vec<Arc<str>> {
        self.documents.read().keys().cloned().collect()
    }

    pub fn text(&self, uri: &str) -> Option<String> {
        self.documents
            .read()
            .get(&*key(uri))
            .map(|doc| doc.text().to_string())
    }

    pub fn version(&self, uri: &str) -> Option<i32> {
        self.documents.read().get(&*key(uri)).map(Document::version)
    }

    // ========================================================================
    // PARSING AND INDEXING
    // ========================================================================

    fn parse_and_index(&self, doc: &mut Document) {
        if !doc.ensure_parsed(self.parser.as_ref()) {
            return;
        }
        match doc.model() {
            Some(model) => {
                self.index.index_file(doc.uri(), model);
            }
            None => {
                if let Some(fatal) = doc.parse_result().and_then(|p| p.fatal.as_ref()) {
                    tracing::warn!(
                        uri = %doc.uri(),
                        error = %fatal,
                        "syntax failure, index keeps the last parsed state"
                    );
                }
            }
        }
    }

    /// Parse and re-index the document if it changed since its last parse.
    ///
    /// Returns the model, or `None` if the current text does not parse.
    pub fn ensure_parsed(&self, uri: &str) -> Result<Option<Arc<Model>>> {
        let key = key(uri);
        let mut docs = self.documents.write();
        let doc = docs.get_mut(&*key).ok_or_else(|| not_open(&key))?;
        self.parse_and_index(doc);
        Ok(doc.model())
    }

    /// Bring every open document's parse and index entries up to date.
    pub fn refresh(&self) {
        let mut docs = self.documents.write();
        let stale: Vec<&mut Document> = docs.values_mut().filter(|d| !d.is_parsed()).collect();
        if stale.is_empty() {
            return;
        }
        tracing::debug!(count = stale.len(), "re-parsing stale documents");
        stale
            .into_par_iter()
            .for_each(|doc| self.parse_and_index(doc));
    }

    fn model_of(&self, file: FileId) -> Option<Arc<Model>> {
        let path = self.index.path(file)?;
        self.index.model(&path)
    }

    /// `file` plus everything it imports, transitively, from the index.
    fn scope_for(&self, file: FileId, model: &Arc<Model>, with_importers: bool) -> Scope {
        let graph = self.index.import_graph();
        let mut models = ModelSet::default();
        models.insert(file, Arc::clone(model));

        let mut queue = VecDeque::from([file]);
        while let Some(current) = queue.pop_front() {
            for edge in graph.get(&current).into_iter().flatten() {
                if models.contains_key(&edge.target) {
                    continue;
                }
                if let Some(imported) = self.model_of(edge.target) {
                    models.insert(edge.target, imported);
                    queue.push_back(edge.target);
                }
            }
        }

        let mut importers = Vec::new();
        if with_importers {
            for (other, edges) in &graph {
                if *other == file || !edges.iter().any(|e| e.target == file) {
                    continue;
                }
                if let Some(importer) = self.model_of(*other) {
                    models.entry(*other).or_insert(importer);
                    importers.push(*other);
                }
            }
            importers.sort();
        }

        let imports = graph
            .into_iter()
            .filter(|(f, _)| models.contains_key(f))
            .collect();
        Scope {
            models,
            imports,
            importers,
        }
    }

    fn resolver<'a>(&'a self, models: &'a ModelSet, imports: &'a ImportGraph) -> Resolver<'a> {
        Resolver::new(models, imports)
            .with_workspace_fallback(self.config.workspace_fallback)
            .with_external(self.index.as_ref())
    }

    /// Resolve one open document against its imports and the index.
    pub fn resolve_document(&self, uri: &str) -> Result<Option<Bindings>> {
        let Some(model) = self.ensure_parsed(uri)? else {
            return Ok(None);
        };
        let file = self.index.intern(uri);
        let scope = self.scope_for(file, &model, false);
        Ok(self.resolver(&scope.models, &scope.imports).resolve_file(file))
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    /// Syntax errors and rule findings for one document.
    ///
    /// Other stale documents are re-parsed first so imports and importers
    /// are seen in their latest state.
    pub fn diagnostics(&self, uri: &str) -> Result<Vec<Diagnostic>> {
        self.refresh();
        let key = key(uri);
        let mut docs = self.documents.write();
        let doc = docs.get_mut(&*key).ok_or_else(|| not_open(&key))?;
        self.parse_and_index(doc);
        let docs = RwLockWriteGuard::downgrade(docs);
        let doc = docs.get(&*key).ok_or_else(|| not_open(&key))?;

        let file = self.index.intern(&key);
        let mut out: Vec<Diagnostic> = doc
            .parse_result()
            .into_iter()
            .flat_map(|p| p.all_errors())
            .map(|e| Diagnostic::from_syntax_error(file, e))
            .collect();
        if let Some(model) = doc.model() {
            out.extend(self.check_document(file, &model));
        }
        tracing::debug!(uri = %key, count = out.len(), "document diagnostics");
        Ok(out
            .into_iter()
            .map(|d| d.with_context(doc.text()))
            .collect())
    }

    fn check_document(&self, file: FileId, model: &Arc<Model>) -> Vec<Diagnostic> {
        let scope = self.scope_for(file, model, true);
        let resolver = self.resolver(&scope.models, &scope.imports);
        let bindings = resolver
            .resolve_file(file)
            .unwrap_or_else(|| Bindings::empty(file));

        let others: Vec<(FileId, Bindings)> = scope
            .models
            .keys()
            .filter(|other| **other != file)
            .filter_map(|other| Some((*other, resolver.resolve_file(*other)?)))
            .collect();

        let mut endpoints = FxHashSet::default();
        for (other, theirs) in &others {
            if scope.importers.contains(other) {
                endpoints.extend(targets_in(theirs, file));
            }
        }

        // models of cross-file targets, for related locations
        let mut context = scope.models.clone();
        for target in bindings.references().flat_map(|r| r.resolution.candidates()) {
            if !context.contains_key(&target.file) {
                if let Some(model) = self.model_of(target.file) {
                    context.insert(target.file, model);
                }
            }
        }

        let ctx = RuleContext::new(file, model, &bindings)
            .with_workspace(&context)
            .with_external_endpoints(&endpoints);
        let mut out = self.validator.validate(&ctx);

        // cross-file findings among the document, its imports and importers
        let mut across = vec![ctx];
        across.extend(others.iter().filter_map(|(other, theirs)| {
            let model = scope.models.get(other)?;
            Some(RuleContext::new(*other, model, theirs).with_workspace(&context))
        }));
        out.extend(
            self.validator
                .validate_across(&across)
                .into_iter()
                .filter(|d| d.file == file),
        );
        out
    }

    /// Resolve and validate every indexed file, in parallel.
    ///
    /// Open documents that currently fail to parse report their syntax errors
    /// only; their last indexed state is not validated again.
    pub fn validate_workspace(&self) -> DiagnosticCollector {
        self.refresh();
        let models = self.index.models();
        let imports = self.index.import_graph();
        let resolver = self.resolver(&models, &imports);
        let files: Vec<FileId> = models.keys().copied().collect();

        let bindings: FxHashMap<FileId, Bindings> = files
            .par_iter()
            .filter_map(|file| Some((*file, resolver.resolve_file(*file)?)))
            .collect();

        let mut external: FxHashMap<FileId, FxHashSet<QualifiedId>> = FxHashMap::default();
        for (file, theirs) in &bindings {
            for target in theirs
                .references()
                .filter_map(|r| r.resolution.target())
                .filter(|t| t.file != *file)
            {
                external
                    .entry(target.file)
                    .or_default()
                    .insert(target.qid.clone());
            }
        }

        let docs = self.documents.read();
        let open: FxHashMap<FileId, &Document> = docs
            .values()
            .map(|doc| (self.index.intern(doc.uri()), doc))
            .collect();
        let broken: FxHashSet<FileId> = open
            .iter()
            .filter(|(_, doc)| doc.model().is_none())
            .map(|(file, _)| *file)
            .collect();

        let no_endpoints = FxHashSet::default();
        let mut diagnostics: Vec<Diagnostic> = files
            .par_iter()
            .filter(|file| !broken.contains(*file))
            .flat_map_iter(|file| {
                let (Some(model), Some(bound)) = (models.get(file), bindings.get(file)) else {
                    return Vec::new();
                };
                let ctx = RuleContext::new(*file, model, bound)
                    .with_workspace(&models)
                    .with_external_endpoints(external.get(file).unwrap_or(&no_endpoints));
                self.validator.validate(&ctx)
            })
            .collect();

        let contexts: Vec<RuleContext<'_>> = files
            .iter()
            .filter(|file| !broken.contains(*file))
            .filter_map(|file| {
                let (model, bound) = (models.get(file)?, bindings.get(file)?);
                Some(RuleContext::new(*file, model, bound).with_workspace(&models))
            })
            .collect();
        diagnostics.extend(self.validator.validate_across(&contexts));

        for (file, doc) in &open {
            if let Some(parsed) = doc.parse_result() {
                diagnostics.extend(
                    parsed
                        .all_errors()
                        .map(|e| Diagnostic::from_syntax_error(*file, e)),
                );
            }
        }

        let mut diagnostics: Vec<Diagnostic> = diagnostics
            .into_iter()
            .map(|d| match open.get(&d.file) {
                Some(doc) => d.with_context(doc.text()),
                None => d,
            })
            .collect();
        diagnostics.sort_by(|a, b| (a.file, a.span.start).cmp(&(b.file, b.span.start)));
        tracing::debug!(
            files = files.len(),
            diagnostics = diagnostics.len(),
            "validated workspace"
        );
        DiagnosticCollector::from(diagnostics)
    }

    // ========================================================================
    // EDITOR FEATURES
    // ========================================================================

    fn cursor_at(&self, uri: &str, position: Position) -> Result<Option<CursorContext>> {
        self.refresh();
        let key = key(uri);
        let docs = self.documents.read();
        let doc = docs.get(&*key).ok_or_else(|| not_open(&key))?;
        let Some((token, word, span)) = doc
            .line_text(position.line)
            .and_then(|line| token_at(line, position))
        else {
            return Ok(None);
        };

        let file = self.index.intern(&key);
        let definition = doc.local_definitions().at(position).cloned();
        let resolution = match definition.as_ref().and_then(LocalDefinition::qualified_id) {
            Some(qid) => Resolution::Resolved(Target::new(file, qid)),
            None => match Reference::parse(&token, span) {
                Some(reference) => self.resolve_at(file, doc, &reference, position),
                None => Resolution::Unresolved,
            },
        };
        Ok(Some(CursorContext {
            path: key,
            file,
            token,
            word,
            span,
            definition,
            resolution,
        }))
    }

    fn resolve_at(
        &self,
        file: FileId,
        doc: &Document,
        reference: &Reference,
        position: Position,
    ) -> Resolution {
        match doc.model() {
            Some(model) => {
                let scope = self.scope_for(file, &model, false);
                let enclosing = doc.local_definitions().scope_at(position);
                self.resolver(&scope.models, &scope.imports)
                    .resolve_reference(file, &enclosing, reference)
            }
            // positions of the last good parse no longer match the text
            None => match self
                .index
                .resolve_qualified_id(&reference.to_string(), doc.uri())
            {
                Some(element) => Resolution::Resolved(element.target()),
                None => Resolution::Unresolved,
            },
        }
    }

    pub fn goto_definition(&self, uri: &str, position: Position) -> Result<GotoResult> {
        Ok(match self.cursor_at(uri, position)? {
            Some(cursor) => goto::goto_definition(&self.index, &cursor),
            None => GotoResult::empty(),
        })
    }

    /// Occurrences of the identifier under the cursor in every open document.
    ///
    /// The cursor must be on a declaration or on a reference that resolves;
    /// anywhere else (keywords, strings, unresolved names) nothing is found.
    pub fn find_references(
        &self,
        uri: &str,
        position: Position,
        include_declaration: bool,
    ) -> Result<ReferenceResult> {
        let Some(cursor) = self.cursor_at(uri, position)? else {
            return Ok(ReferenceResult::default());
        };
        let docs = self.documents.read();
        let on_identifier = docs
            .get(&*cursor.path)
            .is_some_and(|doc| doc.is_identifier_at(position));
        let name = match (&cursor.definition, cursor.resolution.candidates().first()) {
            _ if !on_identifier => None,
            (Some(definition), _) => Some(definition.name.clone()),
            (None, Some(target)) => Some(target.qid.name().clone()),
            (None, None) => None,
        };
        let Some(name) = name else {
            tracing::debug!(uri, ?position, "no identifier to search for");
            return Ok(ReferenceResult::default());
        };
        Ok(references::find_references(
            docs.values(),
            &name,
            include_declaration,
        ))
    }

    /// Edits renaming the identifier under the cursor everywhere it occurs
    /// in open documents.
    pub fn rename(&self, uri: &str, position: Position, new_name: &str) -> Result<RenameResult> {
        let found = self.find_references(uri, position, true)?;
        rename::rename(&found, new_name)
    }

    pub fn workspace_symbols(&self, query: Option<&str>) -> Vec<SymbolInfo> {
        self.refresh();
        symbols::workspace_symbols(&self.index, query)
    }

    pub fn document_symbols(&self, uri: &str) -> Result<Vec<DocumentSymbol>> {
        let key = key(uri);
        let docs = self.documents.read();
        let doc = docs.get(&*key).ok_or_else(|| not_open(&key))?;
        Ok(symbols::document_symbols(doc.local_definitions()))
    }

    pub fn completions(&self, uri: &str, position: Position) -> Result<Vec<CompletionItem>> {
        self.refresh();
        let key = key(uri);
        let docs = self.documents.read();
        let doc = docs.get(&*key).ok_or_else(|| not_open(&key))?;
        let prefix = doc
            .line_text(position.line)
            .map(|line| reference_prefix(line, position.column as usize))
            .unwrap_or_default();
        Ok(completion::completions(
            doc.local_definitions(),
            &self.index,
            &key,
            &prefix,
        ))
    }

    pub fn hover(&self, uri: &str, position: Position) -> Result<Option<HoverResult>> {
        Ok(self
            .cursor_at(uri, position)?
            .and_then(|cursor| hover::hover(&self.index, &cursor)))
    }
}

/// Qualified ids in `file` that `bindings` point at.
fn targets_in(bindings: &Bindings, file: FileId) -> impl Iterator<Item = QualifiedId> + '_ {
    bindings
        .references()
        .filter_map(|r| r.resolution.target())
        .filter(move |t| t.file == file)
        .map(|t| t.qid.clone())
}
