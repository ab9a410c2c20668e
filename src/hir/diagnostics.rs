//! Diagnostics: located findings produced by parsing and validation.
//!
//! Diagnostics are plain values. Every validation pass builds fresh ones;
//! nothing here is cached or mutated after the pass that produced it.

use std::fmt;
use std::sync::Arc;

use crate::base::{FileId, Span};
use crate::parser::{SyntaxError, SyntaxErrorKind};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
        }
    }

    /// Only errors block a build; warnings and info are advisory.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable diagnostic codes.
///
/// The string forms are part of the public contract: CLI exit-code logic and
/// editor clients match on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// A recoverable or fatal parse error.
    Syntax(SyntaxErrorKind),
    DuplicateIdentifier,
    UnresolvedReference,
    AmbiguousReference,
    CycleDetected,
    OrphanElement,
    /// Relation between an element and its own ancestor or descendant.
    NestedRelation,
    /// Data store or queue used as a relation source.
    PassiveSource,
    ExternalWithChildren,
    UnresolvedScenarioStep,
    TooManyChildren,
    TooManyRelations,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::Syntax(kind) => kind.code(),
            DiagnosticCode::DuplicateIdentifier => "duplicate-identifier",
            DiagnosticCode::UnresolvedReference => "unresolved-reference",
            DiagnosticCode::AmbiguousReference => "ambiguous-reference",
            DiagnosticCode::CycleDetected => "cycle-detected",
            DiagnosticCode::OrphanElement => "orphan-element",
            DiagnosticCode::NestedRelation => "nested-relation",
            DiagnosticCode::PassiveSource => "passive-relation-source",
            DiagnosticCode::ExternalWithChildren => "external-with-children",
            DiagnosticCode::UnresolvedScenarioStep => "unresolved-scenario-step",
            DiagnosticCode::TooManyChildren => "too-many-children",
            DiagnosticCode::TooManyRelations => "too-many-relations",
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, DiagnosticCode::Syntax(_))
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The file containing this diagnostic.
    pub file: FileId,
    /// Range to highlight (0-indexed).
    pub span: Span,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: Arc<str>,
    /// Other locations involved, e.g. the first declaration of a duplicate.
    pub related: Vec<RelatedInfo>,
    /// Source lines covered by `span`, if attached.
    pub context: Option<Arc<str>>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub file: FileId,
    pub span: Span,
    pub message: Arc<str>,
}

impl RelatedInfo {
    pub fn new(file: FileId, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            span,
            message: message.into(),
        }
    }
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        file: FileId,
        span: Span,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            file,
            span,
            severity,
            code,
            message: message.into(),
            related: Vec::new(),
            context: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(code: DiagnosticCode, file: FileId, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, code, file, span, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, file: FileId, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, code, file, span, message)
    }

    /// Create a new informational diagnostic.
    pub fn info(code: DiagnosticCode, file: FileId, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Info, code, file, span, message)
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// Attach the source lines covered by the span, taken from `text`.
    pub fn with_context(mut self, text: &str) -> Self {
        let first = self.span.start.line as usize;
        let count = (self.span.end.line.saturating_sub(self.span.start.line)) as usize + 1;
        let lines: Vec<&str> = text.lines().skip(first).take(count).collect();
        if !lines.is_empty() {
            self.context = Some(Arc::from(lines.join("\n")));
        }
        self
    }

    /// Convert a parser error.
    pub fn from_syntax_error(file: FileId, error: &SyntaxError) -> Self {
        let message = match &error.hint {
            Some(hint) => format!("{} (hint: {hint})", error.message),
            None => error.message.clone(),
        };
        Self::error(DiagnosticCode::Syntax(error.kind), file, error.span, message)
    }

    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.span.start.one_based();
        write!(
            f,
            "{}:{line}:{column}: {}[{}]: {}",
            self.file, self.severity, self.code, self.message
        )
    }
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific file.
    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Whether any diagnostic blocks a build.
    pub fn has_blocking(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_blocking)
    }

    /// Only the build-blocking diagnostics.
    pub fn blocking(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_blocking())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl From<Vec<Diagnostic>> for DiagnosticCollector {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}
