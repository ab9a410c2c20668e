//! Assertions over diagnostic lists.

use archscope::hir::{Diagnostic, DiagnosticCode, Severity};

pub fn codes(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
    diagnostics.iter().map(|d| d.code.as_str()).collect()
}

pub fn with_code(diagnostics: &[Diagnostic], code: DiagnosticCode) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.code == code).collect()
}

pub fn blocking(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.is_blocking()).collect()
}

pub fn assert_no_blocking(diagnostics: &[Diagnostic]) {
    let blocking = blocking(diagnostics);
    assert!(blocking.is_empty(), "unexpected blocking diagnostics: {blocking:#?}");
}

/// Exactly one diagnostic with `code`, at `severity`.
pub fn assert_single(diagnostics: &[Diagnostic], code: DiagnosticCode, severity: Severity) -> &Diagnostic {
    let found = with_code(diagnostics, code);
    assert_eq!(found.len(), 1, "expected one {code}, got {diagnostics:#?}");
    assert_eq!(found[0].severity, severity);
    found[0]
}
