use super::{Rule, RuleContext};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCode};
use crate::syntax::Declared;

/// Elements marked `external: "true"` are black boxes owned by someone else;
/// modelling their internals is a mistake.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExternalRule;

impl Rule for ExternalRule {
    fn name(&self) -> &'static str {
        "external"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.model
            .walk()
            .into_iter()
            .filter(|(_, element)| {
                !element.children().is_empty()
                    && element
                        .decl()
                        .metadata_value("external")
                        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
            })
            .map(|(path, element)| {
                Diagnostic::warning(
                    DiagnosticCode::ExternalWithChildren,
                    ctx.file,
                    element.decl().name_span,
                    format!(
                        "external {} '{}' should not declare internal elements",
                        element.kind(),
                        path.join(".")
                    ),
                )
            })
            .collect()
    }
}
