use super::{Rule, RuleContext};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCode, RelatedInfo};
use crate::hir::resolve::{BoundReference, Resolution};
use crate::syntax::Declared;

/// Every relation endpoint must bind to exactly one element.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidReferenceRule;

impl Rule for ValidReferenceRule {
    fn name(&self) -> &'static str {
        "valid-reference"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        ctx.bindings
            .declared()
            .flat_map(|relation| [&relation.from, &relation.to])
            .filter_map(|bound| {
                reference_diagnostic(
                    ctx,
                    bound,
                    DiagnosticCode::UnresolvedReference,
                    DiagnosticCode::AmbiguousReference,
                    "",
                )
            })
            .collect()
    }
}

/// Diagnostic for a reference that did not resolve to one element.
/// `context` is prepended to the message.
pub(super) fn reference_diagnostic(
    ctx: &RuleContext<'_>,
    bound: &BoundReference,
    unresolved: DiagnosticCode,
    ambiguous: DiagnosticCode,
    context: &str,
) -> Option<Diagnostic> {
    let reference = &bound.reference;
    match &bound.resolution {
        Resolution::Resolved(_) => None,
        Resolution::Unresolved => Some(Diagnostic::error(
            unresolved,
            ctx.file,
            reference.span,
            format!("{context}unresolved reference '{reference}'"),
        )),
        Resolution::Ambiguous(candidates) => {
            let names: Vec<String> = candidates.iter().map(|t| t.qid.to_string()).collect();
            let mut diagnostic = Diagnostic::error(
                ambiguous,
                ctx.file,
                reference.span,
                format!(
                    "{context}ambiguous reference '{reference}' could be: {}",
                    names.join(", ")
                ),
            );
            let mut distinct = candidates.clone();
            distinct.dedup();
            for candidate in &distinct {
                let mut spans: Vec<_> = ctx
                    .elements(candidate)
                    .iter()
                    .map(|e| e.decl().name_span)
                    .collect();
                if spans.is_empty() {
                    spans.push(Default::default());
                }
                for span in spans {
                    diagnostic = diagnostic.with_related(RelatedInfo::new(
                        candidate.file,
                        span,
                        format!("candidate: {}", candidate.qid),
                    ));
                }
            }
            Some(diagnostic)
        }
    }
}
