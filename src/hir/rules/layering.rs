use super::{Rule, RuleContext};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCode};
use crate::syntax::Declared;

/// Layering hygiene: relations must not restate nesting, and passive
/// elements (data stores, queues) must not initiate relations.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayeringRule;

impl Rule for LayeringRule {
    fn name(&self) -> &'static str {
        "layering"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for relation in ctx.bindings.declared() {
            let Some((from, to)) = relation.edge() else {
                continue;
            };

            if from.file == to.file
                && (from.qid.is_ancestor_of(&to.qid) || to.qid.is_ancestor_of(&from.qid))
            {
                out.push(Diagnostic::warning(
                    DiagnosticCode::NestedRelation,
                    ctx.file,
                    relation.span,
                    format!(
                        "relation between '{}' and '{}' restates their nesting",
                        from.qid, to.qid
                    ),
                ));
            }

            if let Some(source) = ctx.element(from).filter(|e| e.kind().is_passive()) {
                out.push(Diagnostic::warning(
                    DiagnosticCode::PassiveSource,
                    ctx.file,
                    relation.from.reference.span,
                    format!(
                        "{} '{}' should not initiate relations",
                        source.kind(),
                        from.qid
                    ),
                ));
            }
        }
        out
    }
}
