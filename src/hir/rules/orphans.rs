use super::{Rule, RuleContext};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCode};
use crate::hir::ids::QualifiedId;
use crate::syntax::Declared;

/// Elements that take part in no relation. An element participates when it
/// or one of its descendants is a relation endpoint, here or in another file.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrphanDetectionRule;

impl Rule for OrphanDetectionRule {
    fn name(&self) -> &'static str {
        "orphan-detection"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let endpoints: Vec<&QualifiedId> = ctx
            .bindings
            .references()
            .filter_map(|bound| bound.resolution.target())
            .filter(|target| target.file == ctx.file)
            .map(|target| &target.qid)
            .collect();

        let mut out = Vec::new();
        for (path, element) in ctx.model.walk() {
            let Some(qid) = QualifiedId::new(path) else {
                continue;
            };
            let local = endpoints.iter().any(|e| qid.contains(e));
            let remote = ctx
                .external_endpoints
                .is_some_and(|set| set.iter().any(|e| qid.contains(e)));
            if local || remote {
                continue;
            }
            out.push(Diagnostic::warning(
                DiagnosticCode::OrphanElement,
                ctx.file,
                element.decl().name_span,
                format!("{} '{qid}' has no relations", element.kind()),
            ));
        }
        out
    }
}
