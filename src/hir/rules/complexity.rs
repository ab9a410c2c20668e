use rustc_hash::FxHashMap;

use super::{Rule, RuleContext};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCode};
use crate::hir::ids::QualifiedId;
use crate::syntax::Declared;

/// Flags elements that own too many children or start too many relations.
#[derive(Clone, Copy, Debug)]
pub struct ComplexityRule {
    max_children: usize,
    max_outgoing: usize,
}

impl ComplexityRule {
    pub fn new(max_children: usize, max_outgoing: usize) -> Self {
        Self {
            max_children,
            max_outgoing,
        }
    }
}

impl Rule for ComplexityRule {
    fn name(&self) -> &'static str {
        "complexity"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut outgoing: FxHashMap<&QualifiedId, usize> = FxHashMap::default();
        for relation in ctx.bindings.declared() {
            match relation.from.resolution.target() {
                Some(from) if from.file == ctx.file => *outgoing.entry(&from.qid).or_default() += 1,
                _ => {}
            }
        }

        let mut out = Vec::new();
        for (path, element) in ctx.model.walk() {
            let Some(qid) = QualifiedId::new(path) else {
                continue;
            };
            let span = element.decl().name_span;
            let children = element.children().len();
            if children > self.max_children {
                out.push(Diagnostic::info(
                    DiagnosticCode::TooManyChildren,
                    ctx.file,
                    span,
                    format!(
                        "'{qid}' has {children} children (more than {}); consider splitting it",
                        self.max_children
                    ),
                ));
            }
            let relations = outgoing.get(&qid).copied().unwrap_or(0);
            if relations > self.max_outgoing {
                out.push(Diagnostic::info(
                    DiagnosticCode::TooManyRelations,
                    ctx.file,
                    span,
                    format!(
                        "'{qid}' starts {relations} relations (more than {})",
                        self.max_outgoing
                    ),
                ));
            }
        }
        out
    }
}
