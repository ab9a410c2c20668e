use super::references::reference_diagnostic;
use super::{Rule, RuleContext};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCode};
use crate::hir::resolve::RelationOrigin;

/// Scenario steps must name existing elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScenarioReferenceRule;

impl Rule for ScenarioReferenceRule {
    fn name(&self) -> &'static str {
        "scenario-reference"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for step in ctx.bindings.scenario_steps() {
            let RelationOrigin::ScenarioStep(scenario) = &step.origin else {
                continue;
            };
            let context = format!("scenario '{scenario}': ");
            for bound in [&step.from, &step.to] {
                out.extend(reference_diagnostic(
                    ctx,
                    bound,
                    DiagnosticCode::UnresolvedScenarioStep,
                    DiagnosticCode::UnresolvedScenarioStep,
                    &context,
                ));
            }
        }
        out
    }
}
