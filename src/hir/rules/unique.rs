use indexmap::IndexMap;

use super::{Rule, RuleContext};
use crate::base::{FileId, Span};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCode, RelatedInfo};
use crate::syntax::{Declared, Element, Name};

/// Sibling elements must not share a local identifier. Scenario and
/// decision names must be unique at model root as well.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniqueIdentifierRule;

impl Rule for UniqueIdentifierRule {
    fn name(&self) -> &'static str {
        "unique-identifier"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        report_duplicates(ctx.file, "model root", "element", siblings(&ctx.model.elements), &mut out);

        for (path, element) in ctx.model.walk() {
            if element.children().is_empty() {
                continue;
            }
            let place = path.join(".");
            report_duplicates(ctx.file, &place, "element", siblings(element.children()), &mut out);
        }

        let scenarios = ctx.model.scenarios.iter().map(|s| (&s.name, s.name_span));
        report_duplicates(ctx.file, "model root", "scenario", scenarios, &mut out);
        let decisions = ctx.model.decisions.iter().map(|d| (&d.name, d.name_span));
        report_duplicates(ctx.file, "model root", "decision", decisions, &mut out);
        out
    }
}

fn siblings(elements: &[Element]) -> impl Iterator<Item = (&Name, Span)> {
    elements.iter().map(|e| (e.name(), e.decl().name_span))
}

/// One diagnostic per duplicated name, placed on the second declaration and
/// pointing at every other one.
fn report_duplicates<'a>(
    file: FileId,
    place: &str,
    what: &str,
    items: impl Iterator<Item = (&'a Name, Span)>,
    out: &mut Vec<Diagnostic>,
) {
    let mut by_name: IndexMap<&Name, Vec<Span>> = IndexMap::new();
    for (name, span) in items {
        by_name.entry(name).or_default().push(span);
    }

    for (name, spans) in by_name {
        if spans.len() < 2 {
            continue;
        }
        let mut diagnostic = Diagnostic::error(
            DiagnosticCode::DuplicateIdentifier,
            file,
            spans[1],
            format!("duplicate {what} identifier '{name}' in {place}"),
        )
        .with_related(RelatedInfo::new(
            file,
            spans[0],
            format!("'{name}' first declared here"),
        ));
        for span in &spans[2..] {
            diagnostic = diagnostic.with_related(RelatedInfo::new(
                file,
                *span,
                format!("'{name}' declared again here"),
            ));
        }
        out.push(diagnostic);
    }
}
