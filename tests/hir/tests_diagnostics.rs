//! Validation rule tests.
//!
//! Severity policy, rule ordering and the located findings each built-in
//! rule produces.

use archscope::AnalysisConfig;
use archscope::base::{FileId, Position};
use archscope::hir::{
    DiagnosticCode, DiagnosticCollector, RuleContext, Severity, Validator, resolve, validate,
};
use rstest::rstest;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::source_fixtures::*;
use crate::helpers::workspace_helpers::*;

fn check(text: &str) -> Vec<archscope::hir::Diagnostic> {
    validate(FileId::new(0), &model(text))
}

#[test]
fn test_clean_model_has_no_findings() {
    let diagnostics = check(SHOP);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn test_cycle_is_reported_once_as_info() {
    let diagnostics = check(CYCLE);
    let cycle = assert_single(&diagnostics, DiagnosticCode::CycleDetected, Severity::Info);
    assert!(cycle.message.contains('A') && cycle.message.contains('B'));
    assert_eq!(diagnostics.len(), 1, "{diagnostics:#?}");
    assert_no_blocking(&diagnostics);
    assert!(!DiagnosticCollector::from(diagnostics).has_blocking());
}

#[test]
fn test_duplicate_siblings_are_one_blocking_error() {
    let diagnostics = check(DUPLICATE_SIBLINGS);
    let duplicate = assert_single(&diagnostics, DiagnosticCode::DuplicateIdentifier, Severity::Error);

    let mut sites = vec![duplicate.span.start];
    sites.extend(duplicate.related.iter().map(|r| r.span.start));
    sites.sort();
    assert_eq!(sites, [Position::new(3, 14), Position::new(4, 14)]);
    assert_eq!(blocking(&diagnostics).len(), 1);
}

#[test]
fn test_ambiguous_and_unresolved_references_are_errors() {
    let diagnostics = check(AMBIGUOUS);
    let ambiguous = assert_single(&diagnostics, DiagnosticCode::AmbiguousReference, Severity::Error);
    assert_eq!(ambiguous.span.start, Position::new(4, 5));

    let missing = check("person U\nU -> Ghost");
    let unresolved = assert_single(&missing, DiagnosticCode::UnresolvedReference, Severity::Error);
    assert_eq!(unresolved.span.start, Position::new(1, 5));
}

#[rstest]
#[case::orphan("person U\nsystem S\nsystem Lonely\nU -> S", DiagnosticCode::OrphanElement, Severity::Warning)]
#[case::nested("system S { container C\n S -> C }\nperson U\nU -> S", DiagnosticCode::NestedRelation, Severity::Warning)]
#[case::passive("datastore Db\nsystem S\nDb -> S", DiagnosticCode::PassiveSource, Severity::Warning)]
#[case::scenario("person U\nsystem S\nU -> S\nscenario Go { U -> Missing }", DiagnosticCode::UnresolvedScenarioStep, Severity::Error)]
#[case::external(
    "person U\nsystem Pay { metadata { external: \"true\" }\n container Api }\nU -> Pay.Api",
    DiagnosticCode::ExternalWithChildren,
    Severity::Warning
)]
fn test_rule_findings(#[case] text: &str, #[case] code: DiagnosticCode, #[case] severity: Severity) {
    let diagnostics = check(text);
    assert_single(&diagnostics, code, severity);
}

#[test]
fn test_complexity_thresholds_come_from_config() {
    let text = "person U\nsystem S { container A\n container B\n container C }\nU -> S.A\nU -> S.B\nU -> S.C";
    let m = model(text);
    let bindings = resolve(FileId::new(0), &m);
    let ctx = RuleContext::new(FileId::new(0), &m, &bindings);

    let strict = Validator::from_config(&AnalysisConfig::default().with_max_children(2));
    let found = strict.validate(&ctx);
    assert_single(&found, DiagnosticCode::TooManyChildren, Severity::Info);

    let relaxed = Validator::from_config(&AnalysisConfig::default());
    assert!(with_code(&relaxed.validate(&ctx), DiagnosticCode::TooManyChildren).is_empty());
}

#[test]
fn test_disabled_rules_are_skipped() {
    let m = model(CYCLE);
    let bindings = resolve(FileId::new(0), &m);
    let ctx = RuleContext::new(FileId::new(0), &m, &bindings);

    let validator =
        Validator::from_config(&AnalysisConfig::default().with_disabled_rule("cycle-detection"));
    assert!(!validator.rule_names().contains(&"cycle-detection"));
    assert!(validator.validate(&ctx).is_empty());
}

#[test]
fn test_findings_follow_rule_registration_order() {
    // duplicate (unique rule) precedes the unresolved reference (reference rule)
    let diagnostics = check("person U\nperson U\nU -> Ghost");
    let order = codes(&diagnostics);
    let duplicate = order.iter().position(|c| *c == "duplicate-identifier").unwrap();
    let unresolved = order.iter().position(|c| *c == "unresolved-reference").unwrap();
    assert!(duplicate < unresolved, "{order:?}");
}

#[test]
fn test_diagnostic_codes_are_stable_strings() {
    assert_eq!(DiagnosticCode::DuplicateIdentifier.as_str(), "duplicate-identifier");
    assert_eq!(DiagnosticCode::UnresolvedReference.as_str(), "unresolved-reference");
    assert_eq!(DiagnosticCode::CycleDetected.as_str(), "cycle-detected");
    assert_eq!(DiagnosticCode::OrphanElement.as_str(), "orphan-element");
}
