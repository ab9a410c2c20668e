//! Name resolution tests for the HIR layer.
//!
//! These tests verify that references bind through the outward scope walk,
//! import aliases and the workspace fallback.

use archscope::base::FileId;
use archscope::hir::{ImportEdge, ImportGraph, ModelSet, Resolution, Resolver, resolve, resolve_workspace};
use rstest::rstest;

use crate::helpers::source_fixtures::*;
use crate::helpers::workspace_helpers::*;

// =============================================================================
// SCOPE WALK
// =============================================================================

#[test]
fn test_inner_declaration_shadows_top_level() {
    let bindings = resolve(FileId::new(0), &model(SHADOWED));
    assert_eq!(resolved_ids(&bindings), ["S.C.Y", "S.C.X"]);
}

#[rstest]
#[case::root_sees_top_level("system X\nsystem S { container C { component X } }\nperson P\nP -> X", &["P", "X"])]
#[case::parent_scope_skips_grandchildren("system X\nsystem S { container C { component X }\n C -> X }", &["S.C", "X"])]
#[case::dotted_descends("system X\nsystem S { container C { component X } }\nperson P\nP -> S.C.X", &["P", "S.C.X"])]
#[case::sibling_of_parent("system S { container C { component X\n X -> D }\n container D }", &["S.C.X", "S.D"])]
#[case::unknown("system S\nS -> Nowhere", &["S", "?"])]
fn test_scope_walk(#[case] text: &str, #[case] expected: &[&str]) {
    let bindings = resolve(FileId::new(0), &model(text));
    assert_eq!(resolved_ids(&bindings), expected);
}

#[test]
fn test_same_level_duplicates_are_ambiguous() {
    let bindings = resolve(FileId::new(0), &model(AMBIGUOUS));
    let to = &bindings.relations[0].to.resolution;
    assert!(to.is_ambiguous(), "{to:?}");
    assert!(to.target().is_none());
    assert_eq!(to.candidates().len(), 2);
}

#[test]
fn test_scenario_steps_use_root_scope() {
    let bindings = resolve(FileId::new(0), &model(SHOP));
    let steps: Vec<String> = bindings
        .scenario_steps()
        .flat_map(|step| [&step.from, &step.to])
        .map(|bound| bound.resolution.target().expect("bound").qid.to_string())
        .collect();
    assert_eq!(steps, ["Customer", "Shop.Web", "Shop.Web", "Shop.Db"]);
    assert_eq!(bindings.unresolved_count(), 0);
}

// =============================================================================
// IMPORTS
// =============================================================================

#[test]
fn test_alias_resolves_into_imported_root() {
    let app = FileId::new(0);
    let billing = FileId::new(1);
    let mut models = ModelSet::default();
    models.insert(app, model("person U\nU -> Billing.API\nU -> Billing.Core.Ledger"));
    models.insert(billing, model("system API\nsystem Core { container Ledger }"));
    let mut imports = ImportGraph::default();
    imports.insert(app, vec![ImportEdge::new(billing, Some("Billing".into()))]);

    let all = resolve_workspace(&models, &imports);
    let bindings = &all[&app];
    assert_eq!(resolved_ids(bindings), ["U", "API", "U", "Core.Ledger"]);
    assert!(
        bindings
            .references()
            .skip(1)
            .step_by(2)
            .all(|r| target_file(&r.resolution) == Some(billing))
    );
}

#[test]
fn test_index_import_graph_feeds_resolution() {
    let index = index_with(&[
        ("/ws/app/main.arch", "import \"../lib/billing.arch\" as Billing\nperson U\nU -> Billing.API"),
        ("/ws/lib/billing.arch", "import \"../app/main.arch\" as App\nsystem API\nAPI -> App.U"),
    ]);
    let all = resolve_workspace(&index.models(), &index.import_graph());
    let main = index.file_id("/ws/app/main.arch").unwrap();
    let lib = index.file_id("/ws/lib/billing.arch").unwrap();

    // mutually importing files still resolve each other
    assert_eq!(target_file(&all[&main].relations[0].to.resolution), Some(lib));
    assert_eq!(target_file(&all[&lib].relations[0].to.resolution), Some(main));
}

#[test]
fn test_unaliased_import_is_an_outer_scope() {
    let index = index_with(&[
        ("/ws/a.arch", "import \"common.arch\"\nperson U\nU -> Shared"),
        ("/ws/common.arch", "system Shared"),
    ]);
    let models = index.models();
    let imports = index.import_graph();
    let a = index.file_id("/ws/a.arch").unwrap();

    let bindings = Resolver::new(&models, &imports)
        .with_workspace_fallback(false)
        .resolve_file(a)
        .unwrap();
    assert_eq!(resolved_ids(&bindings), ["U", "Shared"]);
}

// =============================================================================
// WORKSPACE FALLBACK
// =============================================================================

#[rstest]
#[case(true, "S")]
#[case(false, "?")]
fn test_workspace_fallback_toggle(#[case] enabled: bool, #[case] expected: &str) {
    let index = index_with(&[("/ws/a.arch", "system S"), ("/ws/b.arch", "person U\nU -> S")]);
    let models = index.models();
    let imports = index.import_graph();
    let b = index.file_id("/ws/b.arch").unwrap();

    let bindings = Resolver::new(&models, &imports)
        .with_workspace_fallback(enabled)
        .resolve_file(b)
        .unwrap();
    assert_eq!(resolved_ids(&bindings)[1], expected);
}

#[test]
fn test_fallback_hits_in_several_files_are_ambiguous() {
    let index = index_with(&[
        ("/ws/a.arch", "system S"),
        ("/ws/b.arch", "system S"),
        ("/ws/c.arch", "person U\nU -> S"),
    ]);
    let models = index.models();
    let imports = index.import_graph();
    let c = index.file_id("/ws/c.arch").unwrap();

    let bindings = Resolver::new(&models, &imports).resolve_file(c).unwrap();
    let Resolution::Ambiguous(candidates) = &bindings.relations[0].to.resolution else {
        panic!("expected ambiguity");
    };
    assert_eq!(candidates.len(), 2);
}

#[test]
fn test_external_lookup_reaches_files_outside_the_model_set() {
    let index = index_with(&[("/ws/a.arch", "system S { container Api }")]);
    let b = index.intern("/ws/b.arch");
    let mut models = ModelSet::default();
    models.insert(b, model("person U\nU -> S.Api"));
    let imports = ImportGraph::default();

    let bindings = Resolver::new(&models, &imports)
        .with_external(&index)
        .resolve_file(b)
        .unwrap();
    let target = bindings.relations[0].to.resolution.target().unwrap();
    assert_eq!(target.qid.to_string(), "S.Api");
    assert_eq!(Some(target.file), index.file_id("/ws/a.arch"));
}
