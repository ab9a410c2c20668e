//! Workspace lifecycle: edits, lazy re-parsing, diagnostics and loading.

use std::fs;
use std::sync::Arc;
use std::thread;

use archscope::base::{Position, Span};
use archscope::hir::{DiagnosticCode, Severity};
use archscope::ide::{TextChange, Workspace};
use archscope::project::WorkspaceLoader;
use archscope::syntax::Declared;
use archscope::{AnalysisConfig, Error};

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::source_fixtures::*;
use crate::helpers::workspace_helpers::*;

#[test]
fn test_latest_edit_wins_on_next_parse() {
    let ws = Workspace::new();
    ws.open("/ws/a.arch", "system One", 1);
    ws.apply_change("/ws/a.arch", 2, TextChange::full("system Two")).unwrap();
    ws.apply_change(
        "/ws/a.arch",
        3,
        TextChange::incremental(Span::from_coords(0, 7, 0, 10), "Three"),
    )
    .unwrap();

    assert_eq!(ws.version("/ws/a.arch"), Some(3));
    assert_eq!(ws.text("/ws/a.arch").as_deref(), Some("system Three"));
    let model = ws.ensure_parsed("/ws/a.arch").unwrap().unwrap();
    assert_eq!(model.elements[0].name().as_str(), "Three");
    assert!(ws.index().get_element("One").is_none());
    assert!(ws.index().get_element("Two").is_none());
}

#[test]
fn test_invalid_range_leaves_document_untouched() {
    let ws = workspace_with(&[("/ws/a.arch", "system A")]);
    let result = ws.apply_change(
        "/ws/a.arch",
        2,
        TextChange::incremental(Span::from_coords(4, 0, 4, 1), "x"),
    );
    assert!(matches!(result, Err(Error::InvalidRange { .. })));
    assert_eq!(ws.text("/ws/a.arch").as_deref(), Some("system A"));
    assert_eq!(ws.version("/ws/a.arch"), Some(1));
}

#[test]
fn test_broken_document_does_not_poison_others() {
    let ws = workspace_with(&[
        ("/ws/good.arch", "person U\nU -> Api"),
        ("/ws/lib.arch", "system Api"),
    ]);
    ws.apply_change("/ws/lib.arch", 2, TextChange::full("system Api {\n container"))
        .unwrap();

    let broken = ws.diagnostics("/ws/lib.arch").unwrap();
    assert!(!broken.is_empty());
    assert!(broken.iter().all(|d| d.code.is_syntax()));

    // the last good state of lib.arch still serves its importers
    let good = ws.diagnostics("/ws/good.arch").unwrap();
    assert_no_blocking(&good);
    assert!(ws.goto_definition("/ws/good.arch", Position::new(1, 6)).unwrap().targets.len() == 1);
}

#[test]
fn test_document_diagnostics_see_imports_and_importers() {
    let app = "import \"billing.arch\" as Billing\nperson U\nU -> Billing.API";
    let ws = Workspace::new();
    ws.open("/ws/billing.arch", "system API\nsystem Unused", 1);
    ws.open("/ws/app.arch", app, 1);

    let app_diagnostics = ws.diagnostics("/ws/app.arch").unwrap();
    assert!(codes(&app_diagnostics).is_empty(), "{app_diagnostics:#?}");

    // API is used from app.arch, Unused is not
    let billing = ws.diagnostics("/ws/billing.arch").unwrap();
    let orphan = assert_single(&billing, DiagnosticCode::OrphanElement, Severity::Warning);
    assert!(orphan.message.contains("Unused"));
    assert_eq!(orphan.context.as_deref(), Some("system Unused"));
}

#[test]
fn test_validate_workspace_collects_every_file() {
    let ws = workspace_with(&[
        ("/ws/cycle.arch", CYCLE),
        ("/ws/dupes.arch", DUPLICATE_SIBLINGS),
        ("/ws/shop.arch", SHOP),
    ]);
    let collector = ws.validate_workspace();

    assert_eq!(collector.error_count(), 1);
    assert!(collector.info_count() >= 1);
    let cycle_file = ws.index().file_id("/ws/cycle.arch").unwrap();
    let in_cycle = collector.diagnostics_for_file(cycle_file);
    assert_eq!(in_cycle.len(), 1);
    assert_eq!(in_cycle[0].severity, Severity::Info);
    assert!(in_cycle[0].context.is_some());
}

#[test]
fn test_cycle_across_files_is_reported_once() {
    let ws = workspace_with(&[("/ws/a.arch", "system A\nA -> B"), ("/ws/b.arch", "system B\nB -> A")]);
    let collector = ws.validate_workspace();

    let cycles: Vec<_> = collector
        .diagnostics()
        .iter()
        .filter(|d| d.code == DiagnosticCode::CycleDetected)
        .collect();
    assert_eq!(cycles.len(), 1, "{:#?}", collector.diagnostics());
    assert_eq!(cycles[0].severity, Severity::Info);
    assert_eq!(cycles[0].file, ws.index().file_id("/ws/b.arch").unwrap());
    assert!(!collector.has_blocking());
}

#[test]
fn test_document_diagnostics_see_cycles_through_imports() {
    let ws = workspace_with(&[
        ("/ws/a.arch", "import \"b.arch\"\nsystem A\nA -> B"),
        ("/ws/b.arch", "import \"a.arch\"\nsystem B\nB -> A"),
    ]);
    let b = ws.diagnostics("/ws/b.arch").unwrap();
    assert_single(&b, DiagnosticCode::CycleDetected, Severity::Info);
    let a = ws.diagnostics("/ws/a.arch").unwrap();
    assert!(with_code(&a, DiagnosticCode::CycleDetected).is_empty());
}

#[test]
fn test_validate_workspace_reports_only_syntax_for_broken_documents() {
    let ws = workspace_with(&[("/ws/a.arch", "system A\nsystem A")]);
    ws.apply_change("/ws/a.arch", 2, TextChange::full("system A {")).unwrap();
    let collector = ws.validate_workspace();
    assert!(collector.diagnostics().iter().all(|d| d.code.is_syntax()));
    assert!(collector.has_errors());
}

#[test]
fn test_close_and_remove() {
    let ws = workspace_with(&[("/ws/a.arch", "system A"), ("/ws/b.arch", "person U\nU -> A")]);
    ws.close("/ws/a.arch").unwrap();
    assert_eq!(ws.document_count(), 1);
    assert!(matches!(ws.close("/ws/a.arch"), Err(Error::DocumentNotOpen(_))));

    // closed but indexed: still a definition target
    let result = ws.goto_definition("/ws/b.arch", Position::new(1, 5)).unwrap();
    assert_eq!(&*result.targets[0].path, "/ws/a.arch");

    assert!(ws.remove("/ws/a.arch"));
    assert!(ws.goto_definition("/ws/b.arch", Position::new(1, 5)).unwrap().is_empty());
}

#[test]
fn test_config_controls_fallback_and_rules() {
    let config = AnalysisConfig::default()
        .with_workspace_fallback(false)
        .with_disabled_rule("orphan-detection");
    let ws = Workspace::with_config(config);
    ws.open("/ws/a.arch", "system S\nsystem Lonely", 1);
    ws.open("/ws/b.arch", "person U\nU -> S", 1);

    let a = ws.diagnostics("/ws/a.arch").unwrap();
    assert!(a.is_empty(), "{a:#?}");
    let b = ws.diagnostics("/ws/b.arch").unwrap();
    assert_single(&b, DiagnosticCode::UnresolvedReference, Severity::Error);
}

#[test]
fn test_concurrent_reads_during_edits() {
    let ws = Arc::new(workspace_with(&[("/ws/a.arch", "person U\nsystem S\nU -> S")]));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let ws = Arc::clone(&ws);
            thread::spawn(move || {
                for _ in 0..50 {
                    let result = ws.hover("/ws/a.arch", Position::new(2, 5)).unwrap();
                    if let Some(hover) = result {
                        assert!(hover.contents.contains("system"));
                    }
                    let _ = ws.workspace_symbols(Some("S"));
                }
            })
        })
        .collect();

    for version in 2..50 {
        let text = if version % 2 == 0 {
            "person U\nsystem S\nU -> S"
        } else {
            "person U\nsystem S \"Shop\"\nU -> S"
        };
        ws.apply_change("/ws/a.arch", version, TextChange::full(text)).unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(ws.version("/ws/a.arch"), Some(49));
}

// =============================================================================
// LOADING FROM DISK
// =============================================================================

#[test]
fn test_loaded_files_resolve_for_open_documents() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/billing.arch"), "system API\nsystem Ledger").unwrap();
    fs::write(dir.path().join("README.md"), "not a model").unwrap();

    let ws = Workspace::new();
    let loaded = WorkspaceLoader::new().load_directory(dir.path(), &ws).unwrap();
    assert_eq!(loaded, 1);

    let app_path = dir.path().join("app.arch");
    let app = "import \"lib/billing.arch\" as Billing\nperson U\nU -> Billing.API";
    let uri = app_path.to_string_lossy().to_string();
    ws.open(&uri, app, 1);

    let diagnostics = ws.diagnostics(&uri).unwrap();
    assert!(
        with_code(&diagnostics, DiagnosticCode::UnresolvedReference).is_empty(),
        "{diagnostics:#?}"
    );
    let hover = ws.hover(&uri, position_of(app, "API", 0)).unwrap().unwrap();
    assert!(hover.contents.contains("`API`"));
    assert!(hover.contents.contains("billing.arch"));
}

#[test]
fn test_loader_reports_failures_and_keeps_going() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ok.arch"), "system Fine").unwrap();
    fs::write(dir.path().join("broken.arch"), "system Broken \"unterminated").unwrap();

    let ws = Workspace::new();
    let result = WorkspaceLoader::new().load_directory(dir.path(), &ws);
    match result {
        Err(Error::Batch(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].to_string().contains("broken.arch"));
        }
        other => panic!("expected a batch error, got {other:?}"),
    }
    assert!(ws.index().get_element("Fine").is_some());
}
