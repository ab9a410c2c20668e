//! Find-references and rename across open documents.

use archscope::Error;
use archscope::base::{Position, Span};

use crate::helpers::workspace_helpers::*;

const API: &str = "system Api \"Public API\"\nsystem ApiGateway";
const WEB: &str = "person U\nU -> Api\nU -> ApiGateway";
const JOBS: &str = "system Jobs\nJobs -> Api\nscenario Nightly {\n  Jobs -> Api\n}";

fn three_files() -> archscope::ide::Workspace {
    workspace_with(&[("/ws/api.arch", API), ("/ws/web.arch", WEB), ("/ws/jobs.arch", JOBS)])
}

#[test]
fn test_references_respect_identifier_boundaries() {
    let ws = three_files();
    let found = ws
        .find_references("/ws/web.arch", position_of(WEB, "Api", 0), true)
        .unwrap();

    assert_eq!(found.len(), 4);
    assert_eq!(
        found.paths().iter().map(|p| &**p).collect::<Vec<_>>(),
        ["/ws/api.arch", "/ws/web.arch", "/ws/jobs.arch"]
    );
    let declarations: Vec<_> = found.references.iter().filter(|r| r.is_definition).collect();
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0].span, Span::from_coords(0, 7, 0, 10));
}

#[test]
fn test_references_can_exclude_declaration() {
    let ws = three_files();
    let found = ws
        .find_references("/ws/api.arch", position_of(API, "Api", 0), false)
        .unwrap();
    assert_eq!(found.len(), 3);
    assert!(found.references.iter().all(|r| !r.is_definition));
}

#[test]
fn test_rename_covers_exactly_the_referencing_files() {
    let ws = three_files();
    let result = ws
        .rename("/ws/api.arch", position_of(API, "Api", 0), "Gateway")
        .unwrap();

    assert_eq!(result.file_count(), 3);
    assert_eq!(result.edit_count(), 4);
    assert_eq!(result.edits["/ws/jobs.arch"].len(), 2);
    for edits in result.edits.values() {
        let mut starts: Vec<_> = edits.iter().map(|e| e.span.start).collect();
        starts.dedup();
        assert_eq!(starts.len(), edits.len(), "duplicate edit positions");
        assert!(edits.iter().all(|e| &*e.new_text == "Gateway"));
    }
    // the longer identifier is untouched
    assert!(
        result.edits["/ws/web.arch"]
            .iter()
            .all(|e| e.span == Span::from_coords(1, 5, 1, 8))
    );
}

#[test]
fn test_rename_edits_apply_cleanly() {
    let ws = three_files();
    let result = ws
        .rename("/ws/web.arch", position_of(WEB, "Api", 0), "Gateway")
        .unwrap();
    for (uri, edits) in &result.edits {
        // apply back to front so earlier spans stay valid
        let mut edits = edits.clone();
        edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));
        for edit in edits {
            let change = archscope::ide::TextChange::incremental(edit.span, &*edit.new_text);
            ws.apply_change(uri, 2, change).unwrap();
        }
    }

    let diagnostics = ws.validate_workspace();
    assert!(!diagnostics.has_errors(), "{:#?}", diagnostics.diagnostics());
    assert_eq!(ws.index().get_element("Gateway").unwrap().label.as_ref(), "Public API");
    assert!(ws.index().get_element("Api").is_none());
}

#[test]
fn test_rename_rejects_invalid_identifiers() {
    let ws = three_files();
    let at = position_of(API, "Api", 0);
    assert!(matches!(ws.rename("/ws/api.arch", at, "not valid"), Err(Error::InvalidName(_))));
    assert!(matches!(ws.rename("/ws/api.arch", at, "system"), Err(Error::InvalidName(_))));
}

#[test]
fn test_rename_on_keyword_changes_nothing() {
    let ws = workspace_with(&[
        ("/ws/a.arch", "system Api\nsystem Web\nWeb -> Api"),
        ("/ws/b.arch", "system Jobs\ncontainer Foo"),
    ]);
    let result = ws.rename("/ws/a.arch", Position::new(0, 2), "Renamed").unwrap();
    assert!(result.is_empty(), "{result:?}");
    assert!(ws.find_references("/ws/b.arch", Position::new(1, 3), true).unwrap().is_empty());
}

#[test]
fn test_rename_ignores_words_inside_strings_and_comments() {
    let text = "system Api \"Api entry point\"\n// Api is public\nperson U\nU -> Api";
    let ws = workspace_with(&[("/ws/a.arch", text)]);

    // cursor on the label
    let in_label = position_of(text, "Api entry", 0);
    assert!(ws.rename("/ws/a.arch", in_label, "Gateway").unwrap().is_empty());

    // from the identifier, only identifier tokens are edited
    let result = ws.rename("/ws/a.arch", position_of(text, "Api", 0), "Gateway").unwrap();
    let spans: Vec<Span> = result.edits["/ws/a.arch"].iter().map(|e| e.span).collect();
    assert_eq!(spans, [Span::from_coords(0, 7, 0, 10), Span::from_coords(3, 5, 3, 8)]);
}

#[test]
fn test_unresolved_name_has_no_references() {
    let text = "person U\nU -> Missing\nU -> Missing";
    let ws = workspace_with(&[("/ws/a.arch", text)]);
    let found = ws
        .find_references("/ws/a.arch", position_of(text, "Missing", 0), true)
        .unwrap();
    assert!(found.is_empty());
}
