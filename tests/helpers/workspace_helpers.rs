//! Helpers for building models, indexes and workspaces from source text.

use std::sync::Arc;

use archscope::base::{FileId, Position};
use archscope::hir::{Bindings, Resolution, SemanticIndex};
use archscope::ide::Workspace;
use archscope::parse;
use archscope::syntax::Model;

/// Parse `text`, failing the test on any syntax error.
pub fn model(text: &str) -> Arc<Model> {
    let result = parse("test.arch", text);
    assert!(
        result.is_ok(),
        "Parse errors: {:?} {:?}",
        result.errors,
        result.fatal
    );
    result.model.expect("model")
}

/// An index holding every `(path, text)` pair.
pub fn index_with(files: &[(&str, &str)]) -> SemanticIndex {
    let index = SemanticIndex::new();
    for (path, text) in files {
        index.index_file(path, model(text));
    }
    index
}

/// A workspace with every `(uri, text)` pair open and indexed.
pub fn workspace_with(files: &[(&str, &str)]) -> Workspace {
    let workspace = Workspace::new();
    for (uri, text) in files {
        workspace.open(uri, *text, 1);
    }
    workspace.refresh();
    workspace
}

/// Position of the `nth` occurrence (0-based) of `needle` in `text`, one
/// character into the match.
pub fn position_of(text: &str, needle: &str, nth: usize) -> Position {
    let mut seen = 0;
    for (line_no, line) in text.lines().enumerate() {
        for (byte, _) in line.match_indices(needle) {
            if seen == nth {
                let column = line[..byte].chars().count() + 1;
                return Position::new(line_no as u32, column as u32);
            }
            seen += 1;
        }
    }
    panic!("occurrence {nth} of {needle:?} not found");
}

/// Resolved qualified ids of every reference, `?` for unresolved and `*` for
/// ambiguous ones.
pub fn resolved_ids(bindings: &Bindings) -> Vec<String> {
    bindings
        .references()
        .map(|bound| match &bound.resolution {
            Resolution::Resolved(target) => target.qid.to_string(),
            Resolution::Unresolved => "?".to_string(),
            Resolution::Ambiguous(_) => "*".to_string(),
        })
        .collect()
}

/// The file a resolution points into.
pub fn target_file(resolution: &Resolution) -> Option<FileId> {
    resolution.target().map(|t| t.file)
}
