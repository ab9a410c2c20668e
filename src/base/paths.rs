//! Path normalization utilities for consistent file path handling.
//!
//! Import declarations name files relative to the importing file. The index
//! stores files under their normalized path, so both sides must agree on one
//! spelling. Normalization is purely lexical: documents held by an editor may
//! not exist on disk, so nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize a file path lexically: drop `.` segments, fold `..` into the
/// preceding segment and use `/` separators.
///
/// # Examples
///
/// ```
/// use archscope::base::normalize_path;
///
/// assert_eq!(normalize_path("models/./billing/../shop.arch"), "models/shop.arch");
/// assert_eq!(normalize_path("/ws/a/b.arch"), "/ws/a/b.arch");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), None | Some(Component::ParentDir)) {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out.to_string_lossy().replace('\\', "/")
}

/// Resolve the path written in an import declaration against the file that
/// contains it.
///
/// Absolute import paths are only normalized.
pub fn resolve_import_path(importer: &str, import: &str) -> String {
    let import_path = Path::new(import);
    if import_path.is_absolute() {
        return normalize_path(import);
    }
    let base = Path::new(importer).parent().unwrap_or(Path::new(""));
    normalize_path(&base.join(import_path).to_string_lossy())
}
