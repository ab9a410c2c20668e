use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::base::normalize_path;
use crate::error::{Error, Result};
use crate::ide::Workspace;

/// Loads architecture files from disk into a workspace's index.
///
/// Loaded files are indexed, not opened: they take part in resolution,
/// navigation and workspace validation, but carry no editor state. Files
/// already open in the workspace are skipped since the editor's text wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Index every file under `root` with the configured extension.
    ///
    /// Returns the number of files indexed. Files that cannot be read or
    /// parsed are reported together as [`Error::Batch`]; the others are
    /// indexed regardless.
    pub fn load_directory(&self, root: impl AsRef<Path>, workspace: &Workspace) -> Result<usize> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::DirectoryNotFound(root.display().to_string()));
        }

        let (paths, mut errors) = collect_file_paths(root, workspace);
        // intern up front so file ids follow path order, not thread timing
        for path in &paths {
            workspace.index().intern(&path_key(path));
        }

        let results: Vec<Result<()>> = paths
            .par_iter()
            .map(|path| self.load_file(path, workspace))
            .collect();
        let loaded = results.iter().filter(|r| r.is_ok()).count();
        errors.extend(results.into_iter().filter_map(Result::err));

        tracing::info!(
            root = %root.display(),
            loaded,
            failed = errors.len(),
            "loaded workspace directory"
        );
        if errors.is_empty() {
            Ok(loaded)
        } else {
            Err(Error::Batch(errors))
        }
    }

    /// Read, parse and index one file.
    pub fn load_file(&self, path: impl AsRef<Path>, workspace: &Workspace) -> Result<()> {
        let path = path.as_ref();
        let key = path_key(path);
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(key.as_str(), e))?;

        let parsed = workspace.parser().parse(&key, &text);
        match (parsed.model, parsed.fatal) {
            (Some(model), _) => {
                if !parsed.errors.is_empty() {
                    tracing::debug!(path = %key, errors = parsed.errors.len(), "indexed with syntax errors");
                }
                workspace.index().index_file(&key, model);
                Ok(())
            }
            (None, Some(fatal)) => Err(Error::Parse {
                path: key,
                source: fatal,
            }),
            (None, None) => Ok(()),
        }
    }
}

fn path_key(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

/// Matching files under `root` in a stable order, plus traversal errors.
fn collect_file_paths(root: &Path, workspace: &Workspace) -> (Vec<PathBuf>, Vec<Error>) {
    let mut paths = Vec::new();
    let mut errors = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let path = source
                    .path()
                    .unwrap_or(root)
                    .display()
                    .to_string();
                errors.push(Error::Walk { path, source });
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !workspace.config().matches_extension(path) {
            continue;
        }
        if workspace.is_open(&path_key(path)) {
            tracing::trace!(path = %path.display(), "skipping open document");
            continue;
        }
        paths.push(path.to_path_buf());
    }
    (paths, errors)
}
