//! Path interning.

use std::sync::Arc;

use indexmap::IndexSet;

use super::FileId;

/// Bidirectional map between file paths and [`FileId`]s.
///
/// Ids are handed out in insertion order and never reused, so a `FileId`
/// stays valid for the lifetime of the set even if its file is removed
/// from every index.
#[derive(Clone, Debug, Default)]
pub struct FileSet {
    paths: IndexSet<Arc<str>>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `path`, returning the existing id if it was seen before.
    pub fn intern(&mut self, path: &str) -> FileId {
        if let Some(idx) = self.paths.get_index_of(path) {
            return FileId::new(idx as u32);
        }
        let (idx, _) = self.paths.insert_full(Arc::from(path));
        FileId::new(idx as u32)
    }

    /// Look up the id of a path without interning it.
    pub fn get(&self, path: &str) -> Option<FileId> {
        self.paths
            .get_index_of(path)
            .map(|idx| FileId::new(idx as u32))
    }

    /// The path a file id was interned from.
    pub fn path(&self, file: FileId) -> Option<&Arc<str>> {
        self.paths.get_index(file.index() as usize)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &Arc<str>)> {
        self.paths
            .iter()
            .enumerate()
            .map(|(idx, path)| (FileId::new(idx as u32), path))
    }
}
