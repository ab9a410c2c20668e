//! Loading architecture files from disk.

mod workspace_loader;

pub use workspace_loader::WorkspaceLoader;
