//! IDE layer tests
//!
//! Workspace lifecycle, navigation, references and rename, plus the editor
//! features built on the local definition map and the index.

pub mod tests_features;
pub mod tests_goto;
pub mod tests_references;
pub mod tests_workspace;
