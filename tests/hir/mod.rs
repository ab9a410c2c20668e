//! HIR layer tests
//!
//! - Name resolution: scope walk, shadowing, ambiguity, imports, fallback
//! - Validation rules and diagnostic policy
//! - Semantic index consistency

pub mod tests_diagnostics;
pub mod tests_index;
pub mod tests_name_resolution;
