//! # archscope-base
//!
//! Core library for architecture-description models: parsing, name
//! resolution, validation rules, a cross-file semantic index and an
//! incremental document workspace for editors.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → Loading directories of model files
//!   ↓
//! ide       → Workspace, goto-def, references, rename, hover, completion
//!   ↓
//! hir       → Resolution, validation rules, semantic index
//!   ↓
//! syntax    → Immutable Model, elements, references
//!   ↓
//! parser    → Logos lexer, recursive-descent parser
//!   ↓
//! base      → Primitives (FileId, Position/Span, LineIndex, paths)
//! ```
//!
//! ## Quick start
//!
//! ```
//! use archscope::ide::Workspace;
//!
//! let workspace = Workspace::new();
//! workspace.open("/ws/shop.arch", "person User\nsystem Shop\nUser -> Shop", 1);
//!
//! let diagnostics = workspace.diagnostics("/ws/shop.arch").unwrap();
//! assert!(diagnostics.iter().all(|d| !d.is_blocking()));
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → ide → project)
// ============================================================================

/// Foundation types: FileId, Position/Span, LineIndex, path normalization
pub mod base;

/// Parser: Logos lexer and recursive-descent parser
pub mod parser;

/// Syntax: the parsed Model
pub mod syntax;

/// High-level IR: resolution, rules, diagnostics, semantic index
pub mod hir;

/// IDE features on top of the index
pub mod ide;

/// Directory loading
pub mod project;

/// Analysis configuration
pub mod config;

mod error;

// Re-export commonly needed items
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use parser::{DslParser, ModelParser, ParseResult, parse};

// Re-export foundation types
pub use base::{FileId, LineIndex, Position, Span, TextRange, TextSize};
