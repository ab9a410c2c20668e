//! High-level IR (HIR): resolution, validation and the semantic index.
//!
//! ## Key Types
//!
//! - [`QualifiedId`], [`Target`] - Identity of a resolved element
//! - [`Resolver`], [`Resolution`], [`Bindings`] - Name resolution into a side table
//! - [`Validator`], [`Rule`] - Pluggable validation rules
//! - [`Diagnostic`] - Located findings with stable codes
//! - [`SemanticIndex`] - Cross-file element table
//!
//! ## Layers
//!
//! ```text
//! Model (per file, immutable)
//!     │
//!     ▼
//! resolve(file, model)           ← Bindings: reference → Resolution
//! resolve_workspace(models, imports)
//!     │
//!     ▼
//! Validator::validate(ctx)       ← Diagnostics, rule by rule
//!
//! SemanticIndex::index_file(path, model)   ← navigation, search, rename
//! ```

mod diagnostics;
mod ids;
mod index;
mod resolve;
pub mod rules;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollector, RelatedInfo, Severity};
pub use ids::{QualifiedId, Target};
pub use index::{ElementReference, ImportBinding, SemanticIndex};
pub use resolve::{
    Bindings, BoundReference, BoundRelation, ExternalLookup, ImportEdge, ImportGraph, ModelSet,
    RelationOrigin, Resolution, Resolver, resolve, resolve_workspace,
};
pub use rules::{Rule, RuleContext, Validator, validate};
