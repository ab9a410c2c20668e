//! Syntax: the parsed architecture model.
//!
//! A [`Model`] is an immutable value produced once per parse. Nothing in the
//! engine mutates it afterwards; resolution results live in side tables keyed
//! by reference spans, so the same model can be shared across threads and
//! consumers.

mod element;
mod model;

pub use element::{
    Component, Container, DataStore, Decl, Declared, Element, ElementKind, MetadataEntry, Person,
    Queue, System,
};
pub use model::{Decision, Import, Model, Name, Reference, Relation, Scenario};

// Re-export Position and Span from base for convenience
pub use crate::base::{Position, Span};
