//! Shared fixtures and assertions for integration tests.

#![allow(dead_code)]

pub mod diagnostic_helpers;
pub mod source_fixtures;
pub mod workspace_helpers;
