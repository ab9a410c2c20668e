//! Error types for workspace operations.
//!
//! Analysis findings are never errors: unresolved references are
//! [`crate::hir::Resolution`] values and rule findings are
//! [`crate::hir::Diagnostic`]s. This type covers operations that cannot
//! complete at all.

use thiserror::Error;

use crate::base::Span;
use crate::parser::SyntaxError;

/// Errors returned by workspace, loader and configuration operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation needs a document that is not open.
    #[error("Document not open: {0}")]
    DocumentNotOpen(String),

    /// An edit range lies outside the document.
    #[error("Invalid edit range in {uri}: {start_line}:{start_col}..{end_line}:{end_col}")]
    InvalidRange {
        uri: String,
        start_line: u32,
        start_col: u32,
        end_line: u32,
        end_col: u32,
    },

    /// The file could not be parsed into any model.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: SyntaxError,
    },

    /// IO error while reading a file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Failed to scan {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    /// The path does not name a directory.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    /// Some files of a batch failed; the rest were loaded.
    #[error("Failed to load {} file(s):\n  {}", .0.len(), join_errors(.0))]
    Batch(Vec<Error>),

    /// Malformed configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A rename target that is not a valid identifier.
    #[error("Invalid identifier: {0:?}")]
    InvalidName(String),
}

impl Error {
    pub fn invalid_range(uri: impl Into<String>, span: Span) -> Self {
        Self::InvalidRange {
            uri: uri.into(),
            start_line: span.start.line,
            start_col: span.start.column,
            end_line: span.end.line,
            end_col: span.end.column,
        }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
