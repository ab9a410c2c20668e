//! Syntax error types

use crate::base::Span;

/// Categorized syntax error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// A token appeared where the grammar does not allow it.
    UnexpectedToken,
    /// A required token is missing.
    MissingToken,
    /// An element declared under a parent kind that cannot own it.
    InvalidNesting,
    /// A declaration that is only valid at model root appeared in a body.
    MisplacedDeclaration,
    /// Input ended inside a block, string or comment.
    UnexpectedEof,
    /// The parser gave up after too many errors.
    TooManyErrors,
}

impl SyntaxErrorKind {
    /// Stable code string for diagnostics.
    pub fn code(self) -> &'static str {
        match self {
            SyntaxErrorKind::UnexpectedToken => "unexpected-token",
            SyntaxErrorKind::MissingToken => "missing-token",
            SyntaxErrorKind::InvalidNesting => "invalid-nesting",
            SyntaxErrorKind::MisplacedDeclaration => "misplaced-declaration",
            SyntaxErrorKind::UnexpectedEof => "unexpected-eof",
            SyntaxErrorKind::TooManyErrors => "too-many-errors",
        }
    }
}

/// A syntax error with location and an optional fix hint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Source location
    pub span: Span,
    /// Optional hint for fixing
    pub hint: Option<String>,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
