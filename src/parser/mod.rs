//! Parser for architecture description files
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind
//!     ↓
//! Parser → Model (syntax layer) + recoverable SyntaxErrors
//!     ↓
//! HIR → scopes, resolution, diagnostics
//! ```
//!
//! The rest of the crate only sees the [`ModelParser`] trait, so a host can
//! plug in another front end as long as it produces the same [`Model`].

#[allow(clippy::module_inception)]
mod parser;

mod error;
mod lexer;

use std::sync::Arc;

pub use error::{SyntaxError, SyntaxErrorKind};
pub use lexer::{KEYWORDS, Lexer, Token, TokenKind, tokenize};

use crate::syntax::Model;

/// Result of parsing one file.
///
/// `model` is `None` only when a fatal error stopped the parser; recoverable
/// errors leave a usable, possibly partial model.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub model: Option<Arc<Model>>,
    pub errors: Vec<SyntaxError>,
    pub fatal: Option<SyntaxError>,
}

impl ParseResult {
    pub fn ok(model: Model) -> Self {
        Self {
            model: Some(Arc::new(model)),
            ..Self::default()
        }
    }

    pub fn ok_with_errors(model: Model, errors: Vec<SyntaxError>) -> Self {
        Self {
            model: Some(Arc::new(model)),
            errors,
            fatal: None,
        }
    }

    pub fn err(fatal: SyntaxError, errors: Vec<SyntaxError>) -> Self {
        Self {
            model: None,
            errors,
            fatal: Some(fatal),
        }
    }

    /// No errors of any kind.
    pub fn is_ok(&self) -> bool {
        self.model.is_some() && self.errors.is_empty()
    }

    /// Every error, recoverable first, then the fatal one.
    pub fn all_errors(&self) -> impl Iterator<Item = &SyntaxError> {
        self.errors.iter().chain(self.fatal.iter())
    }
}

/// Turns source text into a [`Model`].
pub trait ModelParser: Send + Sync {
    fn parse(&self, path: &str, text: &str) -> ParseResult;
}

/// The bundled parser for the architecture DSL.
#[derive(Debug, Clone, Copy, Default)]
pub struct DslParser;

impl ModelParser for DslParser {
    fn parse(&self, path: &str, text: &str) -> ParseResult {
        parse(path, text)
    }
}

/// Parse `text` with the bundled grammar. `path` is only used for logging.
pub fn parse(path: &str, text: &str) -> ParseResult {
    match parser::Parser::new(text).parse() {
        Ok((model, errors)) => {
            tracing::trace!(
                path,
                elements = model.elements.len(),
                errors = errors.len(),
                "parsed"
            );
            if errors.is_empty() {
                ParseResult::ok(model)
            } else {
                ParseResult::ok_with_errors(model, errors)
            }
        }
        Err((fatal, errors)) => {
            tracing::debug!(path, error = %fatal, "parse failed");
            ParseResult::err(fatal, errors)
        }
    }
}
