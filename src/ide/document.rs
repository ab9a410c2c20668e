//! One open document: text, version and lazily parsed model.

use std::sync::Arc;

use crate::base::{LineIndex, Position, Span};
use crate::error::{Error, Result};
use crate::parser::{ModelParser, ParseResult, TokenKind, tokenize};
use crate::syntax::Model;

use super::local_defs::LocalDefinitions;

/// An edit sent by the editor: a replaced range, or the whole text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextChange {
    pub range: Option<Span>,
    pub text: String,
}

impl TextChange {
    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }

    pub fn incremental(range: Span, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }
}

/// Text of an open document plus everything derived from it.
///
/// The line index and local definitions are rebuilt on every edit. The parse
/// is cached and dropped on every edit, before the edit call returns.
#[derive(Clone, Debug)]
pub struct Document {
    uri: Arc<str>,
    text: String,
    version: i32,
    line_index: LineIndex,
    local_defs: LocalDefinitions,
    parsed: Option<ParseResult>,
}

impl Document {
    pub fn new(uri: impl Into<Arc<str>>, text: impl Into<String>, version: i32) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        let local_defs = LocalDefinitions::build(&text, &line_index);
        Self {
            uri: uri.into(),
            text,
            version,
            line_index,
            local_defs,
            parsed: None,
        }
    }

    pub fn uri(&self) -> &Arc<str> {
        &self.uri
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn local_definitions(&self) -> &LocalDefinitions {
        &self.local_defs
    }

    pub fn line_text(&self, line: u32) -> Option<&str> {
        self.line_index.line_text(&self.text, line)
    }

    /// Apply one edit and bump the version.
    ///
    /// A range whose start lies after its end, or on a line past the end of
    /// the text, is rejected and the document is left untouched.
    pub fn apply_change(&mut self, change: TextChange, version: i32) -> Result<()> {
        match change.range {
            None => self.text = change.text,
            Some(range) => {
                let invalid = || Error::invalid_range(self.uri.as_ref(), range);
                let start = self.offset(range.start).ok_or_else(invalid)?;
                let end = self.offset(range.end).ok_or_else(invalid)?;
                if start > end {
                    return Err(invalid());
                }
                self.text.replace_range(start..end, &change.text);
            }
        }
        self.version = version;
        self.line_index = LineIndex::new(&self.text);
        self.local_defs = LocalDefinitions::build(&self.text, &self.line_index);
        self.parsed = None;
        Ok(())
    }

    /// Whether `position` is on an identifier token. Keywords, strings and
    /// comments are not identifiers. A cursor right after the last character
    /// still counts.
    pub fn is_identifier_at(&self, position: Position) -> bool {
        let Some(offset) = self.line_index.offset(&self.text, position) else {
            return false;
        };
        tokenize(&self.text)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .any(|t| t.range.contains_inclusive(offset))
    }

    /// Ranges of every identifier token spelled `name`.
    pub fn identifier_spans(&self, name: &str) -> Vec<Span> {
        tokenize(&self.text)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Ident && t.text == name)
            .map(|t| {
                Span::new(
                    self.line_index.position(&self.text, t.range.start()),
                    self.line_index.position(&self.text, t.range.end()),
                )
            })
            .collect()
    }

    fn offset(&self, position: Position) -> Option<usize> {
        self.line_index
            .offset(&self.text, position)
            .map(usize::from)
    }

    /// Whether the cached parse reflects the current text.
    pub fn is_parsed(&self) -> bool {
        self.parsed.is_some()
    }

    /// Parse unless a parse of the current text is cached. Returns `true`
    /// when the parser actually ran.
    pub fn ensure_parsed(&mut self, parser: &dyn ModelParser) -> bool {
        if self.parsed.is_some() {
            return false;
        }
        self.parsed = Some(parser.parse(&self.uri, &self.text));
        true
    }

    pub fn parse_result(&self) -> Option<&ParseResult> {
        self.parsed.as_ref()
    }

    /// The cached model; `None` when unparsed or when parsing failed.
    pub fn model(&self) -> Option<Arc<Model>> {
        self.parsed.as_ref().and_then(|p| p.model.clone())
    }
}
