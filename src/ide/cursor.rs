//! What sits under the cursor, computed once per request.

use std::sync::Arc;

use crate::base::{FileId, Position, Span};
use crate::hir::Resolution;

use super::local_defs::LocalDefinition;
use super::text_utils::{extract_reference_at_cursor, extract_word_at_cursor};

/// The identifier under the cursor and what it denotes.
#[derive(Clone, Debug)]
pub struct CursorContext {
    /// Normalized path of the document.
    pub path: Arc<str>,
    pub file: FileId,
    /// Reference text up to and including the segment under the cursor:
    /// `Shop` for a cursor on the first segment of `Shop.Web`.
    pub token: String,
    /// The single identifier under the cursor.
    pub word: String,
    /// Range of `token`.
    pub span: Span,
    /// Set when the cursor is on a declaration.
    pub definition: Option<LocalDefinition>,
    pub resolution: Resolution,
}

impl CursorContext {
    /// Last segment of the token.
    pub fn short_name(&self) -> &str {
        self.token.rsplit('.').next().unwrap_or(&self.token)
    }
}

/// Token text, word and token range at `position` of `line`.
pub(crate) fn token_at(line: &str, position: Position) -> Option<(String, String, Span)> {
    let col = position.column as usize;
    let word = extract_word_at_cursor(line, col)?;
    let (reference, (start, end)) = extract_reference_at_cursor(line, col)?;

    // cut the reference after the segment under the cursor; a cursor on a
    // dot belongs to the segment before it
    let chars: Vec<char> = reference.chars().collect();
    let cursor = col.saturating_sub(start).min(chars.len().saturating_sub(1));
    let cut = chars[cursor..]
        .iter()
        .position(|c| *c == '.')
        .map_or(chars.len(), |offset| cursor + offset);
    let token: String = chars[..cut].iter().collect();
    let end = if cut == chars.len() { end } else { start + cut };

    let span = Span::from_coords(position.line, start as u32, position.line, end as u32);
    Some((token, word, span))
}
