//! Text scanning helpers shared by the editor features.
//!
//! Columns are char indices within a line, matching [`crate::base::Position`].

use crate::parser::KEYWORDS;

/// Check if a character is considered part of a word (identifier).
///
/// Uses Unicode Standard Annex #31 rules for identifier characters.
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[inline]
fn is_reference_character(c: char) -> bool {
    is_word_character(c) || c == '.'
}

/// Whether `text` can be written as an element identifier.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || unicode_ident::is_xid_start(first))
        && chars.all(is_word_character)
        && !KEYWORDS.contains(&text)
}

/// Find the boundaries of a word at the given position.
///
/// Returns `Some((start, end))` where `start` is the character index of the word start
/// and `end` is the character index after the last word character.
/// Returns `None` if there is no word at the position.
pub fn find_word_boundaries(chars: &[char], position: usize) -> Option<(usize, usize)> {
    find_boundaries(chars, position, is_word_character)
}

/// Like [`find_word_boundaries`], but a cursor sitting right after the last
/// character of a word still counts as being on it.
fn find_boundaries(
    chars: &[char],
    position: usize,
    accept: impl Fn(char) -> bool,
) -> Option<(usize, usize)> {
    let on = |i: usize| chars.get(i).is_some_and(|c| accept(*c));
    let position = if on(position) {
        position
    } else if position > 0 && on(position - 1) {
        position - 1
    } else {
        return None;
    };

    let mut start = position;
    while start > 0 && accept(chars[start - 1]) {
        start -= 1;
    }
    let mut end = position;
    while end < chars.len() && accept(chars[end]) {
        end += 1;
    }
    Some((start, end))
}

/// Extract the word (identifier) at the cursor position in a line of text.
///
/// # Example
/// ```
/// use archscope::ide::text_utils::extract_word_at_cursor;
///
/// let line = "Web -> Billing.Api";
/// assert_eq!(extract_word_at_cursor(line, 1), Some("Web".to_string()));
/// assert_eq!(extract_word_at_cursor(line, 16), Some("Api".to_string()));
/// assert_eq!(extract_word_at_cursor(line, 5), None);
/// ```
pub fn extract_word_at_cursor(line: &str, position: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let (start, end) = find_word_boundaries(&chars, position)?;
    Some(chars[start..end].iter().collect())
}

/// Extract the dotted reference at the cursor, e.g. `Billing.Api`.
///
/// Returns the reference text and the char range it occupies. Leading and
/// trailing dots are not part of the reference.
///
/// # Example
/// ```
/// use archscope::ide::text_utils::extract_reference_at_cursor;
///
/// let line = "Web -> Billing.Api \"calls\"";
/// let (text, range) = extract_reference_at_cursor(line, 9).unwrap();
/// assert_eq!(text, "Billing.Api");
/// assert_eq!(range, (7, 18));
/// ```
pub fn extract_reference_at_cursor(line: &str, position: usize) -> Option<(String, (usize, usize))> {
    let chars: Vec<char> = line.chars().collect();
    let (mut start, mut end) = find_boundaries(&chars, position, is_reference_character)?;
    while start < end && chars[start] == '.' {
        start += 1;
    }
    while end > start && chars[end - 1] == '.' {
        end -= 1;
    }
    if start == end {
        return None;
    }
    Some((chars[start..end].iter().collect(), (start, end)))
}

/// The partially typed reference ending at `position`, for completion.
///
/// Empty when the cursor does not follow an identifier or a dot.
pub fn reference_prefix(line: &str, position: usize) -> String {
    let chars: Vec<char> = line.chars().take(position).collect();
    let start = chars
        .iter()
        .rposition(|c| !is_reference_character(*c))
        .map_or(0, |i| i + 1);
    chars[start..].iter().collect()
}
