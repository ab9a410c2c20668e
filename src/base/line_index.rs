//! Byte offset ↔ line/column conversion.

use text_size::TextSize;

use super::Position;

/// Line start table for one text buffer.
///
/// Columns are counted in chars, so the index needs the text it was built
/// from to convert within a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::from(offset as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::of(text),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset into a position. Offsets past the end clamp to
    /// the end of the text.
    pub fn position(&self, text: &str, offset: TextSize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = usize::from(self.line_starts[line]);
        let column = text
            .get(start..usize::from(offset))
            .map(|s| s.chars().count())
            .unwrap_or(0);
        Position::new(line as u32, column as u32)
    }

    /// Convert a position back into a byte offset.
    ///
    /// Returns `None` for a line past the end; a column past the end of its
    /// line clamps to the line end (excluding the newline).
    pub fn offset(&self, text: &str, position: Position) -> Option<TextSize> {
        let line = position.line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| *next - TextSize::from(1))
            .unwrap_or(self.len);
        let line_text = text.get(usize::from(start)..usize::from(end))?;
        let byte_col = line_text
            .char_indices()
            .nth(position.column as usize)
            .map(|(idx, _)| idx)
            .unwrap_or(line_text.len());
        Some(start + TextSize::from(byte_col as u32))
    }

    /// The text of one line, without its trailing newline.
    pub fn line_text<'t>(&self, text: &'t str, line: u32) -> Option<&'t str> {
        let start = usize::from(*self.line_starts.get(line as usize)?);
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map(|next| usize::from(*next) - 1)
            .unwrap_or(usize::from(self.len));
        text.get(start..end)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }
}
