//! Source buffer and line/column position tracking.
//!
//! Adapted from the teacher's `util::Code`/`util::Position` pair: a source
//! buffer lazily indexes its own line breaks so that repeated position
//! look-ups (diagnostics, indentation tracking) do not re-scan the buffer.

use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// A 1-indexed line/column pair.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source file's text together with a lazily built line-break index.
///
/// Lexer, parser and diagnostics all borrow from the same buffer; tokens'
/// lexemes are slices into it (§3: "`lexeme` is a borrowed slice into the
/// source text; its lifetime equals the source buffer's lifetime").
pub struct SourceCode<'c> {
    pub text: &'c str,
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'c> SourceCode<'c> {
    pub fn new(text: &'c str) -> Self {
        Self {
            text,
            line_breaks: OnceCell::new(),
        }
    }

    fn line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.text
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| if b == b'\n' { Some(i) } else { None })
                .collect()
        })
    }

    /// Resolve a byte offset into a 1-indexed line/column position.
    pub fn position_at(&self, offset: usize) -> Position {
        let breaks = self.line_breaks();
        let line_index = match breaks.binary_search(&offset) {
            Ok(i) | Err(i) => i,
        };
        let line_start = if line_index == 0 {
            0
        } else {
            breaks[line_index - 1] + 1
        };
        let column = self.text[line_start..offset.min(self.text.len())]
            .chars()
            .count()
            + 1;
        Position::new(line_index + 1, column)
    }

    /// Return the slice of source text for one (0-indexed) line, without its
    /// line terminator.
    pub fn line_slice(&self, line: usize) -> &'c str {
        let breaks = self.line_breaks();
        let start = if line == 0 { 0 } else { breaks[line - 1] + 1 };
        let end = breaks.get(line).copied().unwrap_or(self.text.len());
        let end = end.min(self.text.len());
        let raw = &self.text[start..end];
        raw.strip_suffix('\r').unwrap_or(raw)
    }

    pub fn line_count(&self) -> usize {
        self.line_breaks().len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_at_tracks_lines_and_columns() {
        let code = SourceCode::new("abc\ndef\nghi");
        assert_eq!(code.position_at(0), Position::new(1, 1));
        assert_eq!(code.position_at(4), Position::new(2, 1));
        assert_eq!(code.position_at(9), Position::new(3, 2));
    }

    #[test]
    fn line_slice_strips_crlf() {
        let code = SourceCode::new("abc\r\ndef");
        assert_eq!(code.line_slice(0), "abc");
        assert_eq!(code.line_slice(1), "def");
    }
}
