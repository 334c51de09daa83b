//! Source location tracking
//!
//! Lines and columns are 1-based. Every character other than a newline moves
//! the column by one, tabs included, so reported columns match what the
//! scanner counts.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and character offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Character offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Offset 0, line 1, column 1
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Self::new(self.offset + 1, self.line + 1, 1)
        } else {
            Self::new(self.offset + 1, self.line, self.column + 1)
        }
    }

    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start (inclusive) to end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Span covering `text` starting at `start`
    pub fn covering(start: Position, text: &str) -> Self {
        Self {
            start,
            end: start.advance_str(text),
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Placeholder for synthesized nodes
    pub fn dummy() -> Self {
        Self {
            start: Position::start(),
            end: Position::start(),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Line index over a source text, used to quote the offending line in errors
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    lines: Vec<String>,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        let lines = source.lines().map(str::to_string).collect();
        Self { source, lines }
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: usize) -> Option<&str> {
        if line_num == 0 {
            return None;
        }
        self.lines.get(line_num - 1).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Format an error message with the source line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = format!("Error: {}\n", message);
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = span.start.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let caret_count = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column).max(1)
            } else {
                1
            };
            result.push_str(&format!(
                "{} | {}{}\n",
                padding,
                " ".repeat(span.start.column.saturating_sub(1)),
                "^".repeat(caret_count)
            ));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_tabs_as_one_column() {
        let pos = Position::start().advance_str("a\tb");
        assert_eq!(pos.column, 4);
        assert_eq!(pos.line, 1);
    }

    #[test]
    fn test_newline_resets_column() {
        let pos = Position::start().advance_str("ab\ncd");
        assert_eq!((pos.line, pos.column, pos.offset), (2, 3, 5));
    }

    #[test]
    fn test_merge_takes_outer_bounds() {
        let a = Span::covering(Position::start(), "abc");
        let b = Span::covering(Position::new(5, 1, 6), "de");
        let merged = b.merge(a);
        assert_eq!(merged.start.offset, 0);
        assert_eq!(merged.end.offset, 7);
        assert_eq!(merged.len(), 7);
    }

    #[test]
    fn test_format_error_points_at_column() {
        let map = SourceMap::new("program p;\nx := ?;\n".to_string());
        let span = Span::covering(Position::new(16, 2, 6), "?");
        let out = map.format_error(&span, "unexpected character");
        assert!(out.contains("--> 2:6"));
        assert!(out.contains("2 | x := ?;"));
        assert!(out.contains("|      ^"));
    }
}
