//! Source spans
//!
//! Spans are half-open character ranges into the original source text.

use serde::{Deserialize, Serialize};

/// A half-open range `[start, end)` of character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Merge two spans into the smallest span covering both
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Length of the span in characters
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Convert a character offset into a (1-based line, 0-based column) pair.
///
/// Used by hosts to anchor diagnostics that carry only a span.
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 0;
    for (i, ch) in source.chars().enumerate() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let a = Span::new(3, 7);
        let b = Span::new(5, 12);
        assert_eq!(a.merge(b), Span::new(3, 12));
        assert_eq!(b.merge(a), Span::new(3, 12));
    }

    #[test]
    fn test_len_saturates() {
        assert_eq!(Span::new(5, 3).len(), 0);
        assert!(Span::new(4, 4).is_empty());
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "ab\ncd\nef";
        assert_eq!(offset_to_line_col(source, 0), (1, 0));
        assert_eq!(offset_to_line_col(source, 1), (1, 1));
        assert_eq!(offset_to_line_col(source, 3), (2, 0));
        assert_eq!(offset_to_line_col(source, 7), (3, 1));
    }

    #[test]
    fn test_offset_past_end() {
        assert_eq!(offset_to_line_col("x", 100), (1, 1));
    }
}
