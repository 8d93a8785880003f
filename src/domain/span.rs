//! Character spans into template strings and command lines.

use std::fmt;

/// A range of characters (not bytes) inside a source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Offset of the first character
    pub start: usize,
    /// Number of characters covered, at least one when rendered
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Span covering a single character.
    pub fn at(start: usize) -> Self {
        Self { start, len: 1 }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Render `source` followed by a caret line under this span.
    ///
    /// ```
    /// use argtree::domain::Span;
    ///
    /// let rendered = Span::new(4, 3).underline("dog --nam");
    /// assert_eq!(rendered, "dog --nam\n    ^^^");
    /// ```
    pub fn underline(&self, source: &str) -> String {
        let width = source.chars().count();
        let start = self.start.min(width);
        let carets = self.len.max(1);
        format!("{}\n{}{}", source, " ".repeat(start), "^".repeat(carets))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len <= 1 {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underline_clamps_to_source() {
        let rendered = Span::new(10, 0).underline("abc");
        assert_eq!(rendered, "abc\n   ^");
    }

    #[test]
    fn test_display() {
        assert_eq!(Span::at(3).to_string(), "3");
        assert_eq!(Span::new(3, 2).to_string(), "3..5");
    }
}
