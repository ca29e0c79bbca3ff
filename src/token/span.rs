//! Source location tracking for the Pell compiler.
//!
//! This module provides the [`Span`] struct which records where a token or
//! AST node appeared in the source, for error reporting.

/// A span covering a range of columns on one source line.
///
/// `Span` tracks the positions the scanner hands out: a 1-indexed line
/// number and 0-indexed, inclusive start/end columns within that line.
/// Columns count characters, not bytes.
///
/// # Examples
///
/// ```
/// use pell::token::Span;
///
/// let span = Span::new(0, 4, 1);
/// assert_eq!(span.end, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// The 0-indexed column of the first character (inclusive).
    pub start: usize,
    /// The 0-indexed column of the last character (inclusive).
    pub end: usize,
    /// The 1-indexed line number.
    pub line: usize,
}

impl Span {
    /// Creates a new `Span` with the given columns and line.
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Span { start, end, line }
    }

    /// Returns a span stretching from the start of `self` to the end of
    /// `other`.
    ///
    /// Used to underline both operands of an expression in one diagnostic.
    /// The line is taken from `self`; joining across lines keeps the first
    /// line, which is where the underline is drawn.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_new() {
        let span = Span::new(3, 7, 2);
        assert_eq!(span.start, 3);
        assert_eq!(span.end, 7);
        assert_eq!(span.line, 2);
    }

    #[test]
    fn test_span_join() {
        let a = Span::new(4, 4, 1);
        let b = Span::new(8, 12, 1);
        assert_eq!(a.join(b), Span::new(4, 12, 1));
    }

    #[test]
    fn test_span_copy() {
        let a = Span::new(0, 1, 1);
        let b = a;
        assert_eq!(a, b);
    }
}
