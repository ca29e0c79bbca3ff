//! Parse error types.

use crate::token::Span;

/// An error that occurred during parsing.
///
/// `ParseError` contains a human-readable message and the source location
/// where the error occurred. The parser records errors and resynchronizes
/// at the next `;` rather than stopping, so one parse can report several of
/// these.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// A human-readable description of the error.
    pub message: String,
    /// The source location where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new error with the given message and location.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }

    /// Creates an expected-vs-found mismatch error.
    pub fn expected(expected: &str, found: &str, span: Span) -> Self {
        ParseError::new(format!("Expected {}, found {}", expected, found), span)
    }

    /// Creates an error for a token that cannot start or continue an
    /// expression.
    pub fn unexpected(found: &str, span: Span) -> Self {
        ParseError::new(format!("Unexpected {}", found), span)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.span.line, self.span.start, self.message
        )
    }
}

impl std::error::Error for ParseError {}
