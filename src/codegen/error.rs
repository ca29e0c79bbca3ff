//! Code generation error types.

use crate::token::Span;

/// An error that occurred during code generation.
///
/// For a tree that passed the type checker these should not occur; the
/// two real conditions are register exhaustion (a static limit) and a
/// malformed tree handed in without checking.
#[derive(Debug)]
pub struct CodegenError {
    /// A human-readable description of the error.
    pub message: String,
    /// The source location where the error occurred, if available.
    pub span: Option<Span>,
}

impl CodegenError {
    /// Creates a new error with a message and source location.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        CodegenError {
            message: message.into(),
            span: Some(span),
        }
    }

    /// Creates a new error with only a message.
    pub fn without_span(message: impl Into<String>) -> Self {
        CodegenError {
            message: message.into(),
            span: None,
        }
    }

    /// The expression tree needed more live registers than the static
    /// limit allows.
    pub(super) fn register_limit(limit: usize) -> Self {
        CodegenError::without_span(format!(
            "Expression too complex: more than {} live registers required",
            limit
        ))
    }

    /// The tree violates an invariant the type checker establishes.
    pub(super) fn malformed(message: impl Into<String>, span: Span) -> Self {
        CodegenError::new(
            format!("Malformed tree: {} (was the type checker run?)", message.into()),
            span,
        )
    }
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(span) = &self.span {
            write!(f, "{}:{}: {}", span.line, span.start, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for CodegenError {}
