//! Type checking error types.

use crate::ast::{BinOp, Type};
use crate::token::Span;

/// An error that occurred during type checking.
///
/// Contains a human-readable message and, when the error can be traced to
/// a source location, the span to underline. The checker accumulates these
/// rather than stopping at the first.
#[derive(Debug, Clone)]
pub struct TypeError {
    /// A human-readable description of the error.
    pub message: String,
    /// The source location where the error occurred, if available.
    pub span: Option<Span>,
}

impl TypeError {
    /// Creates a new error with a source location.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        TypeError {
            message: message.into(),
            span: Some(span),
        }
    }

    pub(super) fn undefined_identifier(name: &str, span: Span) -> Self {
        TypeError::new(format!("Undefined identifier '{}'", name), span)
    }

    pub(super) fn redefinition(name: &str, span: Span) -> Self {
        TypeError::new(format!("Name '{}' already defined", name), span)
    }

    pub(super) fn global_at_inner_scope(span: Span) -> Self {
        TypeError::new(
            "Can only declare global identifiers at top level scope",
            span,
        )
    }

    pub(super) fn array_size_not_int(ty: Type, span: Span) -> Self {
        TypeError::new(
            format!("Size of array has non-integer type '{}'", ty),
            span,
        )
    }

    pub(super) fn procedure_in_value_context(name: &str, span: Span) -> Self {
        TypeError::new(
            format!("Identifier '{}' is a procedure, not a variable", name),
            span,
        )
    }

    pub(super) fn read_from_out_param(span: Span) -> Self {
        TypeError::new("Cannot read from out parameter", span)
    }

    pub(super) fn assign_to_in_param(span: Span) -> Self {
        TypeError::new("Cannot assign to input parameter", span)
    }

    pub(super) fn not_an_array(span: Span) -> Self {
        TypeError::new("Subscripted value is not an array", span)
    }

    pub(super) fn index_not_int(span: Span) -> Self {
        TypeError::new("Array index is not an integer", span)
    }

    pub(super) fn not_on_float(span: Span) -> Self {
        TypeError::new("Operator 'not' is not valid on floats", span)
    }

    pub(super) fn bitwise_on_type(ty: Type, span: Span) -> Self {
        TypeError::new(
            format!("Bitwise operators only valid on integers, not '{}'", ty),
            span,
        )
    }

    pub(super) fn operator_on_non_numbers(op: BinOp, span: Span) -> Self {
        TypeError::new(format!("Operator '{}' only valid on numbers", op), span)
    }

    pub(super) fn incompatible_types(a: Type, b: Type, span: Span) -> Self {
        TypeError::new(format!("Incompatible types '{}' and '{}'", a, b), span)
    }

    pub(super) fn not_a_procedure(name: &str, span: Span) -> Self {
        TypeError::new(
            format!("Identifier '{}' is not a procedure", name),
            span,
        )
    }

    pub(super) fn arity_mismatch(name: &str, want: usize, got: usize, span: Span) -> Self {
        TypeError::new(
            format!(
                "Procedure '{}' takes exactly {} arguments ({} given)",
                name, want, got
            ),
            span,
        )
    }

    pub(super) fn out_arg_not_identifier(span: Span) -> Self {
        TypeError::new("Argument to out parameter must be an identifier", span)
    }

    pub(super) fn in_param_as_out_arg(name: &str, span: Span) -> Self {
        TypeError::new(
            format!("Cannot pass input parameter '{}' to an out parameter", name),
            span,
        )
    }

    pub(super) fn arg_type_mismatch(arg: Type, param: Type, span: Span) -> Self {
        TypeError::new(
            format!(
                "Argument type '{}' does not match parameter type '{}'",
                arg, param
            ),
            span,
        )
    }
}

impl std::fmt::Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(span) = &self.span {
            write!(f, "{}:{}: {}", span.line, span.start, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for TypeError {}
