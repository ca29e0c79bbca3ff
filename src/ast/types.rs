//! Value types and parameter directions for the Pell AST.

use std::fmt;

/// A value type in the Pell language.
///
/// Types are named by their declaration keyword. This is the full type set;
/// arrays are a `VarDecl` property (`array_length`), not a distinct type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// The `int` type.
    Int,
    /// The `float` type.
    Float,
    /// The `bool` type.
    Bool,
    /// The `string` type.
    Str,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Bool => "bool",
            Type::Str => "string",
        };
        write!(f, "{}", name)
    }
}

/// The direction of a procedure parameter.
///
/// `in` parameters are passed by value and are read-only in the callee;
/// `out` parameters are passed by reference and are write-only in the
/// callee (their final value is visible to the caller).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// An `in` parameter.
    In,
    /// An `out` parameter.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}
