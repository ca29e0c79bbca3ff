//! The runtime I/O procedure table.
//!
//! The compiler recognizes a fixed set of procedure names supplied by the
//! runtime library (`runtime.c`, linked separately). The type checker
//! predeclares them when the runtime is enabled, the optimizer consults
//! their parameter directions, and the code generator emits their label
//! bodies, which call C functions of the same names.

use crate::ast::{Direction, Type};

/// A runtime procedure signature.
///
/// Every runtime procedure takes exactly one parameter: the `get*`
/// procedures write through an `out` parameter, the `put*` procedures read
/// an `in` parameter.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeProc {
    /// The procedure name, as written in source and in C.
    pub name: &'static str,
    /// The parameter type.
    pub ty: Type,
    /// The parameter direction.
    pub direction: Direction,
}

/// The runtime procedures, in emission order.
pub const RUNTIME_PROCS: &[RuntimeProc] = &[
    RuntimeProc {
        name: "getBool",
        ty: Type::Bool,
        direction: Direction::Out,
    },
    RuntimeProc {
        name: "getInteger",
        ty: Type::Int,
        direction: Direction::Out,
    },
    RuntimeProc {
        name: "getFloat",
        ty: Type::Float,
        direction: Direction::Out,
    },
    RuntimeProc {
        name: "getString",
        ty: Type::Str,
        direction: Direction::Out,
    },
    RuntimeProc {
        name: "putBool",
        ty: Type::Bool,
        direction: Direction::In,
    },
    RuntimeProc {
        name: "putInteger",
        ty: Type::Int,
        direction: Direction::In,
    },
    RuntimeProc {
        name: "putFloat",
        ty: Type::Float,
        direction: Direction::In,
    },
    RuntimeProc {
        name: "putString",
        ty: Type::Str,
        direction: Direction::In,
    },
];

/// Looks up a runtime procedure by name.
pub fn lookup(name: &str) -> Option<&'static RuntimeProc> {
    RUNTIME_PROCS.iter().find(|proc| proc.name == name)
}
