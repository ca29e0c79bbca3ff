//! Declaration nodes for the Pell AST.

use crate::token::Span;

use super::expr::Expr;
use super::stmt::Stmt;
use super::types::{Direction, Type};

/// A variable declaration, e.g. `int x` or `global float f[16]`.
#[derive(Debug, Clone)]
pub struct VarDecl {
    /// Whether the declaration carries the `global` keyword.
    pub is_global: bool,
    /// The declared element type.
    pub ty: Type,
    /// The declared name.
    pub name: String,
    /// The span of the name token.
    pub name_span: Span,
    /// The array length, when this declares an array.
    /// Always a `Num` literal when present.
    pub array_length: Option<Expr>,
}

impl VarDecl {
    /// Returns whether this declaration is an array.
    pub fn is_array(&self) -> bool {
        self.array_length.is_some()
    }
}

impl PartialEq for VarDecl {
    fn eq(&self, other: &Self) -> bool {
        self.is_global == other.is_global
            && self.ty == other.ty
            && self.name == other.name
            && self.array_length == other.array_length
    }
}

/// A procedure parameter: a variable declaration plus a direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// The parameter's declaration (type, name, optional array length).
    pub var_decl: VarDecl,
    /// Whether the parameter is passed `in` (by value) or `out`
    /// (by reference).
    pub direction: Direction,
}

/// A procedure declaration.
///
/// Procedures have their own declaration section and body. The procedure's
/// name is visible inside its own scope, which is what permits recursion.
#[derive(Debug, Clone)]
pub struct ProcDecl {
    /// Whether the declaration carries the `global` keyword.
    pub is_global: bool,
    /// The procedure name.
    pub name: String,
    /// The span of the name token.
    pub name_span: Span,
    /// The parameter list.
    pub params: Vec<Param>,
    /// Local declarations.
    pub decls: Vec<Decl>,
    /// The procedure body.
    pub body: Vec<Stmt>,
}

impl PartialEq for ProcDecl {
    fn eq(&self, other: &Self) -> bool {
        self.is_global == other.is_global
            && self.name == other.name
            && self.params == other.params
            && self.decls == other.decls
            && self.body == other.body
    }
}

/// A declaration: either a variable or a procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// A variable declaration.
    Var(VarDecl),
    /// A procedure declaration.
    Proc(ProcDecl),
}

impl Decl {
    /// Returns the declared name.
    pub fn name(&self) -> &str {
        match self {
            Decl::Var(var) => &var.name,
            Decl::Proc(proc) => &proc.name,
        }
    }

    /// Returns the span of the declared name.
    pub fn name_span(&self) -> Span {
        match self {
            Decl::Var(var) => var.name_span,
            Decl::Proc(proc) => proc.name_span,
        }
    }

    /// Returns whether the declaration carries the `global` keyword.
    pub fn is_global(&self) -> bool {
        match self {
            Decl::Var(var) => var.is_global,
            Decl::Proc(proc) => proc.is_global,
        }
    }
}
