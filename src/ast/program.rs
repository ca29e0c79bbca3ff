//! Top-level program structure for the Pell AST.

use crate::token::Span;

use super::decl::Decl;
use super::stmt::Stmt;

/// The root node of a Pell program's AST.
///
/// A program has a name, a declaration section, and a body. Declarations
/// marked `global` are visible inside procedures; the rest of the top-level
/// declarations are visible only in the program body.
///
/// # Examples
///
/// ```text
/// program p is
///     int a;
/// begin
///     a := 1;
/// end program
/// ```
#[derive(Debug, Clone)]
pub struct Program {
    /// The program name.
    pub name: String,
    /// The span of the name token.
    pub name_span: Span,
    /// Top-level declarations.
    pub decls: Vec<Decl>,
    /// The program body.
    pub body: Vec<Stmt>,
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.decls == other.decls && self.body == other.body
    }
}
