//! Statement nodes for the Pell AST.

use crate::token::Span;

use super::expr::Expr;

/// The kind of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// An assignment `target := value`.
    ///
    /// The parser guarantees `target` is a `Name` or `Subscript`.
    Assign {
        /// The storage being written.
        target: Expr,
        /// The value expression.
        value: Expr,
    },

    /// A conditional `if (test) then … [else …] end if`.
    ///
    /// A successful parse guarantees `body` is non-empty, and `orelse`
    /// is non-empty whenever an `else` clause was written.
    If {
        /// The test expression.
        test: Expr,
        /// The `then` branch.
        body: Vec<Stmt>,
        /// The `else` branch; empty when absent.
        orelse: Vec<Stmt>,
    },

    /// A loop `for (init; test) … end for`.
    For {
        /// The header assignment, run once before the loop.
        /// Always a [`StmtKind::Assign`].
        init: Box<Stmt>,
        /// The test expression, evaluated before each iteration.
        test: Expr,
        /// The loop body.
        body: Vec<Stmt>,
    },

    /// A procedure call `name(args)`.
    Call {
        /// The callee name.
        name: String,
        /// The argument expressions.
        args: Vec<Expr>,
    },

    /// A `return` statement.
    Return,
}

/// A statement with source location.
///
/// Equality compares structure only; spans are ignored.
#[derive(Debug, Clone)]
pub struct Stmt {
    /// The kind of statement.
    pub kind: StmtKind,
    /// The source location of this statement.
    pub span: Span,
}

impl Stmt {
    /// Creates a new statement with the given kind and span.
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl PartialEq for Stmt {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stmt_eq_ignores_span() {
        let a = Stmt::new(StmtKind::Return, Span::new(0, 5, 1));
        let b = Stmt::new(StmtKind::Return, Span::new(9, 14, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_stmt_eq_compares_kind() {
        let span = Span::new(0, 0, 1);
        let a = Stmt::new(StmtKind::Return, span);
        let b = Stmt::new(
            StmtKind::Call {
                name: "f".to_string(),
                args: vec![],
            },
            span,
        );
        assert_ne!(a, b);
    }
}
