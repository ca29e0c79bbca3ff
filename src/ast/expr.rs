//! Expression nodes for the Pell AST.

use std::fmt;

use crate::token::Span;

use super::types::Type;

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition `+`.
    Add,
    /// Subtraction `-`.
    Sub,
    /// Multiplication `*`.
    Mul,
    /// Division `/`.
    Div,
    /// Less than `<`.
    Lt,
    /// Less than or equal `<=`.
    Lte,
    /// Greater than `>`.
    Gt,
    /// Greater than or equal `>=`.
    Gte,
    /// Equality `==`.
    Eq,
    /// Inequality `!=`.
    NotEq,
    /// Logical/bitwise `and`.
    And,
    /// Logical/bitwise `or`.
    Or,
}

impl BinOp {
    /// Returns the C spelling of this operator.
    ///
    /// `and` and `or` lower to the C bitwise operators; the type checker
    /// has already restricted their operands to `int`/`bool`.
    pub fn c_symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Lt => "<",
            BinOp::Lte => "<=",
            BinOp::Gt => ">",
            BinOp::Gte => ">=",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::And => "&",
            BinOp::Or => "|",
        }
    }

    /// Returns whether this operator is a comparison.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte | BinOp::Eq | BinOp::NotEq
        )
    }

    /// Returns whether this operator is `and` or `or`.
    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self {
            BinOp::And => "and",
            BinOp::Or => "or",
            other => other.c_symbol(),
        };
        write!(f, "{}", source)
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Arithmetic negation `-`.
    Neg,
    /// The `not` operator. Logical on `bool` operands, bitwise on `int`.
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "not"),
        }
    }
}

/// The kind of an expression.
///
/// Numeric literals keep their lexeme text; a `.` in the lexeme
/// distinguishes float from int, and the boolean literals travel as the
/// lexemes `true` and `false`. String lexemes include their quotes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A binary operation.
    BinaryOp {
        /// The operator.
        op: BinOp,
        /// The left operand.
        left: Box<Expr>,
        /// The right operand.
        right: Box<Expr>,
    },

    /// A unary operation.
    UnaryOp {
        /// The operator.
        op: UnOp,
        /// The operand.
        operand: Box<Expr>,
    },

    /// A numeric or boolean literal, kept as its lexeme.
    Num(String),

    /// A string literal, including the surrounding quotes.
    Str(String),

    /// A reference to a declared name.
    Name(String),

    /// An array element access `name[index]`.
    Subscript {
        /// The array name.
        name: String,
        /// The span of the array name alone.
        name_span: Span,
        /// The index expression.
        index: Box<Expr>,
    },
}

/// An expression with source location and type annotation.
///
/// `ty` is written by the type checker; after a successful check every
/// expression reachable from an evaluated context carries its type.
/// Equality compares structure only: spans and annotations are ignored,
/// so a re-parsed tree compares equal to the original.
#[derive(Debug, Clone)]
pub struct Expr {
    /// The kind of expression.
    pub kind: ExprKind,
    /// The source location of this expression.
    pub span: Span,
    /// The type computed by the checker, if checking has run.
    pub ty: Option<Type>,
}

impl Expr {
    /// Creates a new expression with the given kind and span, untyped.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            ty: None,
        }
    }

    /// Creates a `Num` literal expression.
    pub fn num(lexeme: impl Into<String>, span: Span) -> Self {
        Expr::new(ExprKind::Num(lexeme.into()), span)
    }

    /// Creates a `Name` reference expression.
    pub fn name(id: impl Into<String>, span: Span) -> Self {
        Expr::new(ExprKind::Name(id.into()), span)
    }

    /// Returns the literal lexeme if this expression is a `Num`.
    pub fn as_num(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Num(lexeme) => Some(lexeme),
            _ => None,
        }
    }

    /// Returns the identifier if this expression is a `Name`.
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(id) => Some(id),
            _ => None,
        }
    }

    /// Returns whether this expression is a `Num` or `Str` literal.
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Num(_) | ExprKind::Str(_))
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 0, 1)
    }

    #[test]
    fn test_expr_eq_ignores_span_and_ty() {
        let a = Expr::num("1", Span::new(0, 0, 1));
        let mut b = Expr::num("1", Span::new(5, 5, 9));
        b.ty = Some(Type::Int);
        assert_eq!(a, b);
    }

    #[test]
    fn test_expr_eq_compares_structure() {
        let a = Expr::new(
            ExprKind::BinaryOp {
                op: BinOp::Add,
                left: Box::new(Expr::num("1", span())),
                right: Box::new(Expr::num("2", span())),
            },
            span(),
        );
        let b = Expr::new(
            ExprKind::BinaryOp {
                op: BinOp::Add,
                left: Box::new(Expr::num("1", span())),
                right: Box::new(Expr::num("3", span())),
            },
            span(),
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_binop_c_symbols() {
        assert_eq!(BinOp::And.c_symbol(), "&");
        assert_eq!(BinOp::Or.c_symbol(), "|");
        assert_eq!(BinOp::NotEq.c_symbol(), "!=");
    }

    #[test]
    fn test_binop_display_uses_source_spelling() {
        assert_eq!(BinOp::And.to_string(), "and");
        assert_eq!(BinOp::Lte.to_string(), "<=");
    }

    #[test]
    fn test_literal_helpers() {
        assert!(Expr::num("1", span()).is_literal());
        assert!(!Expr::name("x", span()).is_literal());
        assert_eq!(Expr::num("1.5", span()).as_num(), Some("1.5"));
        assert_eq!(Expr::name("x", span()).as_name(), Some("x"));
    }
}
