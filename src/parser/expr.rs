//! Expression parsing with top-down operator precedence.
//!
//! Each token kind that may appear in an expression carries a binding
//! power, an optional prefix action, and an optional infix action.
//! [`Parser::parse_expr`] runs the current token's prefix action to form a
//! left term, then folds in infix actions while the next token binds
//! tighter than the caller's minimum.

use super::Parser;
use super::error::ParseError;
use crate::ast::{BinOp, Expr, ExprKind, UnOp};
use crate::token::{Span, TokenKind};

/// Binding power of the `not` prefix operator.
///
/// Level with `and`/`or`, so `not a and b` parses as `(not a) and b`.
const PRECEDENCE_NOT: u8 = 1;

/// Binding power of unary minus.
///
/// Higher than every binary operator, so `-a * b` parses as `(-a) * b`.
const PRECEDENCE_UNARY_MINUS: u8 = 7;

/// Returns the binding power of a token in infix position.
///
/// Zero means the token does not bind at all, which is what terminates the
/// expression loop at `;`, `)`, `,`, and friends.
fn precedence(kind: &TokenKind) -> u8 {
    match kind {
        TokenKind::Or | TokenKind::And => 1,
        TokenKind::Plus | TokenKind::Minus => 2,
        TokenKind::Lt
        | TokenKind::Lte
        | TokenKind::Gt
        | TokenKind::Gte
        | TokenKind::Equal
        | TokenKind::NotEqual => 3,
        TokenKind::Star | TokenKind::Slash => 4,
        TokenKind::OpenParen | TokenKind::OpenBracket => 5,
        _ => 0,
    }
}

/// Converts a token kind to its binary operator, if it is one.
fn token_to_binop(kind: &TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Lte => BinOp::Lte,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::Gte => BinOp::Gte,
        TokenKind::Equal => BinOp::Eq,
        TokenKind::NotEqual => BinOp::NotEq,
        TokenKind::And => BinOp::And,
        TokenKind::Or => BinOp::Or,
        _ => return None,
    };
    Some(op)
}

impl Parser {
    /// Parses an expression with the given minimum binding power.
    ///
    /// Statement parsers call this with 0; prefix and infix actions call
    /// back in with their own power, which is what makes binary operators
    /// left-associative and gives unary minus its grip.
    pub(super) fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        while precedence(self.current_kind()) > min_prec {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    /// Runs the prefix action of the current token.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        self.bail_on_scan_error()?;
        let span = self.current_span();

        match self.current_kind() {
            TokenKind::Number(lexeme) => {
                let lexeme = lexeme.clone();
                self.advance();
                Ok(Expr::num(lexeme, span))
            }
            TokenKind::Identifier(id) => {
                let id = id.clone();
                self.advance();
                Ok(Expr::name(id, span))
            }
            TokenKind::Str(lexeme) => {
                let lexeme = lexeme.clone();
                self.advance();
                Ok(Expr::new(ExprKind::Str(lexeme), span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::num("true", span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::num("false", span))
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expr(PRECEDENCE_UNARY_MINUS)?;
                let span = span.join(operand.span);
                Ok(Expr::new(
                    ExprKind::UnaryOp {
                        op: UnOp::Neg,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_expr(PRECEDENCE_NOT)?;
                let span = span.join(operand.span);
                Ok(Expr::new(
                    ExprKind::UnaryOp {
                        op: UnOp::Not,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenKind::OpenParen => {
                // Grouping: the parens contribute nothing to the tree.
                self.advance();
                let mut inner = self.parse_expr(0)?;
                let close = self.expect(&TokenKind::CloseParen)?;
                inner.span = span.join(close);
                Ok(inner)
            }
            other => Err(ParseError::unexpected(
                &Self::token_kind_display(other),
                span,
            )),
        }
    }

    /// Runs the infix action of the current token on `left`.
    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ParseError> {
        self.bail_on_scan_error()?;
        let span = self.current_span();

        if let Some(op) = token_to_binop(self.current_kind()) {
            let op_prec = precedence(self.current_kind());
            self.advance();
            let right = self.parse_expr(op_prec)?;
            let span = left.span.join(right.span);
            return Ok(Expr::new(
                ExprKind::BinaryOp {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            ));
        }

        match self.current_kind() {
            TokenKind::OpenBracket => self.parse_subscript(left),
            // A '(' after a complete term would be a call, and calls are
            // statements in this language.
            other => Err(ParseError::unexpected(
                &Self::token_kind_display(other),
                span,
            )),
        }
    }

    /// Parses `left[index]` after the opening bracket.
    fn parse_subscript(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let ExprKind::Name(name) = left.kind else {
            return Err(ParseError::new(
                "Subscripted value must be an identifier",
                left.span,
            ));
        };
        let name_span: Span = left.span;

        self.expect(&TokenKind::OpenBracket)?;
        let index = self.parse_expr(0)?;
        let close = self.expect(&TokenKind::CloseBracket)?;

        Ok(Expr::new(
            ExprKind::Subscript {
                name,
                name_span,
                index: Box::new(index),
            },
            name_span.join(close),
        ))
    }
}
