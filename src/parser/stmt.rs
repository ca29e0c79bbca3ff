//! Statement parsing.

use super::Parser;
use super::error::ParseError;
use crate::ast::{Expr, ExprKind, Stmt, StmtKind};
use crate::token::{Span, TokenKind};

impl Parser {
    /// Parses `( stmt ';' )*`, stopping at `end`, `else`, or end of file.
    ///
    /// Like [`parse_decls`](Parser::parse_decls) this is a resync region:
    /// an error inside one statement is recorded and parsing resumes after
    /// the next `;`.
    pub(super) fn parse_stmts(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();

        while !matches!(
            self.current_kind(),
            TokenKind::End | TokenKind::Else | TokenKind::Eof
        ) {
            match self.parse_stmt().and_then(|stmt| {
                self.expect(&TokenKind::Semicolon)?;
                Ok(stmt)
            }) {
                Ok(stmt) => stmts.push(stmt),
                Err(error) => {
                    self.errors.push(error);
                    self.resync();
                }
            }
        }

        stmts
    }

    /// Parses one statement.
    ///
    /// ```text
    /// stmt := assignment | call | if | for | 'return'
    /// ```
    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.bail_on_scan_error()?;

        match self.current_kind() {
            TokenKind::Identifier(_) => {
                if matches!(self.peek_kind(), TokenKind::OpenParen) {
                    self.parse_call()
                } else {
                    self.parse_assignment()
                }
            }
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => {
                let span = self.current_span();
                self.advance();
                Ok(Stmt::new(StmtKind::Return, span))
            }
            other => Err(ParseError::expected(
                "statement",
                &Self::token_kind_display(other),
                self.current_span(),
            )),
        }
    }

    /// Parses `IDENT ('[' expr ']')? ':=' expr`.
    pub(super) fn parse_assignment(&mut self) -> Result<Stmt, ParseError> {
        let (name, name_span) = self.expect_identifier()?;

        let target = if matches!(self.current_kind(), TokenKind::OpenBracket) {
            self.advance();
            let index = self.parse_expr(0)?;
            let close = self.expect(&TokenKind::CloseBracket)?;
            Expr::new(
                ExprKind::Subscript {
                    name,
                    name_span,
                    index: Box::new(index),
                },
                name_span.join(close),
            )
        } else {
            Expr::name(name, name_span)
        };

        self.expect(&TokenKind::Assign)?;
        let value = self.parse_expr(0)?;
        let span = name_span.join(value.span);

        Ok(Stmt::new(StmtKind::Assign { target, value }, span))
    }

    /// Parses `IDENT '(' [expr (',' expr)*] ')'`.
    fn parse_call(&mut self) -> Result<Stmt, ParseError> {
        let (name, name_span) = self.expect_identifier()?;
        self.expect(&TokenKind::OpenParen)?;

        let mut args = Vec::new();
        if !matches!(self.current_kind(), TokenKind::CloseParen) {
            loop {
                args.push(self.parse_expr(0)?);
                if matches!(self.current_kind(), TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let close = self.expect(&TokenKind::CloseParen)?;

        Ok(Stmt::new(
            StmtKind::Call { name, args },
            name_span.join(close),
        ))
    }

    /// Parses an `if` statement.
    ///
    /// ```text
    /// if := 'if' '(' expr ')' 'then' stmts ['else' stmts] 'end' 'if'
    /// ```
    ///
    /// The `then` branch must contain at least one statement; so must the
    /// `else` branch when present.
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let if_span = self.expect(&TokenKind::If)?;
        self.expect(&TokenKind::OpenParen)?;
        let test = self.parse_expr(0)?;
        self.expect(&TokenKind::CloseParen)?;
        self.expect(&TokenKind::Then)?;

        let body = self.parse_stmts();
        if body.is_empty() {
            return Err(ParseError::new(
                "'then' clause must contain at least one statement",
                self.current_span(),
            ));
        }

        let orelse = if matches!(self.current_kind(), TokenKind::Else) {
            self.advance();
            let orelse = self.parse_stmts();
            if orelse.is_empty() {
                return Err(ParseError::new(
                    "'else' clause must contain at least one statement",
                    self.current_span(),
                ));
            }
            orelse
        } else {
            Vec::new()
        };

        self.expect(&TokenKind::End)?;
        let end_span = self.expect(&TokenKind::If)?;

        Ok(Stmt::new(
            StmtKind::If { test, body, orelse },
            if_span.join(end_span),
        ))
    }

    /// Parses a `for` statement.
    ///
    /// ```text
    /// for := 'for' '(' assignment ';' expr ')' stmts 'end' 'for'
    /// ```
    ///
    /// Both the header assignment and the test are required.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let for_span = self.expect(&TokenKind::For)?;
        self.expect(&TokenKind::OpenParen)?;
        let init = self.parse_assignment()?;
        self.expect(&TokenKind::Semicolon)?;
        let test = self.parse_expr(0)?;
        self.expect(&TokenKind::CloseParen)?;

        let body = self.parse_stmts();

        self.expect(&TokenKind::End)?;
        let end_span = self.expect(&TokenKind::For)?;

        Ok(Stmt::new(
            StmtKind::For {
                init: Box::new(init),
                test,
                body,
            },
            Span::join(for_span, end_span),
        ))
    }
}
