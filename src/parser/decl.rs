//! Declaration parsing: programs, variables, procedures, parameters.

use super::Parser;
use super::error::ParseError;
use crate::ast::{Decl, Direction, Expr, Param, ProcDecl, Program, Type, VarDecl};
use crate::token::TokenKind;

impl Parser {
    /// Parses the whole program.
    ///
    /// ```text
    /// program := 'program' IDENT 'is' decls 'begin' stmts 'end' 'program'
    /// ```
    ///
    /// A trailing `;` after `end program` is accepted; end of file must
    /// follow.
    pub(super) fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.expect(&TokenKind::Program)?;
        let (name, name_span) = self.expect_identifier()?;
        self.expect(&TokenKind::Is)?;

        let decls = self.parse_decls();

        self.expect(&TokenKind::Begin)?;
        let body = self.parse_stmts();
        self.expect(&TokenKind::End)?;
        self.expect(&TokenKind::Program)?;

        if matches!(self.current_kind(), TokenKind::Semicolon) {
            self.advance();
        }
        if !self.is_eof() {
            return Err(ParseError::expected(
                "end of file",
                &Self::token_kind_display(self.current_kind()),
                self.current_span(),
            ));
        }

        Ok(Program {
            name,
            name_span,
            decls,
            body,
        })
    }

    /// Parses `( decl ';' )*`, stopping at `begin` or end of file.
    ///
    /// This is a resync region: an error inside one declaration is
    /// recorded, the stream skips past the next `;`, and parsing continues
    /// with the following declaration.
    pub(super) fn parse_decls(&mut self) -> Vec<Decl> {
        let mut decls = Vec::new();

        while !matches!(self.current_kind(), TokenKind::Begin | TokenKind::Eof) {
            match self.parse_decl().and_then(|decl| {
                self.expect(&TokenKind::Semicolon)?;
                Ok(decl)
            }) {
                Ok(decl) => decls.push(decl),
                Err(error) => {
                    self.errors.push(error);
                    self.resync();
                }
            }
        }

        decls
    }

    /// Parses one declaration: `['global'] ( var_decl | proc_decl )`.
    fn parse_decl(&mut self) -> Result<Decl, ParseError> {
        self.bail_on_scan_error()?;

        let is_global = if matches!(self.current_kind(), TokenKind::Global) {
            self.advance();
            true
        } else {
            false
        };

        match self.current_kind() {
            TokenKind::Procedure => Ok(Decl::Proc(self.parse_proc_decl(is_global)?)),
            TokenKind::Int | TokenKind::Float | TokenKind::Bool | TokenKind::StringType => {
                Ok(Decl::Var(self.parse_var_decl(is_global)?))
            }
            other => Err(ParseError::expected(
                "declaration",
                &Self::token_kind_display(other),
                self.current_span(),
            )),
        }
    }

    /// Parses `type IDENT ( '[' NUMBER ']' )?`.
    fn parse_var_decl(&mut self, is_global: bool) -> Result<VarDecl, ParseError> {
        let ty = self.parse_type()?;
        let (name, name_span) = self.expect_identifier()?;

        let array_length = if matches!(self.current_kind(), TokenKind::OpenBracket) {
            self.advance();
            let length = self.parse_array_length()?;
            self.expect(&TokenKind::CloseBracket)?;
            Some(length)
        } else {
            None
        };

        Ok(VarDecl {
            is_global,
            ty,
            name,
            name_span,
            array_length,
        })
    }

    /// Parses the NUMBER inside an array declarator.
    fn parse_array_length(&mut self) -> Result<Expr, ParseError> {
        self.bail_on_scan_error()?;
        if let TokenKind::Number(lexeme) = self.current_kind() {
            let lexeme = lexeme.clone();
            let span = self.current_span();
            self.advance();
            Ok(Expr::num(lexeme, span))
        } else {
            Err(ParseError::expected(
                "number",
                &Self::token_kind_display(self.current_kind()),
                self.current_span(),
            ))
        }
    }

    /// Parses a type keyword.
    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let ty = match self.current_kind() {
            TokenKind::Int => Type::Int,
            TokenKind::Float => Type::Float,
            TokenKind::Bool => Type::Bool,
            TokenKind::StringType => Type::Str,
            other => {
                return Err(ParseError::expected(
                    "type",
                    &Self::token_kind_display(other),
                    self.current_span(),
                ));
            }
        };
        self.advance();
        Ok(ty)
    }

    /// Parses a procedure declaration.
    ///
    /// ```text
    /// proc_decl := 'procedure' IDENT '(' [param (',' param)*] ')'
    ///              decls 'begin' stmts 'end' 'procedure'
    /// ```
    fn parse_proc_decl(&mut self, is_global: bool) -> Result<ProcDecl, ParseError> {
        self.expect(&TokenKind::Procedure)?;
        let (name, name_span) = self.expect_identifier()?;

        self.expect(&TokenKind::OpenParen)?;
        let mut params = Vec::new();
        if !matches!(self.current_kind(), TokenKind::CloseParen) {
            loop {
                params.push(self.parse_param()?);
                if matches!(self.current_kind(), TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&TokenKind::CloseParen)?;

        let decls = self.parse_decls();

        self.expect(&TokenKind::Begin)?;
        let body = self.parse_stmts();
        self.expect(&TokenKind::End)?;
        self.expect(&TokenKind::Procedure)?;

        Ok(ProcDecl {
            is_global,
            name,
            name_span,
            params,
            decls,
            body,
        })
    }

    /// Parses `var_decl ('in' | 'out')`.
    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let var_decl = self.parse_var_decl(false)?;
        let direction = match self.current_kind() {
            TokenKind::In => Direction::In,
            TokenKind::Out => Direction::Out,
            other => {
                return Err(ParseError::expected(
                    "'in' or 'out'",
                    &Self::token_kind_display(other),
                    self.current_span(),
                ));
            }
        };
        self.advance();
        Ok(Param {
            var_decl,
            direction,
        })
    }
}
