//! Parser helper methods for token navigation and basic operations.

use super::Parser;
use super::error::ParseError;
use crate::token::{Span, Token, TokenKind};

impl Parser {
    /// Returns a user-friendly display string for a token kind.
    pub(super) fn token_kind_display(kind: &TokenKind) -> String {
        match kind {
            TokenKind::Identifier(s) => format!("identifier '{}'", s),
            TokenKind::Number(n) => format!("number '{}'", n),
            TokenKind::Str(s) => format!("string {}", s),
            TokenKind::Error(_) => "scan error".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::OpenParen => "'('".to_string(),
            TokenKind::CloseParen => "')'".to_string(),
            TokenKind::OpenBracket => "'['".to_string(),
            TokenKind::CloseBracket => "']'".to_string(),
            TokenKind::OpenBrace => "'{'".to_string(),
            TokenKind::CloseBrace => "'}'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::Lte => "'<='".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::Gte => "'>='".to_string(),
            TokenKind::NotEqual => "'!='".to_string(),
            TokenKind::Equal => "'=='".to_string(),
            TokenKind::Assign => "':='".to_string(),
            TokenKind::Program => "'program'".to_string(),
            TokenKind::Is => "'is'".to_string(),
            TokenKind::Begin => "'begin'".to_string(),
            TokenKind::End => "'end'".to_string(),
            TokenKind::Procedure => "'procedure'".to_string(),
            TokenKind::Global => "'global'".to_string(),
            TokenKind::In => "'in'".to_string(),
            TokenKind::Out => "'out'".to_string(),
            TokenKind::If => "'if'".to_string(),
            TokenKind::Then => "'then'".to_string(),
            TokenKind::Else => "'else'".to_string(),
            TokenKind::For => "'for'".to_string(),
            TokenKind::Return => "'return'".to_string(),
            TokenKind::Not => "'not'".to_string(),
            TokenKind::And => "'and'".to_string(),
            TokenKind::Or => "'or'".to_string(),
            TokenKind::True => "'true'".to_string(),
            TokenKind::False => "'false'".to_string(),
            TokenKind::StringType => "'string'".to_string(),
            TokenKind::Int => "'int'".to_string(),
            TokenKind::Bool => "'bool'".to_string(),
            TokenKind::Float => "'float'".to_string(),
            TokenKind::Eof => "end of file".to_string(),
        }
    }

    /// Returns a reference to the current token.
    ///
    /// Safe at any position: past the end it returns the last token,
    /// which is always `Eof`.
    pub(super) fn current(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Returns the kind of the current token.
    pub(super) fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    /// Returns the span of the current token.
    pub(super) fn current_span(&self) -> Span {
        self.current().span
    }

    /// Returns the kind of the token after the current one.
    ///
    /// Past the end this returns `Eof`; together with
    /// [`current_kind`](Self::current_kind) it gives the parser its
    /// one-token lookahead.
    pub(super) fn peek_kind(&self) -> &TokenKind {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    /// Returns `true` if the current token is `Eof`.
    pub(super) fn is_eof(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Advances to the next token. Does nothing at `Eof`.
    pub(super) fn advance(&mut self) {
        if !self.is_eof() {
            self.pos += 1;
        }
    }

    /// Promotes a scan error at the current token into a parse error.
    ///
    /// Returns `Ok(())` for every other token kind.
    pub(super) fn bail_on_scan_error(&self) -> Result<(), ParseError> {
        if let TokenKind::Error(message) = self.current_kind() {
            Err(ParseError::new(message.clone(), self.current_span()))
        } else {
            Ok(())
        }
    }

    /// Expects the current token to match `expected`, consuming it.
    ///
    /// Returns the consumed token's span.
    pub(super) fn expect(&mut self, expected: &TokenKind) -> Result<Span, ParseError> {
        self.bail_on_scan_error()?;
        if self.current_kind() == expected {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(ParseError::expected(
                &Self::token_kind_display(expected),
                &Self::token_kind_display(self.current_kind()),
                self.current_span(),
            ))
        }
    }

    /// Expects an identifier token and returns its name and span.
    pub(super) fn expect_identifier(&mut self) -> Result<(String, Span), ParseError> {
        self.bail_on_scan_error()?;
        if let TokenKind::Identifier(name) = self.current_kind() {
            let name = name.clone();
            let span = self.current_span();
            self.advance();
            Ok((name, span))
        } else {
            Err(ParseError::expected(
                "identifier",
                &Self::token_kind_display(self.current_kind()),
                self.current_span(),
            ))
        }
    }

    /// Skips ahead to the next resync point.
    ///
    /// Used after a parse error inside a declaration or statement: the
    /// stream is advanced past the next `;` (the follow set of both), or to
    /// `Eof` as a bail-out, and parsing resumes with the next item.
    pub(super) fn resync(&mut self) {
        loop {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Eof => return,
                _ => self.advance(),
            }
        }
    }
}
