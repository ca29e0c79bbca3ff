//! Lexical analyzer for the Pell programming language.
//!
//! This module provides the [`Scanner`] which converts source text into a
//! vector of [`Token`]s for parsing.
//!
//! # Overview
//!
//! The scanner works line by line, advancing a column cursor and applying
//! the following priority rules at each position:
//!
//! 1. `//` starts a comment running to the end of the line
//! 2. Whitespace is skipped
//! 3. Unambiguous single-character punctuation maps directly
//! 4. `<=`, `>=`, `!=`, `==`, `:=` match greedily; `<`, `>`, `:` fall back
//!    to single-character tokens; a bare `!` or `=` is an error
//! 5. Identifiers are a letter followed by letters, digits, or underscores;
//!    reserved words map to keyword kinds
//! 6. Numbers are digits with optional `_` separators and an optional
//!    fraction; underscores are stripped from the emitted lexeme
//! 7. String literals run to the closing quote on the same line and accept
//!    a restricted character set
//! 8. Anything else is an error at that column
//!
//! # Errors
//!
//! Scanning never fails. Lexical errors are emitted inline as
//! [`TokenKind::Error`] tokens carrying the error message; an unterminated
//! string consumes the rest of its line and scanning resumes on the next.
//! The final token is always [`TokenKind::Eof`], carrying the last line
//! number of the input.
//!
//! # Examples
//!
//! ```
//! use pell::scanner::Scanner;
//! use pell::token::TokenKind;
//!
//! let tokens = Scanner::new("x := 1;").scan();
//! assert!(matches!(tokens[0].kind, TokenKind::Identifier(_)));
//! assert_eq!(tokens[1].kind, TokenKind::Assign);
//! ```
//!
//! # Module Structure
//!
//! - [`cursor`](self) - column cursor over one line
//! - [`tokens`](self) - token recognition
//! - `tests` - unit tests (test-only)

mod cursor;
mod tokens;


use crate::token::{Span, Token, TokenKind};

/// A lexical analyzer for Pell source code.
///
/// The scanner is line-oriented: each source line gets its own column
/// cursor, so token spans are always column ranges within a single line.
pub struct Scanner<'a> {
    /// The source text being scanned.
    input: &'a str,
}

impl<'a> Scanner<'a> {
    /// Creates a new `Scanner` for the given source text.
    pub fn new(input: &'a str) -> Self {
        Scanner { input }
    }

    /// Scans the entire input and returns the token vector.
    ///
    /// The returned vector always ends with an [`TokenKind::Eof`] token
    /// whose line number is the last line of the input (1 for empty input).
    pub fn scan(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut last_line = 1;

        for (index, line) in self.input.lines().enumerate() {
            let lineno = index + 1;
            last_line = lineno;
            LineScanner::new(line, lineno).run(&mut tokens);
        }

        tokens.push(Token::new(TokenKind::Eof, Span::new(0, 0, last_line)));
        tokens
    }
}

/// Column cursor and token recognition state for a single source line.
pub(super) struct LineScanner {
    /// The characters of the line.
    pub(super) chars: Vec<char>,
    /// The current column.
    pub(super) pos: usize,
    /// The 1-indexed line number, stamped into every emitted span.
    pub(super) line: usize,
}

impl LineScanner {
    fn new(line: &str, lineno: usize) -> Self {
        LineScanner {
            chars: line.chars().collect(),
            pos: 0,
            line: lineno,
        }
    }

    /// Tokenizes the line, appending to `tokens`.
    fn run(&mut self, tokens: &mut Vec<Token>) {
        while let Some(c) = self.current() {
            if c == '/' && self.peek() == Some('/') {
                // Comment to end of line.
                return;
            }
            if c.is_whitespace() {
                self.advance();
                continue;
            }
            let token = self.next_token(c);
            tokens.push(token);
        }
    }
}
