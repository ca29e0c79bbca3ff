//! Token recognition for the scanner.
//!
//! This module provides the readers for each token shape: punctuation and
//! operators, identifiers and keywords, numbers, and string literals.

use super::LineScanner;
use crate::token::{Span, Token, TokenKind};

/// The characters permitted inside a string literal, besides letters and
/// digits.
const LEGAL_STRING_PUNCTUATION: &[char] = &[' ', '_', ',', ';', ':', '.', '\''];

fn legal_string_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || LEGAL_STRING_PUNCTUATION.contains(&c)
}

impl LineScanner {
    /// Creates a single-character token at the cursor and advances.
    fn single_char_token(&mut self, kind: TokenKind) -> Token {
        let span = Span::new(self.pos, self.pos, self.line);
        self.advance();
        Token::new(kind, span)
    }

    /// Creates a two-character token at the cursor and advances past both.
    fn two_char_token(&mut self, kind: TokenKind) -> Token {
        let span = Span::new(self.pos, self.pos + 1, self.line);
        self.advance();
        self.advance();
        Token::new(kind, span)
    }

    /// Creates an error token spanning `start..=end` and carrying `message`.
    fn error_token(&self, message: String, start: usize, end: usize) -> Token {
        Token::new(TokenKind::Error(message), Span::new(start, end, self.line))
    }

    /// Reads the next token at the cursor.
    ///
    /// The caller has already skipped whitespace and comments; `c` is the
    /// character at the cursor.
    pub(super) fn next_token(&mut self, c: char) -> Token {
        match c {
            ';' => self.single_char_token(TokenKind::Semicolon),
            ',' => self.single_char_token(TokenKind::Comma),
            '+' => self.single_char_token(TokenKind::Plus),
            '-' => self.single_char_token(TokenKind::Minus),
            '*' => self.single_char_token(TokenKind::Star),
            '/' => self.single_char_token(TokenKind::Slash),
            '(' => self.single_char_token(TokenKind::OpenParen),
            ')' => self.single_char_token(TokenKind::CloseParen),
            '[' => self.single_char_token(TokenKind::OpenBracket),
            ']' => self.single_char_token(TokenKind::CloseBracket),
            '{' => self.single_char_token(TokenKind::OpenBrace),
            '}' => self.single_char_token(TokenKind::CloseBrace),
            '<' => {
                if self.peek() == Some('=') {
                    self.two_char_token(TokenKind::Lte)
                } else {
                    self.single_char_token(TokenKind::Lt)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.two_char_token(TokenKind::Gte)
                } else {
                    self.single_char_token(TokenKind::Gt)
                }
            }
            ':' => {
                if self.peek() == Some('=') {
                    self.two_char_token(TokenKind::Assign)
                } else {
                    self.single_char_token(TokenKind::Colon)
                }
            }
            '=' => {
                if self.peek() == Some('=') {
                    self.two_char_token(TokenKind::Equal)
                } else {
                    let token =
                        self.error_token("Illegal character '=' encountered".to_string(), self.pos, self.pos);
                    self.advance();
                    token
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.two_char_token(TokenKind::NotEqual)
                } else {
                    // A bare '!' is never valid; the message names the
                    // character that followed it.
                    let culprit = self.peek().unwrap_or('!');
                    let token = self.error_token(
                        format!("Illegal character '{}' encountered", culprit),
                        self.pos,
                        self.pos,
                    );
                    self.advance();
                    token
                }
            }
            '"' => self.read_string(),
            _ if c.is_ascii_digit() => self.read_number(),
            _ if c.is_ascii_alphabetic() => self.read_identifier(),
            _ => {
                let token = self.error_token(
                    format!("Illegal character '{}' encountered", c),
                    self.pos,
                    self.pos,
                );
                self.advance();
                token
            }
        }
    }

    /// Reads an identifier or keyword.
    ///
    /// Identifiers start with an ASCII letter and continue with letters,
    /// digits, or underscores; a trailing underscore is part of the
    /// identifier. Reserved words map to their keyword kind.
    fn read_identifier(&mut self) -> Token {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let lexeme = self.slice(start, self.pos - 1);
        let span = Span::new(start, self.pos - 1, self.line);
        let kind = TokenKind::keyword(&lexeme).unwrap_or(TokenKind::Identifier(lexeme));
        Token::new(kind, span)
    }

    /// Reads a numeric literal.
    ///
    /// Numbers are `[digit][digit|_]*` with an optional `'.' [digit|_]*`
    /// fraction. Underscore separators are stripped from the emitted
    /// lexeme, so `1_000` scans to `1000`.
    fn read_number(&mut self) -> Token {
        let start = self.pos;
        while self.current().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance();
        }
        if self.current() == Some('.') {
            self.advance();
            while self.current().is_some_and(|c| c.is_ascii_digit() || c == '_') {
                self.advance();
            }
        }

        let lexeme: String = self
            .slice(start, self.pos - 1)
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let span = Span::new(start, self.pos - 1, self.line);
        Token::new(TokenKind::Number(lexeme), span)
    }

    /// Reads a string literal.
    ///
    /// The string runs from the opening quote to the next quote on the same
    /// line. The interior character set is restricted to letters, digits,
    /// and `  _,;:.'`; anything else makes the whole literal an error
    /// token. A missing closing quote consumes the rest of the line so
    /// scanning resumes cleanly on the next one.
    fn read_string(&mut self) -> Token {
        let start = self.pos;
        let close = self.chars[self.pos + 1..]
            .iter()
            .position(|&c| c == '"')
            .map(|offset| self.pos + 1 + offset);

        let Some(close) = close else {
            let end = self.chars.len().saturating_sub(1);
            self.consume_rest();
            return self.error_token("EOL while scanning string literal".to_string(), start, end);
        };

        let illegal: Vec<char> = self.chars[start + 1..close]
            .iter()
            .copied()
            .filter(|&c| !legal_string_char(c))
            .collect();

        let token = if illegal.is_empty() {
            let lexeme = self.slice(start, close);
            Token::new(
                TokenKind::Str(lexeme),
                Span::new(start, close, self.line),
            )
        } else {
            self.error_token(
                format!("Illegal characters {:?} found in string", illegal),
                start,
                close,
            )
        };
        self.pos = close + 1;
        token
    }
}
