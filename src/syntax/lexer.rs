//! Tokenizer for C#-like declaration sources.
//!
//! Comments, whitespace and preprocessor lines are dropped; their text is
//! still recoverable from token spans.

use super::types::{line_column, Span};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    String,
    Char,
    /// Single punctuation character, or one of `=>`, `::`, `??`.
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    pub span: Span,
}

impl Token<'_> {
    pub fn is(&self, text: &str) -> bool {
        self.text == text && self.kind != TokenKind::String && self.kind != TokenKind::Char
    }

    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Ident
    }
}

/// Split `source` into tokens.
pub fn tokenize<'s>(path: &str, source: &'s str) -> Result<Vec<Token<'s>>> {
    Lexer {
        path,
        source,
        bytes: source.as_bytes(),
        pos: 0,
        line_start: true,
    }
    .run()
}

struct Lexer<'p, 's> {
    path: &'p str,
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    line_start: bool,
}

impl<'s> Lexer<'_, 's> {
    fn run(mut self) -> Result<Vec<Token<'s>>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek(0) {
            if c == b'\n' {
                self.line_start = true;
                self.pos += 1;
                continue;
            }
            if c.is_ascii_whitespace() {
                self.pos += 1;
                continue;
            }
            if c == b'#' && self.line_start {
                self.skip_line();
                continue;
            }
            self.line_start = false;

            if c == b'/' && self.peek(1) == Some(b'/') {
                self.skip_line();
                continue;
            }
            if c == b'/' && self.peek(1) == Some(b'*') {
                self.skip_block_comment()?;
                continue;
            }

            let start = self.pos;
            let kind = match c {
                b'"' => self.string(false)?,
                b'@' if self.peek(1) == Some(b'"') => {
                    self.pos += 1;
                    self.string(true)?
                }
                b'$' | b'@' if matches!(self.peek(1), Some(b'"' | b'@' | b'$')) => {
                    self.interpolated()?
                }
                b'\'' => self.char_literal()?,
                b'0'..=b'9' => self.number(),
                c if c == b'@' || c == b'_' || c.is_ascii_alphabetic() || c >= 0x80 => {
                    self.ident()
                }
                _ => self.punct(),
            };
            tokens.push(Token {
                kind,
                text: &self.source[start..self.pos],
                span: Span::new(start, self.pos),
            });
        }
        Ok(tokens)
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn error(&self, offset: usize, message: &str) -> Error {
        let (line, column) = line_column(self.source, offset);
        Error::parse(self.path, line, column, message)
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        loop {
            match self.peek(0) {
                Some(b'*') if self.peek(1) == Some(b'/') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error(start, "unterminated block comment")),
            }
        }
    }

    fn string(&mut self, verbatim: bool) -> Result<TokenKind> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                Some(b'\\') if !verbatim => self.pos += 2,
                Some(b'"') if verbatim && self.peek(1) == Some(b'"') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(TokenKind::String);
                }
                Some(b'\n') if !verbatim => {
                    return Err(self.error(start, "newline in string literal"))
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error(start, "unterminated string literal")),
            }
        }
    }

    /// `$"..."`, `$@"..."`, `@$"..."`. Holes are skipped by brace depth so
    /// quotes inside `{...}` do not end the literal.
    fn interpolated(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        let mut verbatim = false;
        while let Some(c @ (b'$' | b'@')) = self.peek(0) {
            verbatim |= c == b'@';
            self.pos += 1;
        }
        if self.peek(0) != Some(b'"') {
            return Err(self.error(start, "malformed interpolated string"));
        }
        self.pos += 1;
        let mut depth = 0usize;
        loop {
            match self.peek(0) {
                Some(b'{') if self.peek(1) == Some(b'{') && depth == 0 => self.pos += 2,
                Some(b'}') if self.peek(1) == Some(b'}') && depth == 0 => self.pos += 2,
                Some(b'{') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b'}') => {
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                Some(b'"') if depth > 0 => {
                    self.string(false)?;
                }
                Some(b'\\') if !verbatim => self.pos += 2,
                Some(b'"') if verbatim && self.peek(1) == Some(b'"') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(TokenKind::String);
                }
                Some(_) => self.pos += 1,
                None => return Err(self.error(start, "unterminated interpolated string")),
            }
        }
    }

    fn char_literal(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                Some(b'\\') => self.pos += 2,
                Some(b'\'') => {
                    self.pos += 1;
                    return Ok(TokenKind::Char);
                }
                Some(b'\n') | None => return Err(self.error(start, "unterminated character literal")),
                Some(_) => self.pos += 1,
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' && self.next_is_digit() {
                self.pos += 1;
            } else {
                break;
            }
        }
        TokenKind::Number
    }

    fn next_is_digit(&self) -> bool {
        self.peek(1).is_some_and(|c| c.is_ascii_digit())
    }

    fn ident(&mut self) -> TokenKind {
        if self.peek(0) == Some(b'@') {
            self.pos += 1;
        }
        while let Some(c) = self.peek(0) {
            if c == b'_' || c.is_ascii_alphanumeric() || c >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        TokenKind::Ident
    }

    fn punct(&mut self) -> TokenKind {
        let pair = (self.peek(0), self.peek(1));
        self.pos += match pair {
            (Some(b'='), Some(b'>')) | (Some(b':'), Some(b':')) | (Some(b'?'), Some(b'?')) => 2,
            _ => {
                // Keep multi-byte characters whole.
                let rest = &self.source[self.pos..];
                rest.chars().next().map_or(1, char::len_utf8)
            }
        };
        TokenKind::Punct
    }
}
