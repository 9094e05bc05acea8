//! The Vela lexer, split across submodules by lexeme family, mirroring the
//! token families of spec.md §3: identifiers/keywords, numbers, strings and
//! chars, comments, operators/punctuators.

mod comment;
mod identifier;
mod number;
mod string;

use std::collections::VecDeque;

use vela_util::diagnostic::codes;
use vela_util::{Handler, Span, Symbol};

use crate::cursor::Cursor;
use crate::operators;
use crate::token::{Token, TokenKind};

/// Tokenizes `source` end to end, returning the raw sequence (comments
/// included, per spec.md §3: "Comments are retained in the raw sequence
/// but filtered from the parser view").
pub fn tokenize(source: &str, handler: &Handler) -> Vec<Token> {
    let mut lexer = Lexer::new(source, handler);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

pub(crate) struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) handler: &'a Handler,
    pub(crate) token_start: usize,
    pub(crate) token_start_line: u32,
    pub(crate) token_start_column: u32,
    pending: VecDeque<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
            pending: VecDeque::new(),
        }
    }

    pub(crate) fn start_span(&self) -> vela_util::Coord {
        vela_util::Coord::new(self.token_start as u32, self.token_start_line, self.token_start_column)
    }

    pub(crate) fn end_coord(&self) -> vela_util::Coord {
        vela_util::Coord::new(self.cursor.position() as u32, self.cursor.line(), self.cursor.column())
    }

    pub(crate) fn current_span(&self) -> Span {
        Span::new(self.start_span(), self.end_coord())
    }

    pub(crate) fn emit_at(&self, kind: TokenKind, start: usize) -> Token {
        let text = Symbol::intern(self.cursor.slice_from(start));
        Token::new(kind, text, self.current_span())
    }

    pub(crate) fn report_error(&self, code: u32, message: impl Into<String>) {
        self.handler.error(code, self.current_span(), message);
    }

    pub(crate) fn report_warning(&self, code: u32, message: impl Into<String>) {
        self.handler.warning(code, self.current_span(), message);
    }

    fn skip_plain_whitespace(&mut self) {
        loop {
            match self.cursor.current() {
                b' ' | b'\t' | b'\x0b' | b'\x0c' => self.cursor.advance(),
                b'\r' => self.cursor.advance(),
                b'\n' => self.cursor.advance(),
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Token {
        if let Some(token) = self.pending.pop_front() {
            return token;
        }

        self.skip_plain_whitespace();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return self.emit_at(TokenKind::Eof, self.token_start);
        }

        let b = self.cursor.current();
        match b {
            b'"' => self.lex_string(),
            b'\'' => self.lex_char(),
            b'/' if self.cursor.peek(1) == b'/' => self.lex_line_comment(),
            b'/' if self.cursor.peek(1) == b'*' => self.lex_block_comment(),
            b'0'..=b'9' => self.lex_number(),
            b'.' if self.cursor.peek(1).is_ascii_digit() => self.lex_number(),
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.lex_identifier(),
            _ if operators::is_punct_byte(b) => self.lex_punct_run(),
            other => {
                self.cursor.advance();
                self.report_error(
                    codes::LEX_UNEXPECTED_BYTE,
                    format!("unexpected byte 0x{:02x}", other),
                );
                self.emit_at(TokenKind::Eof, self.token_start)
            }
        }
    }

    fn lex_punct_run(&mut self) -> Token {
        let start = self.cursor.position();
        loop {
            let b = self.cursor.current();
            if !operators::is_punct_byte(b) {
                break;
            }
            if b == b'/' && (self.cursor.peek(1) == b'/' || self.cursor.peek(1) == b'*') {
                break;
            }
            self.cursor.advance();
        }

        let full_text = self.cursor.slice_from(start);
        let mut offset = 0usize;
        let mut first: Option<Token> = None;

        while offset < full_text.len() {
            let remaining = &full_text[offset..];
            let Some((matched, kind)) = operators::longest_match(remaining) else {
                // Every byte accepted by `is_punct_byte` also appears as a
                // single-character table entry, so this is unreachable.
                break;
            };
            let piece_start = start + offset;
            let piece_end = piece_start + matched.len();
            let span = Span::new(
                self.coord_at(piece_start),
                self.coord_at(piece_end),
            );
            let token = Token::new(kind, Symbol::intern(matched), span);
            if first.is_none() {
                first = Some(token);
            } else {
                self.pending.push_back(token);
            }
            offset += matched.len();
        }

        first.unwrap_or_else(|| self.emit_at(TokenKind::Eof, start))
    }

    /// Reconstructs line/column for a byte offset already scanned past by
    /// re-deriving from the token-start coordinate plus the raw text,
    /// since splitting a punctuation run never crosses a newline.
    fn coord_at(&self, offset: usize) -> vela_util::Coord {
        let delta = offset - self.token_start;
        vela_util::Coord::new(offset as u32, self.token_start_line, self.token_start_column + delta as u32)
    }
}
