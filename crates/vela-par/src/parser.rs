//! The parser's shared cursor-driving machinery: token access, expectation
//! helpers, and the `tell`/`seek` backtracking the grammar's ambiguous
//! productions need (cast-vs-parenthesis, declaration dispatch).

use vela_lex::token::{Keyword, Operator, Punctuator, PrimitiveKeyword, TokenKind};
use vela_lex::token_cursor::{Position, TokenCursor};
use vela_lex::Token;
use vela_util::diagnostic::codes;
use vela_util::Handler;

use crate::error::{ParsingError, Result};

pub struct Parser<'a> {
    pub(crate) cursor: TokenCursor,
    pub(crate) handler: &'a Handler,
}

impl<'a> Parser<'a> {
    pub fn new(cursor: TokenCursor, handler: &'a Handler) -> Self {
        Self { cursor, handler }
    }

    pub(crate) fn peek(&self) -> Token {
        self.cursor.peek()
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Token {
        self.cursor.peek_at(offset)
    }

    pub(crate) fn bump(&mut self) -> Token {
        self.cursor.get()
    }

    pub(crate) fn tell(&self) -> Position {
        self.cursor.tell()
    }

    pub(crate) fn seek(&mut self, pos: Position) {
        self.cursor.seek(pos)
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.cursor.eof()
    }

    fn describe(kind: TokenKind) -> String {
        format!("{:?}", kind)
    }

    /// Consumes the current token if its kind matches `kind` exactly
    /// (ignoring payload), returning whether it matched.
    pub(crate) fn eat_punct(&mut self, p: Punctuator) -> bool {
        if self.peek().kind == TokenKind::Punctuator(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_op(&mut self, op: Operator) -> bool {
        if self.peek().kind == TokenKind::Operator(op) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.peek().kind == TokenKind::Keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn at_punct(&self, p: Punctuator) -> bool {
        self.peek().kind == TokenKind::Punctuator(p)
    }

    pub(crate) fn at_op(&self, op: Operator) -> bool {
        self.peek().kind == TokenKind::Operator(op)
    }

    pub(crate) fn at_keyword(&self, kw: Keyword) -> bool {
        self.peek().kind == TokenKind::Keyword(kw)
    }

    pub(crate) fn at_primitive_keyword(&self) -> Option<PrimitiveKeyword> {
        match self.peek().kind {
            TokenKind::PrimitiveKeyword(k) => Some(k),
            _ => None,
        }
    }

    pub(crate) fn at_identifier(&self) -> bool {
        self.peek().kind == TokenKind::Identifier
    }

    pub(crate) fn expect_punct(&mut self, p: Punctuator) -> Result<Token> {
        if self.peek().kind == TokenKind::Punctuator(p) {
            Ok(self.bump())
        } else {
            Err(self.expected(Self::describe(TokenKind::Punctuator(p))))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<Token> {
        if self.at_identifier() {
            Ok(self.bump())
        } else {
            Err(self.expected("identifier".to_string()))
        }
    }

    pub(crate) fn expected(&self, expected: impl Into<String>) -> ParsingError {
        let found = self.peek();
        let expected = expected.into();
        let err = if found.is_eof() {
            ParsingError::UnexpectedEof { span: found.span }
        } else {
            ParsingError::ExpectedToken {
                span: found.span,
                expected: expected.clone(),
                found: format!("{:?} ({})", found.kind, found.text.as_str()),
            }
        };
        self.handler.error(
            codes::PARSE_EXPECTED_TOKEN,
            found.span,
            format!("expected {}, found '{}'", expected, found.text.as_str()),
        );
        err
    }

    pub(crate) fn unexpected(&self, token: Token) -> ParsingError {
        self.handler.error(
            codes::PARSE_UNEXPECTED_TOKEN,
            token.span,
            format!("unexpected token '{}'", token.text.as_str()),
        );
        ParsingError::UnexpectedToken {
            span: token.span,
            found: format!("{:?} ({})", token.kind, token.text.as_str()),
        }
    }
}
