//! The restartable, comment-filtering token cursor the parser drives.
//!
//! Wraps the raw token sequence produced by [`crate::lexer::tokenize`]
//! (which includes comments) and exposes the `get/unget/tell/seek/peek/eof`
//! API spec.md §4.1 calls for. Positions are indices into a pre-computed
//! list of non-comment token indices, so `tell()`/`seek()` are cheap integer
//! save/restore — exactly what the parser's backtracking needs.

use crate::token::{Token, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position(usize);

pub struct TokenCursor {
    raw: Vec<Token>,
    /// Indices into `raw` of every non-comment token, in order.
    significant: Vec<usize>,
    cursor: usize,
}

impl TokenCursor {
    pub fn new(raw: Vec<Token>) -> Self {
        let significant: Vec<usize> =
            raw.iter().enumerate().filter(|(_, t)| !t.is_comment()).map(|(i, _)| i).collect();
        Self { raw, significant, cursor: 0 }
    }

    /// The full raw sequence, comments included — for tooling that wants
    /// the unfiltered view (e.g. a future formatter).
    pub fn raw_tokens(&self) -> &[Token] {
        &self.raw
    }

    fn token_at(&self, cursor: usize) -> Token {
        match self.significant.get(cursor) {
            Some(&idx) => self.raw[idx],
            None => *self.raw.last().expect("tokenize always appends a trailing Eof token"),
        }
    }

    /// Next non-comment token, or `Eof` past the end.
    pub fn get(&mut self) -> Token {
        let token = self.token_at(self.cursor);
        if self.cursor < self.significant.len() {
            self.cursor += 1;
        }
        token
    }

    /// Rewinds by `n` non-comment tokens.
    pub fn unget(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    /// Reads without advancing.
    pub fn peek(&self) -> Token {
        self.token_at(self.cursor)
    }

    /// Reads `offset` tokens ahead without advancing (`offset == 0` is
    /// equivalent to [`Self::peek`]).
    pub fn peek_at(&self, offset: usize) -> Token {
        self.token_at(self.cursor + offset)
    }

    /// Opaque position, restorable via [`Self::seek`].
    pub fn tell(&self) -> Position {
        Position(self.cursor)
    }

    pub fn seek(&mut self, position: Position) {
        self.cursor = position.0;
    }

    pub fn eof(&self) -> bool {
        self.cursor >= self.significant.len()
    }

    pub fn eof_position(&self) -> Position {
        Position(self.significant.len())
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use vela_util::Handler;

    fn cursor(source: &str) -> TokenCursor {
        let handler = Handler::new();
        TokenCursor::new(tokenize(source, &handler))
    }

    #[test]
    fn get_unget_get_yields_same_token() {
        let mut c = cursor("a b c");
        let first = c.get();
        c.unget(1);
        let first_again = c.get();
        assert_eq!(first.text, first_again.text);
    }

    #[test]
    fn comments_are_invisible_to_get() {
        let mut c = cursor("a /* skip me */ b");
        let a = c.get();
        let b = c.get();
        assert_eq!(a.text.as_str(), "a");
        assert_eq!(b.text.as_str(), "b");
    }

    #[test]
    fn tell_seek_restores_position() {
        let mut c = cursor("a b c");
        let pos = c.tell();
        c.get();
        c.get();
        c.seek(pos);
        assert_eq!(c.get().text.as_str(), "a");
    }

    #[test]
    fn eof_true_past_last_token() {
        let mut c = cursor("a");
        assert!(!c.eof());
        c.get();
        assert!(c.eof());
        assert_eq!(c.peek().kind, TokenKind::Eof);
    }
}
