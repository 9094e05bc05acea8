//! Line and block comment scanning.
//!
//! Unlike the teacher's lexer, comments are not skipped silently: they are
//! tokenized as `TokenKind::Comment` and kept in the raw sequence, per
//! spec.md §3 ("Comments are retained in the raw sequence but filtered
//! from the parser view") — the filtering happens in [`crate::token_cursor`].

use vela_util::diagnostic::codes;

use super::Lexer;
use crate::token::TokenKind;

impl<'a> Lexer<'a> {
    pub(super) fn lex_line_comment(&mut self) -> super::Token {
        let start = self.cursor.position();
        self.cursor.advance_n(2); // "//"
        while !self.cursor.is_at_end() && self.cursor.current() != b'\n' {
            self.cursor.advance();
        }
        self.emit_at(TokenKind::Comment, start)
    }

    /// Closes on the first `*/`, matching spec.md's `COMMENT_MULTI_LINES`/
    /// `COMMENT_MULTI_LINES_END` states (no nesting concept) and the
    /// original source's non-nesting C-family semantics.
    pub(super) fn lex_block_comment(&mut self) -> super::Token {
        let start = self.cursor.position();
        self.cursor.advance_n(2); // "/*"
        let mut closed = false;

        while !self.cursor.is_at_end() {
            if self.cursor.current() == b'*' && self.cursor.peek(1) == b'/' {
                self.cursor.advance_n(2);
                closed = true;
                break;
            }
            self.cursor.advance();
        }

        if !closed {
            self.report_warning(codes::LEX_UNTERMINATED_COMMENT, "unterminated block comment");
        }

        self.emit_at(TokenKind::Comment, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use vela_util::Handler;

    fn lex_one(source: &str) -> super::super::Token {
        let handler = Handler::new();
        let mut lexer = Lexer::new(source, &handler);
        lexer.next_token()
    }

    #[test]
    fn line_comment_stops_at_newline() {
        let token = lex_one("// hello\nrest");
        assert_eq!(token.kind, TokenKind::Comment);
        assert_eq!(token.text.as_str(), "// hello");
    }

    #[test]
    fn block_comment_closes_at_first_close_marker() {
        let token = lex_one("/* outer /* inner */ still outer */");
        assert_eq!(token.kind, TokenKind::Comment);
        assert_eq!(token.text.as_str(), "/* outer /* inner */");
    }

    #[test]
    fn unterminated_block_comment_is_warning() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("/* never closes", &handler);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Comment);
        assert_eq!(handler.warning_count(), 1);
        assert!(!handler.has_errors());
    }
}
