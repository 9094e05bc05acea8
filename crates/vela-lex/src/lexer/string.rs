//! Char and string literal scanning, including the `ESCAPE{,_OCTAL,_HEXA,
//! _UNIVERSAL,_UNIVERSAL_LONG}` escape-sequence states of spec.md §4.1.

use vela_util::diagnostic::codes;

use super::Lexer;
use crate::token::TokenKind;

impl<'a> Lexer<'a> {
    pub(super) fn lex_string(&mut self) -> super::Token {
        let start = self.cursor.position();
        self.cursor.advance(); // opening '"'

        loop {
            if self.cursor.is_at_end() {
                self.report_warning(codes::LEX_UNTERMINATED_STRING, "unterminated string literal");
                break;
            }
            match self.cursor.current() {
                b'"' => {
                    self.cursor.advance();
                    break;
                }
                b'\\' => {
                    self.cursor.advance();
                    self.scan_escape();
                }
                _ => self.cursor.advance(),
            }
        }

        self.emit_at(TokenKind::StringLiteral, start)
    }

    pub(super) fn lex_char(&mut self) -> super::Token {
        let start = self.cursor.position();
        self.cursor.advance(); // opening '\''

        if self.cursor.is_at_end() {
            self.report_warning(codes::LEX_UNTERMINATED_STRING, "unterminated character literal");
            return self.emit_at(TokenKind::CharLiteral, start);
        }

        if self.cursor.current() == b'\\' {
            self.cursor.advance();
            self.scan_escape();
        } else {
            self.cursor.advance();
        }

        if self.cursor.current() == b'\'' {
            self.cursor.advance();
        } else {
            self.report_warning(codes::LEX_UNTERMINATED_STRING, "unterminated character literal");
            while !self.cursor.is_at_end() && self.cursor.current() != b'\'' && self.cursor.current() != b'\n' {
                self.cursor.advance();
            }
            if self.cursor.current() == b'\'' {
                self.cursor.advance();
            }
        }

        self.emit_at(TokenKind::CharLiteral, start)
    }

    /// Scans one escape body (the cursor is already past the backslash).
    /// Accepts `\\`, `\'`, `\"`, `\?`, `\b\f\n\r\t\v`, octal `\ooo` (3
    /// digits), hex `\xHH`, universal `\uHHHH`, long universal `\UHHHHHHHH`.
    fn scan_escape(&mut self) {
        if self.cursor.is_at_end() {
            self.report_warning(codes::LEX_MALFORMED_ESCAPE, "unterminated escape sequence");
            return;
        }

        let c = self.cursor.current();
        self.cursor.advance();

        match c {
            b'\\' | b'\'' | b'"' | b'?' | b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' => {}
            b'0'..=b'7' => {
                let mut count = 1;
                while count < 3 && matches!(self.cursor.current(), b'0'..=b'7') {
                    self.cursor.advance();
                    count += 1;
                }
            }
            b'x' => {
                let mut count = 0;
                while self.cursor.current().is_ascii_hexdigit() {
                    self.cursor.advance();
                    count += 1;
                }
                if count == 0 {
                    self.report_warning(codes::LEX_MALFORMED_ESCAPE, "hex escape with no digits");
                }
            }
            b'u' => self.scan_fixed_hex_escape(4),
            b'U' => self.scan_fixed_hex_escape(8),
            other => {
                self.report_warning(
                    codes::LEX_MALFORMED_ESCAPE,
                    format!("unrecognized escape sequence '\\{}'", other as char),
                );
            }
        }
    }

    fn scan_fixed_hex_escape(&mut self, digits: usize) {
        let mut count = 0;
        while count < digits && self.cursor.current().is_ascii_hexdigit() {
            self.cursor.advance();
            count += 1;
        }
        if count < digits {
            self.report_warning(
                codes::LEX_MALFORMED_ESCAPE,
                format!("universal character escape expected {} hex digits, found {}", digits, count),
            );
        }
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
    fn simple_string_literal() {
        let token = lex_one("\"hello\"");
        assert_eq!(token.kind, TokenKind::StringLiteral);
        assert_eq!(token.text.as_str(), "\"hello\"");
    }

    #[test]
    fn string_with_named_and_hex_escapes() {
        let token = lex_one("\"a\\nb\\x41\"");
        assert_eq!(token.kind, TokenKind::StringLiteral);
    }

    #[test]
    fn string_with_universal_escape() {
        let token = lex_one("\"\\u00e9\"");
        assert_eq!(token.kind, TokenKind::StringLiteral);
    }

    #[test]
    fn char_literal_with_escape() {
        let token = lex_one("'\\n'");
        assert_eq!(token.kind, TokenKind::CharLiteral);
    }

    #[test]
    fn unterminated_string_reports_warning_not_error() {
        let handler = Handler::new();
        let mut lexer = Lexer::new("\"abc", &handler);
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::StringLiteral);
        assert!(!handler.has_errors());
        assert_eq!(handler.warning_count(), 1);
    }
}
