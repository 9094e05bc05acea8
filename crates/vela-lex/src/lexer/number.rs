//! Numeric literal scanning: the `ZERO`/`DECIMAL`/`BIN_PREFIX`/`BINARY`/
//! `OCTAL_PREFIX`/`OCTAL`/`HEXA_PREFIX`/`HEXADECIMAL` and `INT_*_SUFFIX`
//! states of spec.md §4.1, collapsed into a handful of straight-line scans
//! since each base's digit scan is driven by a single predicate.

use vela_util::diagnostic::codes;

use super::Lexer;
use crate::token::{FloatWidth, IntWidth, NumberBase, Signedness, TokenKind};

fn is_digit(b: u8, base: u32) -> bool {
    match base {
        2 => matches!(b, b'0' | b'1'),
        8 => matches!(b, b'0'..=b'7'),
        16 => b.is_ascii_hexdigit(),
        _ => b.is_ascii_digit(),
    }
}

impl<'a> Lexer<'a> {
    pub(super) fn lex_number(&mut self) -> super::Token {
        let start = self.cursor.position();

        let base = if self.cursor.current() == b'0' {
            match self.cursor.peek(1) {
                b'x' | b'X' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    Some(NumberBase::Hex)
                }
                b'b' | b'B' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    Some(NumberBase::Binary)
                }
                b'o' | b'O' => {
                    self.cursor.advance();
                    self.cursor.advance();
                    Some(NumberBase::Octal)
                }
                b'0'..=b'9' => {
                    self.cursor.advance();
                    Some(NumberBase::Octal)
                }
                _ => None,
            }
        } else {
            None
        };

        let base = base.unwrap_or(NumberBase::Decimal);
        let digit_base = match base {
            NumberBase::Binary => 2,
            NumberBase::Octal => 8,
            NumberBase::Hex => 16,
            NumberBase::Decimal => 10,
        };

        let digits_start = self.cursor.position();
        self.scan_digit_run(digit_base);

        if digits_start == self.cursor.position() && base != NumberBase::Decimal {
            self.report_error(codes::LEX_EMPTY_HEX_LITERAL, "no digits after numeric base prefix");
        }

        // Only a decimal run can continue into a float literal: `0x1.8` is
        // not a float in this language, matching the grammar's single
        // `float_literal` production (decimal mantissa only).
        if base == NumberBase::Decimal {
            let mut is_float = false;
            if self.cursor.current() == b'.' && self.cursor.peek(1).is_ascii_digit() {
                is_float = true;
                self.cursor.advance();
                self.scan_digit_run(10);
            }
            if matches!(self.cursor.current(), b'e' | b'E') {
                is_float = true;
                self.cursor.advance();
                if matches!(self.cursor.current(), b'+' | b'-') {
                    self.cursor.advance();
                }
                let exp_digits_start = self.cursor.position();
                self.scan_digit_run(10);
                if exp_digits_start == self.cursor.position() {
                    self.report_error(codes::LEX_MALFORMED_ESCAPE, "no digits in float exponent");
                }
            }
            if is_float {
                let width = match self.cursor.current() {
                    b'f' | b'F' => {
                        self.cursor.advance();
                        FloatWidth::Float
                    }
                    b'd' | b'D' => {
                        self.cursor.advance();
                        FloatWidth::Double
                    }
                    _ => FloatWidth::Float,
                };
                return self.emit_at(TokenKind::FloatLiteral { width }, start);
            }
        }

        let (width, signedness) = self.scan_int_suffix();
        self.emit_at(TokenKind::IntegerLiteral { base, width, signedness }, start)
    }

    fn scan_digit_run(&mut self, base: u32) {
        loop {
            let b = self.cursor.current();
            if b == b'_' || is_digit(b, base) {
                self.cursor.advance();
            } else {
                break;
            }
        }
    }

    /// Scans `u`, `s`, `l`, `ll`, `l64`, `l128`, `b` suffixes in any order,
    /// per spec.md §4.1.
    fn scan_int_suffix(&mut self) -> (IntWidth, Signedness) {
        let mut signedness = Signedness::Signed;
        let mut width = IntWidth::Default;

        loop {
            match self.cursor.current() {
                b'u' | b'U' => {
                    self.cursor.advance();
                    signedness = Signedness::Unsigned;
                }
                b's' | b'S' => {
                    self.cursor.advance();
                    width = IntWidth::Short;
                }
                b'l' | b'L' => {
                    self.cursor.advance();
                    if matches!(self.cursor.current(), b'l' | b'L') {
                        self.cursor.advance();
                        width = IntWidth::LongLong;
                    } else if self.cursor.current() == b'6' && self.cursor.peek(1) == b'4' {
                        self.cursor.advance_n(2);
                        width = IntWidth::W64;
                    } else if self.cursor.current() == b'1'
                        && self.cursor.peek(1) == b'2'
                        && self.cursor.peek(2) == b'8'
                    {
                        self.cursor.advance_n(3);
                        width = IntWidth::W128;
                    } else {
                        width = IntWidth::Long;
                    }
                }
                // `b` ("bigint") has no corresponding primitive type in this
                // language (no arbitrary-precision integers); accepted
                // lexically and folded into the widest fixed width.
                b'b' | b'B' => {
                    self.cursor.advance();
                    width = IntWidth::W128;
                }
                _ => break,
            }
        }

        (width, signedness)
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
    fn decimal_integer_with_suffixes() {
        for (text, width, signed) in [
            ("42", IntWidth::Default, Signedness::Signed),
            ("42u", IntWidth::Default, Signedness::Unsigned),
            ("42l", IntWidth::Long, Signedness::Signed),
            ("42ll", IntWidth::LongLong, Signedness::Signed),
            ("42ul", IntWidth::Long, Signedness::Unsigned),
        ] {
            let token = lex_one(text);
            match token.kind {
                TokenKind::IntegerLiteral { base, width: w, signedness: s } => {
                    assert_eq!(base, NumberBase::Decimal, "{text}");
                    assert_eq!(w, width, "{text}");
                    assert_eq!(s, signed, "{text}");
                }
                other => panic!("expected integer literal for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn hex_integer_base_and_body() {
        let token = lex_one("0xFF_AA");
        assert!(matches!(
            token.kind,
            TokenKind::IntegerLiteral { base: NumberBase::Hex, .. }
        ));
        assert_eq!(token.text.as_str(), "0xFF_AA");
    }

    #[test]
    fn legacy_leading_zero_is_octal() {
        let token = lex_one("0755");
        assert!(matches!(
            token.kind,
            TokenKind::IntegerLiteral { base: NumberBase::Octal, .. }
        ));
    }

    #[test]
    fn float_literal_with_exponent_and_suffix() {
        let token = lex_one("2.5e-3d");
        assert!(matches!(
            token.kind,
            TokenKind::FloatLiteral { width: FloatWidth::Double }
        ));
    }

    #[test]
    fn bare_zero_is_decimal() {
        let token = lex_one("0");
        assert!(matches!(
            token.kind,
            TokenKind::IntegerLiteral { base: NumberBase::Decimal, .. }
        ));
    }
}
