//! Property tests for the Lexer properties of spec.md §8.

use proptest::prelude::*;

use crate::lexer::tokenize;
use crate::token::{NumberBase, Signedness, TokenKind};
use vela_util::Handler;

fn suffix_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(""),
        Just("u"),
        Just("s"),
        Just("l"),
        Just("ll"),
        Just("ul"),
        Just("us"),
    ]
}

proptest! {
    /// For all decimal integers with an optional recognized suffix, the
    /// single-token parse yields one `integer_literal` with base decimal
    /// and textual body equal to the digit run.
    #[test]
    fn decimal_integer_with_suffix_is_one_token(digits in "[1-9][0-9]{0,8}", suffix in suffix_strategy()) {
        let source = format!("{digits}{suffix}");
        let handler = Handler::new();
        let tokens = tokenize(&source, &handler);
        // tokens: [literal, Eof]
        prop_assert_eq!(tokens.len(), 2);
        match tokens[0].kind {
            TokenKind::IntegerLiteral { base, .. } => {
                prop_assert_eq!(base, NumberBase::Decimal);
            }
            other => prop_assert!(false, "expected integer literal, got {:?}", other),
        }
        prop_assert!(tokens[0].text.as_str().starts_with(digits.as_str()));
    }

    /// For all hex integers `0x(H+)` with the same suffix set, base is hex
    /// and the body is the hex digit run (with the `0x` prefix retained in
    /// the raw text).
    #[test]
    fn hex_integer_with_suffix_is_one_token(digits in "[0-9a-fA-F]{1,8}", suffix in suffix_strategy()) {
        let source = format!("0x{digits}{suffix}");
        let handler = Handler::new();
        let tokens = tokenize(&source, &handler);
        prop_assert_eq!(tokens.len(), 2);
        match tokens[0].kind {
            TokenKind::IntegerLiteral { base, signedness, .. } => {
                prop_assert_eq!(base, NumberBase::Hex);
                if suffix.contains('u') {
                    prop_assert_eq!(signedness, Signedness::Unsigned);
                } else {
                    prop_assert_eq!(signedness, Signedness::Signed);
                }
            }
            other => prop_assert!(false, "expected integer literal, got {:?}", other),
        }
    }

    /// Concatenating two recognized operators with no intervening
    /// whitespace always yields the longest-match token, never the two
    /// shorter tokens separately.
    #[test]
    fn shift_assign_is_one_token_not_three(_dummy in 0..1u8) {
        let handler = Handler::new();
        let tokens = tokenize(">>=", &handler);
        prop_assert_eq!(tokens.len(), 2); // [ShrAssign, Eof]
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn space_separated_operators_are_two_tokens() {
        let handler = Handler::new();
        let tokens = tokenize("> >=", &handler);
        // [Gt, GtEq, Eof]
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn unspaced_shr_assign_is_one_token() {
        let handler = Handler::new();
        let tokens = tokenize(">>=", &handler);
        assert_eq!(tokens.len(), 2);
    }
}
