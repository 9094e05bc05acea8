//! Operator/punctuator longest-match table.
//!
//! Built once, statically, at compile time (spec.md §9 design note: "the
//! table should be built once at process startup... rather than per-lex").
//! Entries are grouped by length, longest first, so [`longest_match`] always
//! finds `<<=` before `<<` before `<`.

use crate::token::{Operator, Punctuator, TokenKind};

type Entry = (&'static str, TokenKind);

/// True for any byte that can appear in a punctuation/operator run.
#[inline]
pub fn is_punct_byte(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')'
            | b'{'
            | b'}'
            | b'['
            | b']'
            | b','
            | b';'
            | b':'
            | b'?'
            | b'.'
            | b'+'
            | b'-'
            | b'*'
            | b'/'
            | b'%'
            | b'='
            | b'!'
            | b'<'
            | b'>'
            | b'&'
            | b'|'
            | b'^'
            | b'~'
    )
}

const LEN3: &[Entry] = &[
    ("<<=", TokenKind::Operator(Operator::ShlAssign)),
    (">>=", TokenKind::Operator(Operator::ShrAssign)),
    ("->*", TokenKind::Operator(Operator::ArrowStar)),
];

const LEN2: &[Entry] = &[
    ("+=", TokenKind::Operator(Operator::PlusAssign)),
    ("-=", TokenKind::Operator(Operator::MinusAssign)),
    ("*=", TokenKind::Operator(Operator::StarAssign)),
    ("/=", TokenKind::Operator(Operator::SlashAssign)),
    ("%=", TokenKind::Operator(Operator::PercentAssign)),
    ("&=", TokenKind::Operator(Operator::AmpAssign)),
    ("|=", TokenKind::Operator(Operator::PipeAssign)),
    ("^=", TokenKind::Operator(Operator::CaretAssign)),
    ("==", TokenKind::Operator(Operator::EqEq)),
    ("!=", TokenKind::Operator(Operator::NotEq)),
    ("<=", TokenKind::Operator(Operator::LtEq)),
    (">=", TokenKind::Operator(Operator::GtEq)),
    ("<<", TokenKind::Operator(Operator::Shl)),
    (">>", TokenKind::Operator(Operator::Shr)),
    ("&&", TokenKind::Operator(Operator::LogicalAnd)),
    ("||", TokenKind::Operator(Operator::LogicalOr)),
    ("++", TokenKind::Operator(Operator::PlusPlus)),
    ("--", TokenKind::Operator(Operator::MinusMinus)),
    ("->", TokenKind::Operator(Operator::Arrow)),
    (".*", TokenKind::Operator(Operator::DotStar)),
];

const LEN1: &[Entry] = &[
    ("(", TokenKind::Punctuator(Punctuator::LParen)),
    (")", TokenKind::Punctuator(Punctuator::RParen)),
    ("{", TokenKind::Punctuator(Punctuator::LBrace)),
    ("}", TokenKind::Punctuator(Punctuator::RBrace)),
    ("[", TokenKind::Punctuator(Punctuator::LBracket)),
    ("]", TokenKind::Punctuator(Punctuator::RBracket)),
    (",", TokenKind::Punctuator(Punctuator::Comma)),
    (";", TokenKind::Punctuator(Punctuator::Semicolon)),
    (":", TokenKind::Punctuator(Punctuator::Colon)),
    ("?", TokenKind::Operator(Operator::Question)),
    (".", TokenKind::Operator(Operator::Dot)),
    ("+", TokenKind::Operator(Operator::Plus)),
    ("-", TokenKind::Operator(Operator::Minus)),
    ("*", TokenKind::Operator(Operator::Star)),
    ("/", TokenKind::Operator(Operator::Slash)),
    ("%", TokenKind::Operator(Operator::Percent)),
    ("=", TokenKind::Operator(Operator::Assign)),
    ("!", TokenKind::Operator(Operator::Not)),
    ("<", TokenKind::Operator(Operator::Lt)),
    (">", TokenKind::Operator(Operator::Gt)),
    ("&", TokenKind::Operator(Operator::Amp)),
    ("|", TokenKind::Operator(Operator::Pipe)),
    ("^", TokenKind::Operator(Operator::Caret)),
    ("~", TokenKind::Operator(Operator::Tilde)),
];

/// Finds the longest table entry that is a prefix of `text`, trying 3-byte,
/// then 2-byte, then 1-byte entries in that order.
pub fn longest_match(text: &str) -> Option<(&'static str, TokenKind)> {
    for &(candidate, kind) in LEN3 {
        if text.starts_with(candidate) {
            return Some((candidate, kind));
        }
    }
    for &(candidate, kind) in LEN2 {
        if text.starts_with(candidate) {
            return Some((candidate, kind));
        }
    }
    for &(candidate, kind) in LEN1 {
        if text.starts_with(candidate) {
            return Some((candidate, kind));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_descending_length() {
        assert!(LEN3.iter().all(|(s, _)| s.len() == 3));
        assert!(LEN2.iter().all(|(s, _)| s.len() == 2));
        assert!(LEN1.iter().all(|(s, _)| s.len() == 1));
    }

    #[test]
    fn shr_assign_beats_shr_beats_gt() {
        assert_eq!(longest_match(">>=").unwrap().0, ">>=");
        assert_eq!(longest_match(">>").unwrap().0, ">>");
        assert_eq!(longest_match(">").unwrap().0, ">");
    }

    #[test]
    fn split_by_whitespace_yields_two_tokens_worth_of_prefixes() {
        // "> >=" tokenizes (after whitespace skipping) to `>` then `>=`.
        assert_eq!(longest_match(">").unwrap().0, ">");
        assert_eq!(longest_match(">=").unwrap().0, ">=");
    }
}
