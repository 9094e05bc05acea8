//! Decodes a literal token's textual body into a concrete value, the point
//! of use spec.md §4.1 defers decoding to ("The decoded numeric value is
//! computed on demand from the textual body"). Grounded in `vela-lex`'s
//! number/string scanners: an integer's text still carries its base prefix
//! and width/signedness suffix, a string/char's text still carries its
//! surrounding quotes and raw escape sequences.

use vela_lex::token::NumberBase;

/// Strips an integer literal's base prefix, then scans forward through the
/// digit run exactly as `vela_lex::lexer::number::lex_number` does (greedy,
/// by the base's own digit predicate), so a width/signedness suffix that
/// happens to share letters with hex digits (`0xab` - `b` is a digit, not a
/// "bigint" suffix) is never mistaken for part of the value.
fn scan_digit_run(text: &str, base: NumberBase) -> &str {
    let is_digit = |c: char| match base {
        NumberBase::Binary => matches!(c, '0' | '1'),
        NumberBase::Octal => matches!(c, '0'..='7'),
        NumberBase::Hex => c.is_ascii_hexdigit(),
        NumberBase::Decimal => c.is_ascii_digit(),
    };
    let end = text.find(|c: char| c != '_' && !is_digit(c)).unwrap_or(text.len());
    &text[..end]
}

pub fn decode_int(text: &str, base: NumberBase) -> u64 {
    let without_prefix = match base {
        NumberBase::Hex => text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(text),
        NumberBase::Binary => text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")).unwrap_or(text),
        NumberBase::Octal => text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")).unwrap_or(
            if text.len() > 1 { &text[1..] } else { text },
        ),
        NumberBase::Decimal => text,
    };
    let digits = scan_digit_run(without_prefix, base).replace('_', "");
    let radix = match base {
        NumberBase::Binary => 2,
        NumberBase::Octal => 8,
        NumberBase::Decimal => 10,
        NumberBase::Hex => 16,
    };
    if digits.is_empty() { 0 } else { u64::from_str_radix(&digits, radix).unwrap_or(0) }
}

pub fn decode_float(text: &str) -> f64 {
    let body = text.trim_end_matches(|c: char| matches!(c, 'f' | 'F' | 'd' | 'D'));
    body.parse::<f64>().unwrap_or(0.0)
}

pub fn decode_bool(text: &str) -> bool {
    text == "true"
}

/// Resolves one `\`-escape body (cursor positioned just past the
/// backslash) to its decoded byte, mirroring `vela_lex::lexer::string`'s
/// accepted escape set.
fn decode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> char {
    match chars.next() {
        Some('n') => '\n',
        Some('r') => '\r',
        Some('t') => '\t',
        Some('0') => '\0',
        Some('a') => '\u{7}',
        Some('b') => '\u{8}',
        Some('f') => '\u{c}',
        Some('v') => '\u{b}',
        Some('x') => {
            let mut hex = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_hexdigit() {
                    hex.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32).unwrap_or('\0')
        }
        Some(other) => other,
        None => '\0',
    }
}

fn decode_escaped_body(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(decode_escape(&mut chars));
        } else {
            out.push(c);
        }
    }
    out
}

/// Decodes a char literal's single character, after its escape (if any).
pub fn decode_char(text: &str) -> char {
    let body = text.trim_start_matches('\'').trim_end_matches('\'');
    decode_escaped_body(body).chars().next().unwrap_or('\0')
}

/// Decodes a string literal's body, after escapes, to the bytes the
/// runtime constant should hold (NUL-terminated, matching the C-family
/// string representation the language's literal grammar descends from).
pub fn decode_string(text: &str) -> Vec<u8> {
    let body = text.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(text);
    let mut bytes = decode_escaped_body(body).into_bytes();
    bytes.push(0);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_decimal_with_suffix() {
        assert_eq!(decode_int("42ul", NumberBase::Decimal), 42);
    }

    #[test]
    fn decodes_hex_with_underscore() {
        assert_eq!(decode_int("0xFF_AA", NumberBase::Hex), 0xFF_AA);
    }

    #[test]
    fn decodes_float_with_exponent_and_suffix() {
        assert!((decode_float("2.5e-3d") - 2.5e-3).abs() < 1e-12);
    }

    #[test]
    fn decodes_simple_string() {
        assert_eq!(decode_string("\"hi\""), b"hi\0".to_vec());
    }

    #[test]
    fn decodes_named_escape() {
        assert_eq!(decode_string("\"a\\nb\""), b"a\nb\0".to_vec());
    }

    #[test]
    fn decodes_char_escape() {
        assert_eq!(decode_char("'\\n'"), '\n');
    }
}
