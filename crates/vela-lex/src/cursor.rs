//! Byte cursor for traversing source text.
//!
//! Operates on ASCII: identifiers, keywords, operators, and punctuation are
//! ASCII-only per spec, so byte-indexed stepping is sufficient and avoids
//! repeated UTF-8 decoding on the hot path. Bytes above 0x7F are only ever
//! consumed verbatim inside string/char literal bodies, where they pass
//! through untouched rather than being decoded.

pub struct Cursor<'a> {
    source: &'a [u8],
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source: source.as_bytes(), position: 0, line: 1, column: 1 }
    }

    #[inline]
    pub fn current(&self) -> u8 {
        self.byte_at(0)
    }

    #[inline]
    pub fn byte_at(&self, offset: usize) -> u8 {
        let pos = self.position + offset;
        if pos >= self.source.len() {
            0
        } else {
            self.source[pos]
        }
    }

    #[inline]
    pub fn peek(&self, offset: usize) -> u8 {
        self.byte_at(offset)
    }

    #[inline]
    pub fn advance(&mut self) {
        if self.position >= self.source.len() {
            return;
        }
        let b = self.source[self.position];
        self.position += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    pub fn advance_n(&mut self, count: usize) {
        for _ in 0..count {
            if self.is_at_end() {
                break;
            }
            self.advance();
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    pub fn match_byte(&mut self, expected: u8) -> bool {
        if self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn slice_from(&self, start: usize) -> &'a str {
        std::str::from_utf8(&self.source[start..self.position])
            .expect("slice_from only ever spans already-validated UTF-8 boundaries")
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    pub fn source_str(&self) -> &'a str {
        std::str::from_utf8(self.source).expect("source was constructed from a &str")
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot { position: self.position, line: self.line, column: self.column }
    }

    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.position = snapshot.position;
        self.line = snapshot.line;
        self.column = snapshot.column;
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CursorSnapshot {
    pub position: usize,
    pub line: u32,
    pub column: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_line_and_column() {
        let mut cursor = Cursor::new("ab\ncd");
        assert_eq!(cursor.current(), b'a');
        cursor.advance();
        assert_eq!(cursor.current(), b'b');
        cursor.advance();
        assert_eq!(cursor.line(), 1);
        cursor.advance();
        assert_eq!(cursor.line(), 2);
        assert_eq!(cursor.column(), 1);
    }

    #[test]
    fn snapshot_restore_round_trips() {
        let mut cursor = Cursor::new("abcdef");
        let snap = cursor.snapshot();
        cursor.advance_n(4);
        cursor.restore(snap);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.current(), b'a');
    }

    #[test]
    fn peek_past_end_is_zero() {
        let cursor = Cursor::new("a");
        assert_eq!(cursor.peek(5), 0);
    }
}
