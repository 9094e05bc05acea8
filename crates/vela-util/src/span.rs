//! Source coordinates and spans.
//!
//! A [`Coord`] is the `(byte_offset, line, column)` triple the spec requires
//! every token and AST/semantic node to carry. A [`Span`] is a start/end pair
//! of coordinates; lexemes that span multiple lines still carry a single
//! start/end pair rather than a per-line breakdown.

use std::fmt;

/// A single point in the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    /// 0-based byte offset into the source slice.
    pub offset: u32,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (counted in bytes, matching the lexer's ASCII
    /// fast path).
    pub column: u32,
}

impl Coord {
    pub const START: Coord = Coord { offset: 0, line: 1, column: 1 };

    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self { offset, line, column }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.column)
    }
}

/// A range in the source text, from `start` (inclusive) to `end`
/// (exclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Coord,
    pub end: Coord,
}

impl Span {
    /// Dummy span for synthesized nodes that have no corresponding source
    /// text (e.g. a resolver-inserted cast has the span of the expression it
    /// wraps, but some internal bookkeeping nodes need a placeholder).
    pub const DUMMY: Span = Span { start: Coord::START, end: Coord::START };

    pub const fn new(start: Coord, end: Coord) -> Self {
        Self { start, end }
    }

    /// A zero-width span at a single point.
    pub const fn point(at: Coord) -> Self {
        Self { start: at, end: at }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span { start: self.start, end: other.end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}
