//! Structured diagnostics.
//!
//! Every stage reports through the same [`Handler`]: a severity, a 32-bit
//! code whose high 16 bits identify the owning stage, a span, and a
//! message built from a `{}`-templated string plus formatted arguments (the
//! sink that turns these into user-visible text lives outside this crate,
//! per spec §6 — the core only produces structured entries).

use crate::span::Span;
use std::cell::RefCell;
use std::fmt;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warning => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Per-stage 16-bit code prefixes, per spec §6.
pub mod codes {
    pub const LEXER: u32 = 0x0_0000;
    pub const PARSER: u32 = 0x1_0000;
    pub const LOWERING: u32 = 0x2_0000;
    pub const RESOLVER: u32 = 0x3_0000;
    pub const GENERATOR: u32 = 0x4_0000;

    pub const LEX_UNEXPECTED_BYTE: u32 = LEXER | 1;
    pub const LEX_UNTERMINATED_STRING: u32 = LEXER | 2;
    pub const LEX_UNTERMINATED_COMMENT: u32 = LEXER | 3;
    pub const LEX_MALFORMED_ESCAPE: u32 = LEXER | 4;
    pub const LEX_EMPTY_HEX_LITERAL: u32 = LEXER | 5;

    pub const PARSE_EXPECTED_TOKEN: u32 = PARSER | 1;
    pub const PARSE_UNEXPECTED_TOKEN: u32 = PARSER | 2;
    pub const PARSE_UNEXPECTED_EOF: u32 = PARSER | 3;

    pub const LOWER_VARIABLE_NOT_ALLOWED_HERE: u32 = LOWERING | 1;

    pub const RESOLVE_UNRESOLVED_SYMBOL: u32 = RESOLVER | 1;
    pub const RESOLVE_TYPE_MISMATCH: u32 = RESOLVER | 2;
    pub const RESOLVE_FORBIDDEN_OPERATOR: u32 = RESOLVER | 3;
    pub const RESOLVE_ARITY_MISMATCH: u32 = RESOLVER | 4;
    pub const RESOLVE_NOT_ADDRESSABLE: u32 = RESOLVER | 5;
    pub const RESOLVE_VARIABLE_REDECLARED: u32 = RESOLVER | 6;
    pub const RESOLVE_NO_ADMISSIBLE_CAST: u32 = RESOLVER | 7;

    pub const GEN_MISSING_FUNCTION: u32 = GENERATOR | 1;
    pub const GEN_MISSING_VALUE: u32 = GENERATOR | 2;
    pub const GEN_UNSUPPORTED_CAST: u32 = GENERATOR | 3;
    pub const GEN_VERIFICATION_FAILED: u32 = GENERATOR | 4;
    pub const GEN_JIT_SETUP_FAILED: u32 = GENERATOR | 5;
    pub const GEN_JIT_LOOKUP_FAILED: u32 = GENERATOR | 6;
}

/// A single diagnostic entry.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub code: u32,
    pub span: Span,
    pub message: String,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(level: Level, code: u32, span: Span, message: impl Into<String>) -> Self {
        Self { level, code, span, message: message.into(), notes: Vec::new() }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// `LINE,COL - SEVERITY CODE : MESSAGE`, per spec §7.
    pub fn render(&self) -> String {
        format!(
            "{},{} - {} 0x{:05X} : {}",
            self.span.start.line, self.span.start.column, self.level, self.code, self.message
        )
    }
}

/// Builds a [`Diagnostic`] from a `{}`-templated message and a sequence of
/// formatted arguments, substituted left to right.
pub struct DiagnosticBuilder {
    level: Level,
    code: u32,
    span: Span,
    template: String,
    args: Vec<String>,
    notes: Vec<String>,
}

impl DiagnosticBuilder {
    pub fn new(level: Level, code: u32, template: impl Into<String>) -> Self {
        Self {
            level,
            code,
            span: Span::DUMMY,
            template: template.into(),
            args: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    fn substitute(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut args = self.args.iter();
        let mut rest = self.template.as_str();
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            match args.next() {
                Some(a) => out.push_str(a),
                None => out.push_str("{}"),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }

    pub fn build(self) -> Diagnostic {
        let message = self.substitute();
        Diagnostic { level: self.level, code: self.code, span: self.span, message, notes: self.notes }
    }

    /// Build the diagnostic and emit it to `handler` in one step.
    pub fn emit(self, handler: &Handler) {
        handler.emit(self.build());
    }
}

/// Accumulates diagnostics for one compilation unit.
///
/// Single-threaded, `RefCell`-backed: nothing in this pipeline runs
/// concurrently (spec §5), so there is no need for interior locking beyond
/// the borrow-checking `RefCell` already gives us.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self { diagnostics: RefCell::new(Vec::new()) }
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn info(&self, code: u32, span: Span, message: impl Into<String>) {
        self.emit(Diagnostic::new(Level::Info, code, span, message));
    }

    pub fn warning(&self, code: u32, span: Span, message: impl Into<String>) {
        self.emit(Diagnostic::new(Level::Warning, code, span, message));
    }

    pub fn error(&self, code: u32, span: Span, message: impl Into<String>) {
        self.emit(Diagnostic::new(Level::Error, code, span, message));
    }

    pub fn build(&self, level: Level, code: u32) -> DiagnosticBuilderHandle<'_> {
        DiagnosticBuilderHandle { handler: self, builder: DiagnosticBuilder::new(level, code, "") }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.borrow().iter().filter(|d| d.level == Level::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.borrow().iter().filter(|d| d.level == Level::Warning).count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

/// Ergonomic handle returned by [`Handler::build`] so callers can chain
/// `.arg(...)` / `.span(...)` without juggling the builder and handler
/// separately; dropping it without calling `emit` is a no-op.
pub struct DiagnosticBuilderHandle<'h> {
    handler: &'h Handler,
    builder: DiagnosticBuilder,
}

impl<'h> DiagnosticBuilderHandle<'h> {
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.builder.template = template.into();
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.builder = self.builder.span(span);
        self
    }

    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.builder = self.builder.arg(value);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.builder = self.builder.note(note);
        self
    }

    pub fn emit(self) {
        self.handler.emit(self.builder.build());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Coord;

    #[test]
    fn render_matches_spec_format() {
        let span = Span::point(Coord::new(5, 3, 7));
        let diag = Diagnostic::new(Level::Error, codes::PARSE_EXPECTED_TOKEN, span, "expected ';'");
        assert_eq!(diag.render(), "3,7 - error 0x10001 : expected ';'");
    }

    #[test]
    fn builder_substitutes_args_in_order() {
        let diag = DiagnosticBuilder::new(Level::Error, codes::RESOLVE_UNRESOLVED_SYMBOL, "unresolved symbol {}")
            .arg("foo")
            .build();
        assert_eq!(diag.message, "unresolved symbol foo");
    }

    #[test]
    fn handler_tracks_error_and_warning_counts() {
        let handler = Handler::new();
        handler.error(codes::LEX_UNEXPECTED_BYTE, Span::DUMMY, "bad byte");
        handler.warning(codes::LEX_MALFORMED_ESCAPE, Span::DUMMY, "bad escape");
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.warning_count(), 1);
    }
}
