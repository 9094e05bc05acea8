//! Parser error type. Thrown on the first production that cannot
//! backtrack, per spec.md §4.2/§7 — the parser does not attempt recovery.

use thiserror::Error;
use vela_util::Span;

#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("{span}: expected {expected}, found {found}")]
    ExpectedToken { span: Span, expected: String, found: String },

    #[error("{span}: unexpected token {found}")]
    UnexpectedToken { span: Span, found: String },

    #[error("{span}: unexpected end of input")]
    UnexpectedEof { span: Span },
}

impl ParsingError {
    pub fn span(&self) -> Span {
        match self {
            ParsingError::ExpectedToken { span, .. } => *span,
            ParsingError::UnexpectedToken { span, .. } => *span,
            ParsingError::UnexpectedEof { span, .. } => *span,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParsingError>;
