//! Lowering and resolution error types. Lowering only fails when a context
//! rejects a declaration it cannot hold (spec.md §4.3); resolution fails on
//! any of the semantic error kinds in spec.md §7.

use thiserror::Error;
use vela_util::Span;

#[derive(Debug, Error)]
pub enum LoweringError {
    #[error("{span}: variable declaration not allowed in this context")]
    VariableNotAllowedHere { span: Span },
}

impl LoweringError {
    pub fn span(&self) -> Span {
        match self {
            LoweringError::VariableNotAllowedHere { span } => *span,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("{span}: unresolved symbol '{name}'")]
    UnresolvedSymbol { span: Span, name: String },

    #[error("{span}: type mismatch: {message}")]
    TypeMismatch { span: Span, message: String },

    #[error("{span}: operator '{op}' is forbidden on type {ty}")]
    ForbiddenOperator { span: Span, op: String, ty: String },

    #[error("{span}: expected {expected} argument(s), found {found}")]
    ArityMismatch { span: Span, expected: usize, found: usize },

    #[error("{span}: left-hand side of assignment is not addressable")]
    NotAddressable { span: Span },

    #[error("{span}: '{name}' is already declared in this scope")]
    VariableRedeclared { span: Span, name: String },

    #[error("{span}: no admissible cast from {from} to {to}")]
    NoAdmissibleCast { span: Span, from: String, to: String },
}

impl ResolutionError {
    pub fn span(&self) -> Span {
        match self {
            ResolutionError::UnresolvedSymbol { span, .. }
            | ResolutionError::TypeMismatch { span, .. }
            | ResolutionError::ForbiddenOperator { span, .. }
            | ResolutionError::ArityMismatch { span, .. }
            | ResolutionError::NotAddressable { span, .. }
            | ResolutionError::VariableRedeclared { span, .. }
            | ResolutionError::NoAdmissibleCast { span, .. } => *span,
        }
    }
}

pub type LoweringResult<T> = std::result::Result<T, LoweringError>;
pub type Result<T> = std::result::Result<T, ResolutionError>;
