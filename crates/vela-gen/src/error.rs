//! Error types for LLVM IR generation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("function '{0}' not found")]
    MissingFunction(String),

    #[error("no computed value available: {0}")]
    MissingValue(String),

    #[error("unsupported cast from {from} to {to}")]
    UnsupportedCast { from: String, to: String },

    #[error("module verification failed: {0}")]
    VerificationFailed(String),

    #[error("failed to create JIT execution engine: {0}")]
    JitSetup(String),

    #[error("no function named '{0}' in the JIT-ed module")]
    JitLookup(String),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
