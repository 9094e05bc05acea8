//! vela-lex - byte-stream tokenization with lookahead and rollback.
//!
//! [`lexer::tokenize`] turns a source byte slice into the raw token
//! sequence (comments included); [`token_cursor::TokenCursor`] wraps that
//! sequence with the `get/unget/tell/seek/peek/eof` API the parser drives.

pub mod cursor;
mod lexer;
pub mod operators;
#[cfg(test)]
mod proptests;
pub mod token;
pub mod token_cursor;

pub use lexer::tokenize;
pub use token::{Token, TokenKind};
pub use token_cursor::{Position, TokenCursor};
