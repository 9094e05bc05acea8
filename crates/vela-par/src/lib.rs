//! vela-par - recursive-descent parser producing a concrete syntax tree.
//!
//! [`parse`] drives a [`vela_lex::TokenCursor`] through the grammar of
//! spec.md §4.2 and returns a [`ast::Unit`]. Backtracking is limited to the
//! fixed short prefixes spec.md calls out: declaration-kind dispatch
//! (`items`) and cast-vs-parenthesis disambiguation (`expr`).

pub mod ast;
mod error;
mod expr;
mod items;
mod parser;
#[cfg(test)]
mod proptests;
mod stmt;
mod types;

use vela_lex::token_cursor::TokenCursor;
use vela_util::Handler;

pub use error::{ParsingError, Result};
pub use parser::Parser;

/// Tokenizes and parses `source` into a single [`ast::Unit`].
pub fn parse(source: &str, handler: &Handler) -> Result<ast::Unit> {
    let tokens = vela_lex::tokenize(source, handler);
    let cursor = TokenCursor::new(tokens);
    let mut parser = Parser::new(cursor, handler);
    parser.parse_unit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_function() {
        let handler = Handler::new();
        let unit = parse("test() : int { return 42; }", &handler).unwrap();
        assert!(!handler.has_errors());
        assert_eq!(unit.declarations.len(), 1);
    }
}
