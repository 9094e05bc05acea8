//! `type_spec := 'unsigned'? primitive_kw | qualified_id`

use vela_lex::token::{Keyword, TokenKind};

use crate::ast::{QualifiedIdentifier, TypeSpecifier};
use crate::error::Result;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    pub fn parse_type_specifier(&mut self) -> Result<TypeSpecifier> {
        let start = self.peek().span;

        if self.eat_keyword(Keyword::Unsigned) {
            let kw = self.expect_primitive_keyword()?;
            let span = start.to(kw.1);
            return Ok(TypeSpecifier::Keyword { keyword: kw.0, unsigned: true, span });
        }

        if let Some(keyword) = self.at_primitive_keyword() {
            let token = self.bump();
            return Ok(TypeSpecifier::Keyword { keyword, unsigned: false, span: token.span });
        }

        let qid = self.parse_qualified_identifier()?;
        Ok(TypeSpecifier::Identified(qid))
    }

    fn expect_primitive_keyword(&mut self) -> Result<(vela_lex::token::PrimitiveKeyword, vela_util::Span)> {
        if let Some(keyword) = self.at_primitive_keyword() {
            let token = self.bump();
            Ok((keyword, token.span))
        } else {
            Err(self.expected("a primitive type keyword after 'unsigned'"))
        }
    }

    /// `root_prefix? IDENT ('.' IDENT)*` — the current grammar's
    /// `qualified_id` production has no explicit separator defined beyond
    /// plain identifiers, so a single identifier is the common case; dotted
    /// paths are accepted for forward compatibility with the namespace
    /// nesting this language allows.
    pub fn parse_qualified_identifier(&mut self) -> Result<QualifiedIdentifier> {
        let start = self.peek().span;
        // No absolute-path token (e.g. a leading `::`) exists in this
        // language's concrete syntax; `root_prefix` is always `false` here
        // and is set only by the resolver's own synthesized lookups.
        let root_prefix = false;
        let first = self.expect_identifier()?;
        let mut parts = vec![first.text];
        let mut last_span = first.span;

        while self.at_op(vela_lex::token::Operator::Dot) {
            // Only consume as a path separator if followed by an
            // identifier; otherwise leave the `.` for expression parsing.
            if self.peek_at(1).kind != TokenKind::Identifier {
                break;
            }
            self.bump();
            let part = self.expect_identifier()?;
            last_span = part.span;
            parts.push(part.text);
        }

        Ok(QualifiedIdentifier { root_prefix, parts, span: start.to(last_span) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use vela_lex::{tokenize, TokenCursor};
    use vela_util::Handler;

    fn parse(source: &str) -> (Result<TypeSpecifier>, Handler) {
        let handler = Handler::new();
        let cursor = TokenCursor::new(tokenize(source, &handler));
        let mut parser = Parser::new(cursor, &handler);
        let result = parser.parse_type_specifier();
        (result, handler)
    }

    #[test]
    fn primitive_keyword_type() {
        let (ty, handler) = parse("int");
        assert!(!handler.has_errors());
        assert!(matches!(ty.unwrap(), TypeSpecifier::Keyword { unsigned: false, .. }));
    }

    #[test]
    fn unsigned_primitive_keyword_type() {
        let (ty, handler) = parse("unsigned int");
        assert!(!handler.has_errors());
        assert!(matches!(ty.unwrap(), TypeSpecifier::Keyword { unsigned: true, .. }));
    }

    #[test]
    fn identified_type() {
        let (ty, handler) = parse("Foo");
        assert!(!handler.has_errors());
        assert!(matches!(ty.unwrap(), TypeSpecifier::Identified(_)));
    }
}
