//! Identifier, keyword, and boolean/null literal scanning.

use super::Lexer;
use crate::token::{Keyword, PrimitiveKeyword, TokenKind};

fn is_ident_continue(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

fn classify(word: &str) -> TokenKind {
    match word {
        "module" => TokenKind::Keyword(Keyword::Module),
        "import" => TokenKind::Keyword(Keyword::Import),
        "namespace" => TokenKind::Keyword(Keyword::Namespace),
        "public" => TokenKind::Keyword(Keyword::Public),
        "protected" => TokenKind::Keyword(Keyword::Protected),
        "private" => TokenKind::Keyword(Keyword::Private),
        "return" => TokenKind::Keyword(Keyword::Return),
        "if" => TokenKind::Keyword(Keyword::If),
        "else" => TokenKind::Keyword(Keyword::Else),
        "while" => TokenKind::Keyword(Keyword::While),
        "for" => TokenKind::Keyword(Keyword::For),
        "unsigned" => TokenKind::Keyword(Keyword::Unsigned),
        "bool" => TokenKind::PrimitiveKeyword(PrimitiveKeyword::Bool),
        "byte" => TokenKind::PrimitiveKeyword(PrimitiveKeyword::Byte),
        "char" => TokenKind::PrimitiveKeyword(PrimitiveKeyword::Char),
        "short" => TokenKind::PrimitiveKeyword(PrimitiveKeyword::Short),
        "int" => TokenKind::PrimitiveKeyword(PrimitiveKeyword::Int),
        "long" => TokenKind::PrimitiveKeyword(PrimitiveKeyword::Long),
        "float" => TokenKind::PrimitiveKeyword(PrimitiveKeyword::Float),
        "double" => TokenKind::PrimitiveKeyword(PrimitiveKeyword::Double),
        "true" | "false" => TokenKind::BoolLiteral,
        "null" => TokenKind::NullLiteral,
        _ => TokenKind::Identifier,
    }
}

impl<'a> Lexer<'a> {
    pub(super) fn lex_identifier(&mut self) -> super::Token {
        let start = self.cursor.position();
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let word = self.cursor.slice_from(start);
        self.emit_at(classify(word), start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use vela_util::Handler;

    fn lex_one(source: &str) -> super::super::Token {
        let handler = Handler::new();
        let mut lexer = Lexer::new(source, &handler);
        lexer.next_token()
    }

    #[test]
    fn keywords_classify_distinctly_from_identifiers() {
        assert_eq!(lex_one("namespace").kind, TokenKind::Keyword(Keyword::Namespace));
        assert_eq!(lex_one("foo").kind, TokenKind::Identifier);
    }

    #[test]
    fn primitive_type_keywords_classify() {
        assert_eq!(lex_one("int").kind, TokenKind::PrimitiveKeyword(PrimitiveKeyword::Int));
        assert_eq!(lex_one("double").kind, TokenKind::PrimitiveKeyword(PrimitiveKeyword::Double));
    }

    #[test]
    fn true_false_null_are_literals() {
        assert_eq!(lex_one("true").kind, TokenKind::BoolLiteral);
        assert_eq!(lex_one("false").kind, TokenKind::BoolLiteral);
        assert_eq!(lex_one("null").kind, TokenKind::NullLiteral);
    }

    #[test]
    fn underscore_prefixed_identifier() {
        assert_eq!(lex_one("_private").kind, TokenKind::Identifier);
    }
}
