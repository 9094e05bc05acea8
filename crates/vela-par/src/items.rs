//! Top-level grammar: `unit`, `module_decl`, `import`, and the four
//! `declaration` alternatives (visibility, namespace, function, variable).

use vela_lex::token::{Keyword, Punctuator, TokenKind};

use crate::ast::{
    Declaration, FunctionDecl, NamespaceDecl, Param, QualifiedIdentifier, Unit, VariableDecl,
    Visibility, VisibilityDecl,
};
use crate::error::Result;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    /// `unit := module_decl? import* declaration*`
    pub fn parse_unit(&mut self) -> Result<Unit> {
        let module_name = if self.at_keyword(Keyword::Module) { Some(self.parse_module_decl()?) } else { None };

        let mut imports = Vec::new();
        while self.at_keyword(Keyword::Import) {
            imports.push(self.parse_import()?);
        }

        let mut declarations = Vec::new();
        while !self.at_eof() {
            declarations.push(self.parse_declaration()?);
        }

        Ok(Unit { module_name, imports, declarations })
    }

    fn parse_module_decl(&mut self) -> Result<QualifiedIdentifier> {
        self.bump(); // 'module'
        let qid = self.parse_qualified_identifier()?;
        self.expect_punct(Punctuator::Semicolon)?;
        Ok(qid)
    }

    fn parse_import(&mut self) -> Result<vela_util::Symbol> {
        self.bump(); // 'import'
        let name = self.expect_identifier()?;
        self.expect_punct(Punctuator::Semicolon)?;
        Ok(name.text)
    }

    /// `declaration := visibility_decl | namespace_decl | function_decl |
    /// variable_decl`
    ///
    /// Visibility and namespace decls are keyword-unambiguous from the
    /// current token; function vs. variable share the same `IDENT` prefix
    /// (the grammar's `specifier*` is currently always empty, per
    /// [`crate::ast::Specifier`]) so that choice is made by speculatively
    /// parsing one and backtracking via `tell`/`seek` on failure, per
    /// spec.md §4.2's stated backtracking rule.
    pub fn parse_declaration(&mut self) -> Result<Declaration> {
        if let Some(visibility) = self.peek_visibility_keyword() {
            return self.parse_visibility_decl(visibility).map(Declaration::Visibility);
        }
        if self.at_keyword(Keyword::Namespace) {
            return self.parse_namespace_decl().map(Declaration::Namespace);
        }

        let checkpoint = self.tell();
        match self.parse_function_decl() {
            Ok(decl) => return Ok(Declaration::Function(decl)),
            Err(_) => self.seek(checkpoint),
        }

        self.parse_variable_decl().map(Declaration::Variable)
    }

    fn peek_visibility_keyword(&self) -> Option<Visibility> {
        match self.peek().kind {
            TokenKind::Keyword(Keyword::Public) => Some(Visibility::Public),
            TokenKind::Keyword(Keyword::Protected) => Some(Visibility::Protected),
            TokenKind::Keyword(Keyword::Private) => Some(Visibility::Private),
            _ => None,
        }
    }

    /// `visibility_decl := ('public'|'protected'|'private') ':'`
    fn parse_visibility_decl(&mut self, visibility: Visibility) -> Result<VisibilityDecl> {
        let start = self.bump().span; // the keyword
        let colon = self.expect_punct(Punctuator::Colon)?;
        Ok(VisibilityDecl { visibility, span: start.to(colon.span) })
    }

    /// `namespace_decl := 'namespace' IDENT? '{' declaration* '}'`
    fn parse_namespace_decl(&mut self) -> Result<NamespaceDecl> {
        let start = self.bump().span; // 'namespace'
        let name = if self.at_identifier() { Some(self.bump().text) } else { None };

        self.expect_punct(Punctuator::LBrace)?;
        let mut declarations = Vec::new();
        while !self.at_punct(Punctuator::RBrace) && !self.at_eof() {
            declarations.push(self.parse_declaration()?);
        }
        let close = self.expect_punct(Punctuator::RBrace)?;

        Ok(NamespaceDecl { name, declarations, span: start.to(close.span) })
    }

    /// `function_decl := specifier* IDENT '(' param_list? ')' (':'
    /// type_spec)? (block | ';')`
    fn parse_function_decl(&mut self) -> Result<FunctionDecl> {
        let start = self.peek().span;
        let name = self.expect_identifier()?;
        self.expect_punct(Punctuator::LParen)?;
        let params = self.parse_param_list()?;
        self.expect_punct(Punctuator::RParen)?;

        let return_type =
            if self.eat_punct(Punctuator::Colon) { Some(self.parse_type_specifier()?) } else { None };

        let (body, end_span) = if self.at_punct(Punctuator::LBrace) {
            let block = self.parse_block()?;
            let span = block.span;
            (Some(block), span)
        } else {
            let semi = self.expect_punct(Punctuator::Semicolon)?;
            (None, semi.span)
        };

        Ok(FunctionDecl {
            specifiers: Vec::new(),
            name: name.text,
            params,
            return_type,
            body,
            span: start.to(end_span),
        })
    }

    fn parse_param_list(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.at_punct(Punctuator::RParen) {
            return Ok(params);
        }
        loop {
            let start = self.peek().span;
            let name = self.expect_identifier()?;
            self.expect_punct(Punctuator::Colon)?;
            let ty = self.parse_type_specifier()?;
            let span = start.to(ty.span());
            params.push(Param { name: name.text, ty, span });
            if !self.eat_punct(Punctuator::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// `variable_decl := specifier* IDENT ':' type_spec ('=' assign_expr)?
    /// ';'`
    pub(crate) fn parse_variable_decl(&mut self) -> Result<VariableDecl> {
        let start = self.peek().span;
        let name = self.expect_identifier()?;
        self.expect_punct(Punctuator::Colon)?;
        let ty = self.parse_type_specifier()?;
        let initializer =
            if self.eat_op(vela_lex::token::Operator::Assign) { Some(self.parse_assignment_expr()?) } else { None };
        let semi = self.expect_punct(Punctuator::Semicolon)?;

        Ok(VariableDecl { specifiers: Vec::new(), name: name.text, ty, initializer, span: start.to(semi.span) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_lex::{tokenize, TokenCursor};
    use vela_util::Handler;

    fn parse_unit(source: &str) -> (Result<Unit>, Handler) {
        let handler = Handler::new();
        let cursor = TokenCursor::new(tokenize(source, &handler));
        let mut parser = Parser::new(cursor, &handler);
        let unit = parser.parse_unit();
        (unit, handler)
    }

    #[test]
    fn module_and_import() {
        let (unit, handler) = parse_unit("module foo; import bar;");
        assert!(!handler.has_errors());
        let unit = unit.unwrap();
        assert!(unit.module_name.is_some());
        assert_eq!(unit.imports.len(), 1);
    }

    #[test]
    fn function_with_params_and_return_type() {
        let (unit, handler) =
            parse_unit("add(a: int, b: int): int { return a + b; }");
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        let unit = unit.unwrap();
        assert_eq!(unit.declarations.len(), 1);
        match &unit.declarations[0] {
            Declaration::Function(f) => {
                assert_eq!(f.params.len(), 2);
                assert!(f.return_type.is_some());
                assert!(f.body.is_some());
            }
            other => panic!("expected function decl, got {other:?}"),
        }
    }

    #[test]
    fn function_declaration_without_body() {
        let (unit, handler) = parse_unit("extern_fn(): int;");
        assert!(!handler.has_errors());
        match &unit.unwrap().declarations[0] {
            Declaration::Function(f) => assert!(f.body.is_none()),
            other => panic!("expected function decl, got {other:?}"),
        }
    }

    #[test]
    fn global_variable_with_initializer() {
        let (unit, handler) = parse_unit("counter: int = 0;");
        assert!(!handler.has_errors());
        match &unit.unwrap().declarations[0] {
            Declaration::Variable(v) => assert!(v.initializer.is_some()),
            other => panic!("expected variable decl, got {other:?}"),
        }
    }

    #[test]
    fn namespace_with_nested_declarations() {
        let (unit, handler) = parse_unit("namespace math { square(x: int): int { return x * x; } }");
        assert!(!handler.has_errors());
        match &unit.unwrap().declarations[0] {
            Declaration::Namespace(ns) => {
                assert_eq!(ns.name, Some(vela_util::Symbol::intern("math")));
                assert_eq!(ns.declarations.len(), 1);
            }
            other => panic!("expected namespace decl, got {other:?}"),
        }
    }

    #[test]
    fn visibility_block_then_declarations() {
        let (unit, handler) = parse_unit("private: x: int = 1;");
        assert!(!handler.has_errors());
        let unit = unit.unwrap();
        assert_eq!(unit.declarations.len(), 2);
        assert!(matches!(unit.declarations[0], Declaration::Visibility(_)));
    }
}
