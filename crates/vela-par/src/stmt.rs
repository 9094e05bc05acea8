//! `statement := block | return | if_else | while | for | variable_decl |
//! expression ';'`

use vela_lex::token::{Keyword, Punctuator, TokenKind};

use crate::ast::{Block, Stmt};
use crate::error::Result;
use crate::parser::Parser;

impl<'a> Parser<'a> {
    pub fn parse_block(&mut self) -> Result<Block> {
        let start = self.expect_punct(Punctuator::LBrace)?;
        let mut statements = Vec::new();
        while !self.at_punct(Punctuator::RBrace) && !self.at_eof() {
            statements.push(self.parse_statement()?);
        }
        let close = self.expect_punct(Punctuator::RBrace)?;
        Ok(Block { statements, span: start.span.to(close.span) })
    }

    pub fn parse_statement(&mut self) -> Result<Stmt> {
        if self.at_punct(Punctuator::LBrace) {
            return self.parse_block().map(Stmt::Block);
        }
        if self.at_keyword(Keyword::Return) {
            return self.parse_return_stmt();
        }
        if self.at_keyword(Keyword::If) {
            return self.parse_if_stmt();
        }
        if self.at_keyword(Keyword::While) {
            return self.parse_while_stmt();
        }
        if self.at_keyword(Keyword::For) {
            return self.parse_for_stmt();
        }
        // `IDENT ':'` at statement start is unambiguously a variable
        // declaration: no other statement form begins with a bare colon
        // following an identifier.
        if self.at_identifier() && self.peek_at(1).kind == TokenKind::Punctuator(Punctuator::Colon) {
            return self.parse_variable_decl().map(Stmt::VariableDecl);
        }
        self.parse_expression_stmt()
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt> {
        let start = self.bump().span; // 'return'
        let value = if self.at_punct(Punctuator::Semicolon) { None } else { Some(self.parse_expr()?) };
        let semi = self.expect_punct(Punctuator::Semicolon)?;
        Ok(Stmt::Return { value, span: start.to(semi.span) })
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        let start = self.bump().span; // 'if'
        self.expect_punct(Punctuator::LParen)?;
        let cond = self.parse_expr()?;
        self.expect_punct(Punctuator::RParen)?;
        let then_branch = Box::new(self.parse_statement()?);
        let mut span = start.to(then_branch.span());

        let else_branch = if self.at_keyword(Keyword::Else) {
            self.bump();
            let stmt = Box::new(self.parse_statement()?);
            span = start.to(stmt.span());
            Some(stmt)
        } else {
            None
        };

        Ok(Stmt::IfElse { cond, then_branch, else_branch, span })
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        let start = self.bump().span; // 'while'
        self.expect_punct(Punctuator::LParen)?;
        let cond = self.parse_expr()?;
        self.expect_punct(Punctuator::RParen)?;
        let body = Box::new(self.parse_statement()?);
        let span = start.to(body.span());
        Ok(Stmt::While { cond, body, span })
    }

    /// `for '(' (variable_decl | expression ';' | ';') expression? ';'
    /// expression? ')' statement`
    fn parse_for_stmt(&mut self) -> Result<Stmt> {
        let start = self.bump().span; // 'for'
        self.expect_punct(Punctuator::LParen)?;

        let init: Option<Box<Stmt>> = if self.at_punct(Punctuator::Semicolon) {
            self.bump();
            None
        } else if self.at_identifier() && self.peek_at(1).kind == TokenKind::Punctuator(Punctuator::Colon) {
            Some(Box::new(Stmt::VariableDecl(self.parse_variable_decl()?)))
        } else {
            Some(Box::new(self.parse_expression_stmt()?))
        };

        let cond = if self.at_punct(Punctuator::Semicolon) { None } else { Some(self.parse_expr()?) };
        self.expect_punct(Punctuator::Semicolon)?;

        let step = if self.at_punct(Punctuator::RParen) { None } else { Some(self.parse_expr()?) };
        self.expect_punct(Punctuator::RParen)?;

        let body = Box::new(self.parse_statement()?);
        let span = start.to(body.span());

        Ok(Stmt::For { init, cond, step, body, span })
    }

    fn parse_expression_stmt(&mut self) -> Result<Stmt> {
        let expr = self.parse_expr()?;
        let semi = self.expect_punct(Punctuator::Semicolon)?;
        let span = expr.span().to(semi.span);
        Ok(Stmt::ExpressionStmt { expr, span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;
    use vela_lex::{tokenize, TokenCursor};
    use vela_util::Handler;

    fn parse_one_stmt(source: &str) -> (Result<Stmt>, Handler) {
        let handler = Handler::new();
        let cursor = TokenCursor::new(tokenize(source, &handler));
        let mut parser = Parser::new(cursor, &handler);
        (parser.parse_statement(), handler)
    }

    #[test]
    fn return_with_value() {
        let (stmt, handler) = parse_one_stmt("return 1 + 2;");
        assert!(!handler.has_errors());
        assert!(matches!(stmt.unwrap(), Stmt::Return { value: Some(_), .. }));
    }

    #[test]
    fn return_without_value() {
        let (stmt, handler) = parse_one_stmt("return;");
        assert!(!handler.has_errors());
        assert!(matches!(stmt.unwrap(), Stmt::Return { value: None, .. }));
    }

    #[test]
    fn if_else_chain() {
        let (stmt, handler) = parse_one_stmt("if (x) { return 1; } else { return 2; }");
        assert!(!handler.has_errors());
        assert!(matches!(stmt.unwrap(), Stmt::IfElse { else_branch: Some(_), .. }));
    }

    #[test]
    fn while_loop() {
        let (stmt, handler) = parse_one_stmt("while (x) { x = x - 1; }");
        assert!(!handler.has_errors());
        assert!(matches!(stmt.unwrap(), Stmt::While { .. }));
    }

    #[test]
    fn for_loop_with_full_header() {
        let (stmt, handler) = parse_one_stmt("for (i: int = 0; i < 10; i = i + 1) { }");
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        match stmt.unwrap() {
            Stmt::For { init, cond, step, .. } => {
                assert!(init.is_some());
                assert!(cond.is_some());
                assert!(step.is_some());
            }
            other => panic!("expected for loop, got {other:?}"),
        }
    }

    #[test]
    fn local_variable_declaration_statement() {
        let (stmt, handler) = parse_one_stmt("x: int = 5;");
        assert!(!handler.has_errors());
        assert!(matches!(stmt.unwrap(), Stmt::VariableDecl(_)));
    }
}
