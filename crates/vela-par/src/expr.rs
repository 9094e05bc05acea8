//! Expression grammar: a manual precedence climb over the C-family ladder
//! from spec.md §4.2 — assignment (right-assoc) > ternary > logical-or >
//! logical-and > bit-or > bit-xor > bit-and > equality > relational > shift
//! > additive > multiplicative > pm (`.*`, `->*`) > cast > unary-prefix >
//! postfix > primary. Each level is one function calling the next, then
//! looping (or, for assignment/ternary/cast, recursing) on matching
//! operators — exactly the shape spec.md §4.2 describes.

use vela_lex::token::{Operator, Punctuator, TokenKind};

use crate::ast::Expr;
use crate::error::Result;
use crate::parser::Parser;

fn assignment_op(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Operator(
            Operator::Assign
                | Operator::PlusAssign
                | Operator::MinusAssign
                | Operator::StarAssign
                | Operator::SlashAssign
                | Operator::PercentAssign
                | Operator::AmpAssign
                | Operator::PipeAssign
                | Operator::CaretAssign
                | Operator::ShlAssign
                | Operator::ShrAssign
        )
    )
}

impl<'a> Parser<'a> {
    /// Entry point used by statement/declaration productions; the grammar
    /// calls this `assign_expr`/`expression` interchangeably since
    /// assignment is the top of the precedence ladder.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_assignment_expr()
    }

    pub(crate) fn parse_assignment_expr(&mut self) -> Result<Expr> {
        let lhs = self.parse_ternary_expr()?;
        if assignment_op(self.peek().kind) {
            let op = self.bump();
            let value = self.parse_assignment_expr()?; // right-associative
            let span = lhs.span().to(value.span());
            return Ok(Expr::Assign { op, target: Box::new(lhs), value: Box::new(value), span });
        }
        Ok(lhs)
    }

    fn parse_ternary_expr(&mut self) -> Result<Expr> {
        let cond = self.parse_logical_or_expr()?;
        if self.at_op(Operator::Question) {
            self.bump();
            let then_branch = self.parse_assignment_expr()?;
            self.expect_punct(Punctuator::Colon)?;
            let else_branch = self.parse_assignment_expr()?; // right-associative
            let span = cond.span().to(else_branch.span());
            return Ok(Expr::Ternary {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span,
            });
        }
        Ok(cond)
    }

    fn parse_logical_or_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::LogicalOr], Self::parse_logical_and_expr)
    }

    fn parse_logical_and_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::LogicalAnd], Self::parse_bit_or_expr)
    }

    fn parse_bit_or_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::Pipe], Self::parse_bit_xor_expr)
    }

    fn parse_bit_xor_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::Caret], Self::parse_bit_and_expr)
    }

    fn parse_bit_and_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::Amp], Self::parse_equality_expr)
    }

    fn parse_equality_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::EqEq, Operator::NotEq], Self::parse_relational_expr)
    }

    fn parse_relational_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(
            &[Operator::Lt, Operator::Gt, Operator::LtEq, Operator::GtEq],
            Self::parse_shift_expr,
        )
    }

    fn parse_shift_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::Shl, Operator::Shr], Self::parse_additive_expr)
    }

    fn parse_additive_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::Plus, Operator::Minus], Self::parse_multiplicative_expr)
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(
            &[Operator::Star, Operator::Slash, Operator::Percent],
            Self::parse_pm_expr,
        )
    }

    fn parse_pm_expr(&mut self) -> Result<Expr> {
        self.parse_left_assoc_binary(&[Operator::DotStar, Operator::ArrowStar], Self::parse_cast_expr)
    }

    /// Shared left-associative binary-operator loop: parse one
    /// higher-precedence operand, then fold in `op operand` pairs while the
    /// current token is one of `ops`.
    fn parse_left_assoc_binary(
        &mut self,
        ops: &[Operator],
        mut next: impl FnMut(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut lhs = next(self)?;
        loop {
            let matched = matches!(self.peek().kind, TokenKind::Operator(op) if ops.contains(&op));
            if !matched {
                break;
            }
            let op = self.bump();
            let rhs = next(self)?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs), span };
        }
        Ok(lhs)
    }

    /// `'(' type_spec ')' cast_expr | unary_expr` — speculative per
    /// spec.md §4.2. Disambiguation only triggers when the parenthesized
    /// content starts with a primitive-type keyword (spec.md §8: "`(T)
    /// expr` parses as cast when `T` is a type keyword"); a bare
    /// identifier after `(` is always a parenthesized expression, since
    /// this language has no named types to look up at parse time.
    fn parse_cast_expr(&mut self) -> Result<Expr> {
        if self.at_punct(Punctuator::LParen) && self.looks_like_primitive_type_at(1) {
            let checkpoint = self.tell();
            match self.try_parse_cast() {
                Ok(expr) => return Ok(expr),
                Err(_) => self.seek(checkpoint),
            }
        }
        self.parse_unary_expr()
    }

    fn looks_like_primitive_type_at(&self, offset: usize) -> bool {
        match self.peek_at(offset).kind {
            TokenKind::PrimitiveKeyword(_) => true,
            TokenKind::Keyword(vela_lex::token::Keyword::Unsigned) => {
                matches!(self.peek_at(offset + 1).kind, TokenKind::PrimitiveKeyword(_))
            }
            _ => false,
        }
    }

    fn try_parse_cast(&mut self) -> Result<Expr> {
        let start = self.bump().span; // '('
        let ty = self.parse_type_specifier()?;
        self.expect_punct(Punctuator::RParen)?;
        let operand = self.parse_cast_expr()?; // allows `(int)(float)x` to chain
        let span = start.to(operand.span());
        Ok(Expr::Cast { ty, operand: Box::new(operand), span })
    }

    fn is_prefix_unary_op(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Operator(
                Operator::Plus | Operator::Minus | Operator::Not | Operator::Tilde | Operator::PlusPlus | Operator::MinusMinus
            )
        )
    }

    fn parse_unary_expr(&mut self) -> Result<Expr> {
        if Self::is_prefix_unary_op(self.peek().kind) {
            let op = self.bump();
            let operand = self.parse_unary_expr()?;
            let span = op.span.to(operand.span());
            return Ok(Expr::Unary { op, operand: Box::new(operand), is_postfix: false, span });
        }
        self.parse_postfix_expr()
    }

    fn parse_postfix_expr(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary_expr()?;
        loop {
            if self.at_punct(Punctuator::LParen) {
                expr = self.parse_call_suffix(expr)?;
            } else if self.at_punct(Punctuator::LBracket) {
                expr = self.parse_index_suffix(expr)?;
            } else if self.at_op(Operator::PlusPlus) || self.at_op(Operator::MinusMinus) {
                let op = self.bump();
                let span = expr.span().to(op.span);
                expr = Expr::Unary { op, operand: Box::new(expr), is_postfix: true, span };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_call_suffix(&mut self, callee: Expr) -> Result<Expr> {
        let start = callee.span();
        self.bump(); // '('
        let mut args = Vec::new();
        if !self.at_punct(Punctuator::RParen) {
            loop {
                args.push(self.parse_assignment_expr()?);
                if !self.eat_punct(Punctuator::Comma) {
                    break;
                }
            }
        }
        let close = self.expect_punct(Punctuator::RParen)?;
        Ok(Expr::Call { callee: Box::new(callee), args, span: start.to(close.span) })
    }

    fn parse_index_suffix(&mut self, base: Expr) -> Result<Expr> {
        let start = base.span();
        self.bump(); // '['
        let index = self.parse_expr()?;
        let close = self.expect_punct(Punctuator::RBracket)?;
        Ok(Expr::Index { base: Box::new(base), index: Box::new(index), span: start.to(close.span) })
    }

    fn parse_primary_expr(&mut self) -> Result<Expr> {
        let token = self.peek();
        match token.kind {
            TokenKind::IntegerLiteral { .. } => {
                self.bump();
                Ok(Expr::IntLiteral { token })
            }
            TokenKind::FloatLiteral { .. } => {
                self.bump();
                Ok(Expr::FloatLiteral { token })
            }
            TokenKind::CharLiteral => {
                self.bump();
                Ok(Expr::CharLiteral { token })
            }
            TokenKind::StringLiteral => {
                self.bump();
                Ok(Expr::StringLiteral { token })
            }
            TokenKind::BoolLiteral => {
                self.bump();
                Ok(Expr::BoolLiteral { token })
            }
            TokenKind::NullLiteral => {
                self.bump();
                Ok(Expr::NullLiteral { token })
            }
            TokenKind::Identifier => {
                let qid = self.parse_qualified_identifier()?;
                Ok(Expr::Identifier(qid))
            }
            TokenKind::Punctuator(Punctuator::LParen) => self.parse_parenthesized_expr(),
            _ => Err(self.unexpected(token)),
        }
    }

    fn parse_parenthesized_expr(&mut self) -> Result<Expr> {
        self.bump(); // '('
        let inner = self.parse_expr()?;
        self.expect_punct(Punctuator::RParen)?;
        Ok(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use vela_lex::token::Operator;
    use vela_lex::{tokenize, TokenCursor};
    use vela_util::Handler;

    fn parse_expr(source: &str) -> (Result<Expr>, Handler) {
        let handler = Handler::new();
        let cursor = TokenCursor::new(tokenize(source, &handler));
        let mut parser = Parser::new(cursor, &handler);
        (parser.parse_expr(), handler)
    }

    fn binary_op(expr: &Expr) -> Operator {
        match expr {
            Expr::Binary { op, .. } => match op.kind {
                TokenKind::Operator(o) => o,
                _ => panic!("binary node without operator token"),
            },
            other => panic!("expected binary expr, got {other:?}"),
        }
    }

    #[test]
    fn higher_precedence_binds_tighter() {
        // a + b * c  =>  a + (b * c)
        let (expr, handler) = parse_expr("a + b * c");
        assert!(!handler.has_errors());
        let expr = expr.unwrap();
        assert_eq!(binary_op(&expr), Operator::Plus);
        match &expr {
            Expr::Binary { rhs, .. } => assert_eq!(binary_op(rhs), Operator::Star),
            _ => unreachable!(),
        }
    }

    #[test]
    fn same_precedence_is_left_associative() {
        // a - b - c => (a - b) - c
        let (expr, handler) = parse_expr("a - b - c");
        assert!(!handler.has_errors());
        let expr = expr.unwrap();
        assert_eq!(binary_op(&expr), Operator::Minus);
        match &expr {
            Expr::Binary { lhs, .. } => assert_eq!(binary_op(lhs), Operator::Minus),
            _ => unreachable!(),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        let (expr, handler) = parse_expr("a = b = c");
        assert!(!handler.has_errors());
        match expr.unwrap() {
            Expr::Assign { value, .. } => assert!(matches!(*value, Expr::Assign { .. })),
            other => panic!("expected assign expr, got {other:?}"),
        }
    }

    #[test]
    fn cast_with_type_keyword() {
        let (expr, handler) = parse_expr("(int) x");
        assert!(!handler.has_errors());
        assert!(matches!(expr.unwrap(), Expr::Cast { .. }));
    }

    #[test]
    fn parenthesized_non_type_is_not_cast() {
        let (expr, handler) = parse_expr("(x) + 1");
        assert!(!handler.has_errors());
        assert!(matches!(expr.unwrap(), Expr::Binary { .. }));
    }

    #[test]
    fn call_with_arguments() {
        let (expr, handler) = parse_expr("f(1, 2, 3)");
        assert!(!handler.has_errors());
        match expr.unwrap() {
            Expr::Call { args, .. } => assert_eq!(args.len(), 3),
            other => panic!("expected call expr, got {other:?}"),
        }
    }

    #[test]
    fn index_expression() {
        let (expr, handler) = parse_expr("arr[0]");
        assert!(!handler.has_errors());
        assert!(matches!(expr.unwrap(), Expr::Index { .. }));
    }

    #[test]
    fn ternary_is_right_associative() {
        let (expr, handler) = parse_expr("a ? b : c ? d : e");
        assert!(!handler.has_errors());
        match expr.unwrap() {
            Expr::Ternary { else_branch, .. } => assert!(matches!(*else_branch, Expr::Ternary { .. })),
            other => panic!("expected ternary expr, got {other:?}"),
        }
    }

    #[test]
    fn postfix_increment() {
        let (expr, handler) = parse_expr("x++");
        assert!(!handler.has_errors());
        assert!(matches!(expr.unwrap(), Expr::Unary { is_postfix: true, .. }));
    }

    #[test]
    fn prefix_increment() {
        let (expr, handler) = parse_expr("++x");
        assert!(!handler.has_errors());
        assert!(matches!(expr.unwrap(), Expr::Unary { is_postfix: false, .. }));
    }
}
