//! Property tests for the Parser properties of spec.md §8.

use proptest::prelude::*;

use crate::ast::Expr;
use vela_lex::token::Operator;
use vela_lex::token::TokenKind;
use vela_util::Handler;

fn lower_prec_op() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("||"), Just("&&"), Just("|"), Just("+"), Just("-")]
}

fn higher_prec_op() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("&&"), Just("&"), Just("*"), Just("/"), Just("%")]
}

fn parse_expr(source: &str) -> (Option<Expr>, Handler) {
    let handler = Handler::new();
    let unit_source = format!("f(): int {{ return {source}; }}");
    let result = crate::parse(&unit_source, &handler).ok().and_then(|unit| {
        let crate::ast::Declaration::Function(f) = unit.declarations.into_iter().next()? else {
            return None;
        };
        let body = f.body?;
        match body.statements.into_iter().next()? {
            crate::ast::Stmt::Return { value, .. } => value,
            _ => None,
        }
    });
    (result, handler)
}

fn root_op_token(expr: &Expr) -> Option<TokenKind> {
    match expr {
        Expr::Binary { op, .. } => Some(op.kind),
        _ => None,
    }
}

fn prec_rank(op: Operator) -> u8 {
    match op {
        Operator::LogicalOr => 1,
        Operator::LogicalAnd => 2,
        Operator::Pipe => 3,
        Operator::Caret => 4,
        Operator::Amp => 5,
        Operator::EqEq | Operator::NotEq => 6,
        Operator::Lt | Operator::Gt | Operator::LtEq | Operator::GtEq => 7,
        Operator::Shl | Operator::Shr => 8,
        Operator::Plus | Operator::Minus => 9,
        Operator::Star | Operator::Slash | Operator::Percent => 10,
        _ => 0,
    }
}

proptest! {
    /// For any pair of operators with `prec(op1) < prec(op2)`, `a op1 b op2 c`
    /// parses with the higher-precedence operator binding tighter: the root
    /// node is `op1`, and its right operand is the `op2` subexpression.
    #[test]
    fn lower_precedence_operator_is_the_root(
        op1 in lower_prec_op(),
        op2 in higher_prec_op(),
    ) {
        let TokenKind::Operator(o1) = {
            let (expr, _) = parse_expr(&format!("a {op1} b"));
            expr.as_ref().and_then(root_op_token).unwrap()
        } else { unreachable!() };
        let TokenKind::Operator(o2) = {
            let (expr, _) = parse_expr(&format!("a {op2} b"));
            expr.as_ref().and_then(root_op_token).unwrap()
        } else { unreachable!() };
        prop_assume!(prec_rank(o1) < prec_rank(o2));

        let (expr, handler) = parse_expr(&format!("a {op1} b {op2} c"));
        prop_assert!(!handler.has_errors());
        let expr = expr.unwrap();
        match expr {
            Expr::Binary { op, rhs, .. } => {
                match op.kind {
                    TokenKind::Operator(found) => prop_assert_eq!(found, o1),
                    other => prop_assert!(false, "unexpected root token kind {:?}", other),
                }
                prop_assert!(matches!(*rhs, Expr::Binary { .. }));
            }
            other => prop_assert!(false, "expected binary root, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn cast_vs_parenthesis() {
        let (cast, h1) = parse_expr("(int) x");
        assert!(!h1.has_errors());
        assert!(matches!(cast.unwrap(), Expr::Cast { .. }));

        let (paren, h2) = parse_expr("(x) + 1");
        assert!(!h2.has_errors());
        assert!(matches!(paren.unwrap(), Expr::Binary { .. }));
    }
}
