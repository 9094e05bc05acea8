//! vela-sem - lowers a parsed unit into a semantic tree and resolves it.
//!
//! [`lower_and_resolve`] drives both stages in sequence: [`lower::lower`]
//! builds the arena-backed [`tree::SemanticTree`] from a [`vela_par::ast::Unit`]
//! (spec.md §4.3), then [`resolve::resolve`] fills in every type slot and
//! symbol referent in place (spec.md §4.4).

pub mod error;
pub mod ids;
mod lower;
mod resolve;
pub mod tree;
pub mod types;

use vela_par::ast::Unit;
use vela_util::Handler;

pub use error::{LoweringError, LoweringResult, ResolutionError, Result};
pub use lower::lower;
pub use resolve::resolve;
pub use tree::SemanticTree;

/// Errors produced across the lowering and resolution stages.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    #[error(transparent)]
    Lowering(#[from] LoweringError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Lowers and resolves `unit` in one step, the shape the driver crate
/// actually wants.
pub fn lower_and_resolve(unit: &Unit, handler: &Handler) -> std::result::Result<SemanticTree, SemanticError> {
    let mut tree = lower(unit, handler)?;
    resolve(&mut tree, handler)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(source: &str) -> (std::result::Result<SemanticTree, SemanticError>, Handler) {
        let handler = Handler::new();
        let unit = vela_par::parse(source, &handler).expect("source must parse");
        (lower_and_resolve(&unit, &handler), handler)
    }

    #[test]
    fn resolves_a_minimal_function() {
        let (tree, handler) = build("test(): int { return 42; }");
        assert!(!handler.has_errors());
        let tree = tree.unwrap();
        assert_eq!(tree.functions.len(), 1);
        let f = tree.functions.iter().next().unwrap();
        assert!(f.return_type.is_resolved());
    }

    #[test]
    fn cast_to_identical_type_is_not_wrapped() {
        let (tree, handler) = build("f(): int { x: int = 1; return x; }");
        assert!(!handler.has_errors());
        let tree = tree.unwrap();
        let function = tree.functions.iter().next().unwrap();
        let body = tree.blocks.get(function.body.unwrap()).unwrap();
        let return_stmt = body.stmts.last().unwrap();
        let crate::tree::Stmt::Return { value: Some(expr_id), .. } = tree.stmts[*return_stmt] else {
            panic!("expected a return statement with a value");
        };
        // `x` is already `int`, the function's return type - no cast
        // wrapper should have been inserted around it.
        assert!(matches!(tree.exprs[expr_id], crate::tree::Expr::Symbol { .. }));
    }

    #[test]
    fn cast_insertion_wraps_exactly_once() {
        let (tree, handler) = build("f(): long { return 1; }");
        assert!(!handler.has_errors());
        let tree = tree.unwrap();
        let function = tree.functions.iter().next().unwrap();
        let body = tree.blocks.get(function.body.unwrap()).unwrap();
        let return_stmt = body.stmts.last().unwrap();
        let crate::tree::Stmt::Return { value: Some(expr_id), .. } = tree.stmts[*return_stmt] else {
            panic!("expected a return statement with a value");
        };
        // The literal defaults to `int`; returning it from a `long`
        // function must wrap it in exactly one cast.
        let crate::tree::Expr::Cast { operand, .. } = tree.exprs[expr_id] else {
            panic!("expected the int literal to be wrapped in a cast to long");
        };
        assert!(matches!(tree.exprs[operand], crate::tree::Expr::IntLiteral { .. }));
    }

    #[test]
    fn unresolved_symbol_is_reported() {
        let (tree, handler) = build("f(): int { return y; }");
        assert!(tree.is_err());
        assert!(handler.has_errors());
    }

    #[test]
    fn variable_declaration_rejected_outside_a_block() {
        let handler = Handler::new();
        let unit =
            vela_par::parse("f(): int { if (1) x: int = 1; return 0; }", &handler).expect("source must parse");
        let result = lower(&unit, &handler);
        assert!(result.is_err());
    }

    #[test]
    fn for_loop_declared_variable_resolves_its_type() {
        let (tree, handler) = build(
            "sum(n: int): int { total: int = 0; for (i: int = 0; i < n; i = i + 1) { total = total + i; } return total; }",
        );
        assert!(!handler.has_errors(), "diagnostics: {:?}", handler.diagnostics());
        let tree = tree.unwrap();
        for expr in tree.exprs.iter() {
            assert!(expr.ty().is_resolved(), "every expression must have a resolved type: {expr:?}");
        }
    }

    #[test]
    fn inner_block_shadowing_an_outer_local_is_rejected() {
        let (tree, handler) = build("f(): int { x: int = 1; { x: int = 2; } return x; }");
        assert!(tree.is_err());
        assert!(handler.has_errors());
    }

    #[test]
    fn duplicate_local_in_the_same_block_is_rejected() {
        let (tree, handler) = build("f(): int { x: int = 1; x: int = 2; return x; }");
        assert!(tree.is_err());
        assert!(handler.has_errors());
    }

    #[test]
    fn sibling_blocks_may_reuse_the_same_local_name() {
        let (tree, handler) = build("f(): int { { x: int = 1; } { x: int = 2; } return 0; }");
        assert!(!handler.has_errors(), "diagnostics: {:?}", handler.diagnostics());
        assert!(tree.is_ok());
    }

    #[test]
    fn recursive_function_call_resolves_to_itself() {
        let (tree, handler) = build("fib(n: int): int { return fib(n); }");
        assert!(!handler.has_errors());
        let tree = tree.unwrap();
        let function = tree.functions.iter().next().unwrap();
        let body = tree.blocks.get(function.body.unwrap()).unwrap();
        let return_stmt = body.stmts.last().unwrap();
        let crate::tree::Stmt::Return { value: Some(expr_id), .. } = tree.stmts[*return_stmt] else {
            panic!("expected a return statement with a value");
        };
        let crate::tree::Expr::Call { callee, .. } = tree.exprs[expr_id] else {
            panic!("expected a call expression");
        };
        assert!(matches!(
            tree.exprs[callee],
            crate::tree::Expr::Symbol { referent: crate::tree::Referent::Function(_), .. }
        ));
    }
}
