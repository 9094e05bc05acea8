//! AST → semantic tree lowering, per spec.md §4.3.
//!
//! Maintains a stack of contexts (`LoweringContext`) tracking which
//! namespace/function/block is currently under construction, per
//! SPEC_FULL.md §4.3's "sum types over visitor" design note. Performs no
//! name resolution and no type inference (every declared type becomes a
//! [`crate::types::Type::Unresolved`] placeholder, every expression's type
//! slot starts as [`crate::types::Type::Pending`]); the only way lowering
//! fails is a declaration appearing in a context that cannot hold it.

use vela_lex::token::Operator;
use vela_par::ast as cst;
use vela_util::diagnostic::codes;
use vela_util::{FxHashMap, Handler, Symbol};

use crate::error::{LoweringError, LoweringResult};
use crate::ids::{BlockId, ExprId, FunctionId, LocalId, NamespaceId, StmtId};
use crate::tree::{
    AssignOp, BinaryOp, Binding, Block, BlockParent, Expr, Function, Global, Local, LocalParent,
    Namespace, Param, Referent, SemanticTree, Stmt, UnaryOp, VariableId,
};
use crate::types::Type;

enum LoweringContext {
    Namespace { id: NamespaceId, default_visibility: cst::Visibility },
    Function { id: FunctionId },
    Block { id: BlockId },
}

pub struct Lowerer<'a> {
    tree: SemanticTree,
    stack: Vec<LoweringContext>,
    handler: &'a Handler,
}

/// Lowers a parsed [`cst::Unit`] into a [`SemanticTree`].
pub fn lower(unit: &cst::Unit, handler: &Handler) -> LoweringResult<SemanticTree> {
    let mut lowerer = Lowerer::new(handler);
    lowerer.lower_unit(unit)?;
    Ok(lowerer.tree)
}

impl<'a> Lowerer<'a> {
    fn new(handler: &'a Handler) -> Self {
        let tree = SemanticTree::new();
        let root = tree.root;
        Self {
            tree,
            stack: vec![LoweringContext::Namespace { id: root, default_visibility: cst::Visibility::Public }],
            handler,
        }
    }

    fn lower_unit(&mut self, unit: &cst::Unit) -> LoweringResult<()> {
        if let Some(name) = &unit.module_name {
            let joined = name.parts.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(".");
            self.tree.unit_name = Some(Symbol::intern(&joined));
        }
        for decl in &unit.declarations {
            self.lower_declaration(decl)?;
        }
        Ok(())
    }

    fn current_namespace(&self) -> NamespaceId {
        self.stack
            .iter()
            .rev()
            .find_map(|ctx| match ctx {
                LoweringContext::Namespace { id, .. } => Some(*id),
                _ => None,
            })
            .expect("the root namespace context is never popped")
    }

    fn lower_declaration(&mut self, decl: &cst::Declaration) -> LoweringResult<()> {
        match decl {
            cst::Declaration::Visibility(v) => {
                for ctx in self.stack.iter_mut().rev() {
                    if let LoweringContext::Namespace { default_visibility, .. } = ctx {
                        *default_visibility = v.visibility;
                        break;
                    }
                }
                Ok(())
            }
            cst::Declaration::Namespace(ns) => self.lower_namespace(ns),
            cst::Declaration::Function(f) => self.lower_function(f),
            cst::Declaration::Variable(v) => self.lower_global(v),
        }
    }

    fn lower_namespace(&mut self, ns: &cst::NamespaceDecl) -> LoweringResult<()> {
        let parent = self.current_namespace();
        let id = self.tree.namespaces.push(Namespace {
            parent: Some(parent),
            name: ns.name,
            namespaces: Vec::new(),
            functions: Vec::new(),
            globals: Vec::new(),
            scope: FxHashMap::default(),
            span: ns.span,
        });
        self.tree.namespaces[parent].namespaces.push(id);

        self.stack.push(LoweringContext::Namespace { id, default_visibility: cst::Visibility::Public });
        for decl in &ns.declarations {
            self.lower_declaration(decl)?;
        }
        self.stack.pop();
        Ok(())
    }

    fn lower_function(&mut self, f: &cst::FunctionDecl) -> LoweringResult<()> {
        let ns_id = self.current_namespace();
        let return_type = match &f.return_type {
            Some(ts) => Type::Unresolved(ts.clone()),
            None => Type::Void,
        };

        let function_id = self.tree.functions.push(Function {
            parent: ns_id,
            name: f.name,
            params: Vec::new(),
            param_scope: FxHashMap::default(),
            return_type,
            body: None,
            span: f.span,
        });

        // Registered before the body is lowered so a recursive call inside
        // the body resolves against this function's own id.
        self.tree.namespaces[ns_id].functions.push(function_id);
        self.tree.namespaces[ns_id].scope.insert(f.name, Binding::Function(function_id));

        let mut param_ids = Vec::new();
        for p in &f.params {
            let param_id = self.tree.params.push(Param {
                parent: function_id,
                name: p.name,
                ty: Type::Unresolved(p.ty.clone()),
                span: p.span,
            });
            self.tree.functions[function_id].param_scope.insert(p.name, param_id);
            param_ids.push(param_id);
        }
        self.tree.functions[function_id].params = param_ids;

        if let Some(block) = &f.body {
            self.stack.push(LoweringContext::Function { id: function_id });
            let body_id = self.lower_block(BlockParent::Function(function_id), block)?;
            self.stack.pop();
            self.tree.functions[function_id].body = Some(body_id);
        }

        Ok(())
    }

    fn lower_global(&mut self, v: &cst::VariableDecl) -> LoweringResult<()> {
        let ns_id = self.current_namespace();
        let initializer = v.initializer.as_ref().map(|e| self.lower_expr(e)).transpose()?;
        let id = self.tree.globals.push(Global {
            parent: ns_id,
            name: v.name,
            ty: Type::Unresolved(v.ty.clone()),
            initializer,
            span: v.span,
        });
        self.tree.namespaces[ns_id].globals.push(id);
        self.tree.namespaces[ns_id].scope.insert(v.name, Binding::Variable(VariableId::Global(id)));
        Ok(())
    }

    fn lower_block(&mut self, parent: BlockParent, block: &cst::Block) -> LoweringResult<BlockId> {
        let block_id = self.tree.blocks.push(Block {
            parent,
            locals: Vec::new(),
            stmts: Vec::new(),
            scope: FxHashMap::default(),
            span: block.span,
        });
        self.stack.push(LoweringContext::Block { id: block_id });
        for stmt in &block.statements {
            let stmt_id = self.lower_block_statement(block_id, stmt)?;
            self.tree.blocks[block_id].stmts.push(stmt_id);
        }
        self.stack.pop();
        Ok(block_id)
    }

    /// Lowers a statement that is a direct element of a block's statement
    /// list - the one context that accepts `variable_decl` as a statement
    /// (spec.md §4.3: "Build variable declarations in whichever context
    /// accepts them... block → local").
    fn lower_block_statement(&mut self, block_id: BlockId, stmt: &cst::Stmt) -> LoweringResult<StmtId> {
        if let cst::Stmt::VariableDecl(v) = stmt {
            let local_id = self.lower_local(LocalParent::Block(block_id), v)?;
            self.tree.blocks[block_id].locals.push(local_id);
            self.tree.blocks[block_id].scope.insert(v.name, VariableId::Local(local_id));
            return Ok(self.tree.stmts.push(Stmt::LocalDecl { local: local_id, span: v.span }));
        }
        self.lower_statement_shape(BlockParent::Block(block_id), stmt)
    }

    /// Lowers a statement sitting in a non-block single-statement position
    /// (an `if`/`while`/`for` body or branch with no enclosing `{ }`).
    /// Per spec.md §4.3, only a `block` context accepts a variable
    /// declaration, so one appearing directly here is rejected.
    fn lower_nested_statement(&mut self, parent: BlockParent, stmt: &cst::Stmt) -> LoweringResult<StmtId> {
        if let cst::Stmt::VariableDecl(v) = stmt {
            self.handler.error(
                codes::LOWER_VARIABLE_NOT_ALLOWED_HERE,
                v.span,
                "variable declaration not allowed in this context",
            );
            return Err(LoweringError::VariableNotAllowedHere { span: v.span });
        }
        self.lower_statement_shape(parent, stmt)
    }

    fn lower_statement_shape(&mut self, parent: BlockParent, stmt: &cst::Stmt) -> LoweringResult<StmtId> {
        match stmt {
            cst::Stmt::Block(b) => {
                let inner = self.lower_block(parent, b)?;
                Ok(self.tree.stmts.push(Stmt::Block(inner)))
            }
            cst::Stmt::Return { value, span } => {
                let value = value.as_ref().map(|e| self.lower_expr(e)).transpose()?;
                Ok(self.tree.stmts.push(Stmt::Return { value, span: *span }))
            }
            cst::Stmt::IfElse { cond, then_branch, else_branch, span } => {
                let cond = self.lower_expr(cond)?;
                let then_branch = self.lower_nested_statement(parent, then_branch)?;
                let else_branch =
                    else_branch.as_deref().map(|e| self.lower_nested_statement(parent, e)).transpose()?;
                Ok(self.tree.stmts.push(Stmt::IfElse { cond, then_branch, else_branch, span: *span }))
            }
            cst::Stmt::While { cond, body, span } => {
                let cond = self.lower_expr(cond)?;
                let body = self.lower_nested_statement(parent, body)?;
                Ok(self.tree.stmts.push(Stmt::While { cond, body, span: *span }))
            }
            cst::Stmt::For { init, cond, step, body, span } => self.lower_for(parent, init, cond, step, body, *span),
            cst::Stmt::ExpressionStmt { expr, span } => {
                let expr = self.lower_expr(expr)?;
                Ok(self.tree.stmts.push(Stmt::ExpressionStmt { expr, span: *span }))
            }
            // Reached only from `lower_block_statement`, which handles
            // `VariableDecl` itself before delegating here.
            cst::Stmt::VariableDecl(_) => unreachable!("variable_decl is handled by its caller"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn lower_for(
        &mut self,
        parent: BlockParent,
        init: &Option<Box<cst::Stmt>>,
        cond: &Option<cst::Expr>,
        step: &Option<cst::Expr>,
        body: &cst::Stmt,
        span: vela_util::Span,
    ) -> LoweringResult<StmtId> {
        // Reserve the id up front: the header's declared variable (if any)
        // needs to record this statement as its enclosing for-scope before
        // the statement's own fields are known.
        let for_id = self.tree.stmts.push(Stmt::Return { value: None, span });

        let mut scope = FxHashMap::default();
        let lowered_init = match init.as_deref() {
            Some(cst::Stmt::VariableDecl(v)) => {
                let local_id = self.lower_local(LocalParent::For(for_id), v)?;
                scope.insert(v.name, local_id);
                Some(self.tree.stmts.push(Stmt::LocalDecl { local: local_id, span: v.span }))
            }
            Some(other) => Some(self.lower_nested_statement(parent, other)?),
            None => None,
        };
        let lowered_cond = cond.as_ref().map(|e| self.lower_expr(e)).transpose()?;
        let lowered_step = step.as_ref().map(|e| self.lower_expr(e)).transpose()?;
        let body_id = self.lower_nested_statement(BlockParent::For(for_id), body)?;

        self.tree.stmts[for_id] = Stmt::For {
            init: lowered_init,
            cond: lowered_cond,
            step: lowered_step,
            body: body_id,
            scope,
            enclosing: parent,
            span,
        };
        Ok(for_id)
    }

    fn lower_local(&mut self, parent: LocalParent, v: &cst::VariableDecl) -> LoweringResult<LocalId> {
        let initializer = v.initializer.as_ref().map(|e| self.lower_expr(e)).transpose()?;
        Ok(self.tree.locals.push(Local {
            parent,
            name: v.name,
            ty: Type::Unresolved(v.ty.clone()),
            initializer,
            span: v.span,
        }))
    }

    fn lower_expr(&mut self, expr: &cst::Expr) -> LoweringResult<ExprId> {
        let node = match expr {
            cst::Expr::IntLiteral { token } => Expr::IntLiteral { token: *token, ty: Type::Pending },
            cst::Expr::FloatLiteral { token } => Expr::FloatLiteral { token: *token, ty: Type::Pending },
            cst::Expr::CharLiteral { token } => Expr::CharLiteral { token: *token, ty: Type::Pending },
            cst::Expr::StringLiteral { token } => Expr::StringLiteral { token: *token, ty: Type::Pending },
            cst::Expr::BoolLiteral { token } => Expr::BoolLiteral { token: *token, ty: Type::Pending },
            cst::Expr::NullLiteral { token } => Expr::NullLiteral { token: *token },
            cst::Expr::Identifier(qid) => Expr::Symbol {
                parts: qid.parts.clone(),
                root_prefix: qid.root_prefix,
                referent: Referent::Unresolved,
                ty: Type::Pending,
                span: qid.span,
            },
            cst::Expr::Unary { op, operand, is_postfix, span } => {
                let operand = self.lower_expr(operand)?;
                Expr::Unary { op: classify_unary(op.kind), operand, is_postfix: *is_postfix, ty: Type::Pending, span: *span }
            }
            cst::Expr::Binary { op, lhs, rhs, span } => {
                let lhs = self.lower_expr(lhs)?;
                let rhs = self.lower_expr(rhs)?;
                Expr::Binary { op: classify_binary(op.kind), lhs, rhs, ty: Type::Pending, span: *span }
            }
            cst::Expr::Assign { op, target, value, span } => {
                let target = self.lower_expr(target)?;
                let value = self.lower_expr(value)?;
                Expr::Assign { op: classify_assign(op.kind), target, value, ty: Type::Pending, span: *span }
            }
            cst::Expr::Ternary { cond, then_branch, else_branch, span } => {
                let cond = self.lower_expr(cond)?;
                let then_branch = self.lower_expr(then_branch)?;
                let else_branch = self.lower_expr(else_branch)?;
                Expr::Ternary { cond, then_branch, else_branch, ty: Type::Pending, span: *span }
            }
            cst::Expr::Cast { ty, operand, span } => {
                let operand = self.lower_expr(operand)?;
                Expr::Cast { target: Type::Unresolved(ty.clone()), operand, span: *span }
            }
            cst::Expr::Call { callee, args, span } => {
                let callee = self.lower_expr(callee)?;
                let args = args.iter().map(|a| self.lower_expr(a)).collect::<LoweringResult<Vec<_>>>()?;
                Expr::Call { callee, args, ty: Type::Pending, span: *span }
            }
            cst::Expr::Index { base, index, span } => {
                let base = self.lower_expr(base)?;
                let index = self.lower_expr(index)?;
                Expr::Index { base, index, ty: Type::Pending, span: *span }
            }
        };
        Ok(self.tree.exprs.push(node))
    }
}

fn classify_unary(op: vela_lex::token::TokenKind) -> UnaryOp {
    use vela_lex::token::TokenKind;
    match op {
        TokenKind::Operator(Operator::Plus) => UnaryOp::Plus,
        TokenKind::Operator(Operator::Minus) => UnaryOp::Minus,
        TokenKind::Operator(Operator::Not) => UnaryOp::LogicalNot,
        TokenKind::Operator(Operator::Tilde) => UnaryOp::BitNot,
        TokenKind::Operator(Operator::PlusPlus) => UnaryOp::Increment,
        TokenKind::Operator(Operator::MinusMinus) => UnaryOp::Decrement,
        _ => unreachable!(),
    }
}

fn classify_binary(op: vela_lex::token::TokenKind) -> BinaryOp {
    use vela_lex::token::TokenKind;
    match op {
        TokenKind::Operator(Operator::LogicalOr) => BinaryOp::LogicalOr,
        TokenKind::Operator(Operator::LogicalAnd) => BinaryOp::LogicalAnd,
        TokenKind::Operator(Operator::Pipe) => BinaryOp::BitOr,
        TokenKind::Operator(Operator::Caret) => BinaryOp::BitXor,
        TokenKind::Operator(Operator::Amp) => BinaryOp::BitAnd,
        TokenKind::Operator(Operator::EqEq) => BinaryOp::Eq,
        TokenKind::Operator(Operator::NotEq) => BinaryOp::NotEq,
        TokenKind::Operator(Operator::Lt) => BinaryOp::Lt,
        TokenKind::Operator(Operator::Gt) => BinaryOp::Gt,
        TokenKind::Operator(Operator::LtEq) => BinaryOp::LtEq,
        TokenKind::Operator(Operator::GtEq) => BinaryOp::GtEq,
        TokenKind::Operator(Operator::Shl) => BinaryOp::Shl,
        TokenKind::Operator(Operator::Shr) => BinaryOp::Shr,
        TokenKind::Operator(Operator::Plus) => BinaryOp::Add,
        TokenKind::Operator(Operator::Minus) => BinaryOp::Sub,
        TokenKind::Operator(Operator::Star) => BinaryOp::Mul,
        TokenKind::Operator(Operator::Slash) => BinaryOp::Div,
        TokenKind::Operator(Operator::Percent) => BinaryOp::Mod,
        // Member-pointer operators the precedence ladder carries over from
        // the C-family grammar (spec.md §4.2); the language defines no
        // pointer or struct types, so any use is rejected by the resolver
        // (`RESOLVE_FORBIDDEN_OPERATOR`), not by lowering.
        TokenKind::Operator(Operator::DotStar) | TokenKind::Operator(Operator::ArrowStar) => BinaryOp::MemberPointer,
        other => unreachable!("binary operand carries an unexpected token kind {:?}", other),
    }
}

fn classify_assign(op: vela_lex::token::TokenKind) -> AssignOp {
    use vela_lex::token::TokenKind;
    match op {
        TokenKind::Operator(Operator::Assign) => AssignOp::Assign,
        TokenKind::Operator(Operator::PlusAssign) => AssignOp::AddAssign,
        TokenKind::Operator(Operator::MinusAssign) => AssignOp::SubAssign,
        TokenKind::Operator(Operator::StarAssign) => AssignOp::MulAssign,
        TokenKind::Operator(Operator::SlashAssign) => AssignOp::DivAssign,
        TokenKind::Operator(Operator::PercentAssign) => AssignOp::ModAssign,
        TokenKind::Operator(Operator::AmpAssign) => AssignOp::AndAssign,
        TokenKind::Operator(Operator::PipeAssign) => AssignOp::OrAssign,
        TokenKind::Operator(Operator::CaretAssign) => AssignOp::XorAssign,
        TokenKind::Operator(Operator::ShlAssign) => AssignOp::ShlAssign,
        TokenKind::Operator(Operator::ShrAssign) => AssignOp::ShrAssign,
        other => unreachable!("assignment operand carries an unexpected token kind {:?}", other),
    }
}
