//! A post-order walk over a fully resolved [`SemanticTree`] producing an
//! LLVM module, grounded on `faxc-gen/src/llvm.rs`'s `LlvmBackend` (same
//! context/module/builder ownership and `.map_err` idiom around builder
//! calls), generalized from a LIR-register walk to a direct walk over the
//! semantic tree's expression/statement arenas per spec.md §4.5.

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::passes::PassManager;
use inkwell::values::{BasicValue, BasicValueEnum, FunctionValue, InstructionOpcode, InstructionValue, PointerValue};
use inkwell::{FloatPredicate, IntPredicate};

use vela_sem::ids::{BlockId, ExprId, FunctionId, GlobalId, LocalId, ParamId, StmtId};
use vela_sem::tree::{AssignOp, BinaryOp, Expr, Referent, SemanticTree, Stmt, UnaryOp, VariableId};
use vela_sem::types::{Primitive, PrimitiveKind, Type};
use vela_util::diagnostic::codes;
use vela_util::{FxHashMap, Handler, Span};

use crate::error::{GenerationError, Result};
use crate::literal;
use crate::types::TypeMapper;

/// Owns the LLVM context's module/builder and every semantic-entity→LLVM
/// handle map the walk needs, per SPEC_FULL.md §4.5.
pub struct IrEmitter<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    type_mapper: TypeMapper<'ctx>,
    functions: FxHashMap<FunctionId, FunctionValue<'ctx>>,
    globals: FxHashMap<GlobalId, PointerValue<'ctx>>,
    locals: FxHashMap<LocalId, PointerValue<'ctx>>,
    params: FxHashMap<ParamId, PointerValue<'ctx>>,
}

/// Lowers `tree` to a verified, optimized LLVM module in one step - the
/// shape the driver crate actually wants.
pub fn emit_module<'ctx>(
    tree: &SemanticTree,
    context: &'ctx Context,
    module_name: &str,
    handler: &Handler,
) -> Result<Module<'ctx>> {
    let mut emitter = IrEmitter::new(context, module_name);
    emitter.declare_globals(tree);
    emitter.declare_functions(tree);
    for (id, function) in tree.functions.iter_enumerated() {
        if function.body.is_some() {
            emitter.emit_function_body(tree, id)?;
        }
    }
    emitter.run_function_passes();
    emitter.verify(handler)?;
    Ok(emitter.module)
}

impl<'ctx> IrEmitter<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        let module = context.create_module(module_name);
        Self {
            context,
            module,
            builder: context.create_builder(),
            type_mapper: TypeMapper::new(context),
            functions: FxHashMap::default(),
            globals: FxHashMap::default(),
            locals: FxHashMap::default(),
            params: FxHashMap::default(),
        }
    }

    pub fn into_module(self) -> Module<'ctx> {
        self.module
    }

    /// Every global becomes an external-linkage global, zero-initialized
    /// at its resolved type (spec.md §4.5 "Globals": "initializer
    /// expression lowering is a future extension").
    fn declare_globals(&mut self, tree: &SemanticTree) {
        for (id, global) in tree.globals.iter_enumerated() {
            let llvm_ty = self.type_mapper.map_to_basic(&global.ty);
            let global_value = self.module.add_global(llvm_ty, None, global.name.as_str());
            global_value.set_linkage(Linkage::External);
            global_value.set_initializer(&zero_value(llvm_ty));
            self.globals.insert(id, global_value.as_pointer_value());
        }
    }

    /// Declares every function's signature up front so a call to a
    /// not-yet-emitted (or mutually recursive) function resolves.
    fn declare_functions(&mut self, tree: &SemanticTree) {
        for (id, function) in tree.functions.iter_enumerated() {
            let param_types: Vec<Type> = function.params.iter().map(|&p| tree.params[p].ty.clone()).collect();
            let fn_type = self.type_mapper.function_type(&param_types, &function.return_type);
            let function_value = self.module.add_function(function.name.as_str(), fn_type, None);
            self.functions.insert(id, function_value);
        }
    }

    fn emit_function_body(&mut self, tree: &SemanticTree, id: FunctionId) -> Result<()> {
        let function = &tree.functions[id];
        let function_value = self.functions[&id];
        let entry = self.context.append_basic_block(function_value, "entry");
        self.builder.position_at_end(entry);

        for (index, &param_id) in function.params.iter().enumerate() {
            let param = &tree.params[param_id];
            let llvm_ty = self.type_mapper.map_to_basic(&param.ty);
            let slot = self.build_entry_alloca(function_value, llvm_ty, param.name.as_str())?;
            let incoming = function_value
                .get_nth_param(index as u32)
                .ok_or_else(|| GenerationError::MissingValue(format!("parameter {} of {}", index, function.name)))?;
            self.builder.build_store(slot, incoming).map_err(llvm_err)?;
            self.params.insert(param_id, slot);
        }

        // Locals receive their slot at the function's entry block -
        // hoisted allocation, per spec.md §4.5 "Functions".
        if let Some(body) = function.body {
            let mut local_ids = Vec::new();
            collect_locals(tree, body, &mut local_ids);
            for local_id in local_ids {
                let local = &tree.locals[local_id];
                let llvm_ty = self.type_mapper.map_to_basic(&local.ty);
                let slot = self.build_entry_alloca(function_value, llvm_ty, local.name.as_str())?;
                self.locals.insert(local_id, slot);
            }
            self.lower_block(tree, body, function_value)?;
        }

        // Every function ends with a trailing void return emitted
        // unconditionally; the post-pass trims dead instructions after
        // the first terminator per block (spec.md §4.5 "Return").
        let _ = self.builder.build_return(None);

        self.params.retain(|id, _| !function.params.contains(id));
        self.trim_dead_instructions(function_value);
        Ok(())
    }

    fn build_entry_alloca(
        &self,
        function: FunctionValue<'ctx>,
        ty: inkwell::types::BasicTypeEnum<'ctx>,
        name: &str,
    ) -> Result<PointerValue<'ctx>> {
        let entry = function.get_first_basic_block().expect("entry block already created");
        let entry_builder = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => entry_builder.position_before(&first),
            None => entry_builder.position_at_end(entry),
        }
        entry_builder.build_alloca(ty, name).map_err(llvm_err)
    }

    // ---- statements ----

    fn lower_block(&mut self, tree: &SemanticTree, block_id: BlockId, function: FunctionValue<'ctx>) -> Result<()> {
        let stmts = tree.blocks[block_id].stmts.clone();
        for stmt_id in stmts {
            self.lower_stmt(tree, stmt_id, function)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, tree: &SemanticTree, stmt_id: StmtId, function: FunctionValue<'ctx>) -> Result<()> {
        match &tree.stmts[stmt_id] {
            Stmt::Block(block_id) => self.lower_block(tree, *block_id, function),
            Stmt::LocalDecl { local, .. } => {
                let local_id = *local;
                if let Some(init) = tree.locals[local_id].initializer {
                    let value = self.lower_expr(tree, init, function)?;
                    let slot = self.locals[&local_id];
                    self.builder.build_store(slot, value).map_err(llvm_err)?;
                }
                Ok(())
            }
            Stmt::ExpressionStmt { expr, .. } => {
                self.lower_expr(tree, *expr, function)?;
                Ok(())
            }
            Stmt::Return { value, .. } => {
                match value {
                    Some(expr_id) => {
                        let val = self.lower_expr(tree, *expr_id, function)?;
                        self.builder.build_return(Some(&val)).map_err(llvm_err)?;
                    }
                    None => {
                        self.builder.build_return(None).map_err(llvm_err)?;
                    }
                }
                Ok(())
            }
            Stmt::IfElse { cond, then_branch, else_branch, .. } => {
                self.lower_if_else(tree, *cond, *then_branch, *else_branch, function)
            }
            Stmt::While { cond, body, .. } => self.lower_while(tree, *cond, *body, function),
            Stmt::For { init, cond, step, body, .. } => self.lower_for(tree, *init, *cond, *step, *body, function),
        }
    }

    fn lower_if_else(
        &mut self,
        tree: &SemanticTree,
        cond: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
        function: FunctionValue<'ctx>,
    ) -> Result<()> {
        let cond_val = self.lower_expr(tree, cond, function)?.into_int_value();
        let then_bb = self.context.append_basic_block(function, "if_then");
        let else_bb = self.context.append_basic_block(function, "if_else");
        let continue_bb = self.context.append_basic_block(function, "if_continue");
        let else_target = if else_branch.is_some() { else_bb } else { continue_bb };
        self.builder.build_conditional_branch(cond_val, then_bb, else_target).map_err(llvm_err)?;

        self.builder.position_at_end(then_bb);
        self.lower_stmt(tree, then_branch, function)?;
        self.builder.build_unconditional_branch(continue_bb).map_err(llvm_err)?;

        if let Some(else_stmt) = else_branch {
            self.builder.position_at_end(else_bb);
            self.lower_stmt(tree, else_stmt, function)?;
            self.builder.build_unconditional_branch(continue_bb).map_err(llvm_err)?;
        } else {
            else_bb.remove_from_function().ok();
        }

        self.builder.position_at_end(continue_bb);
        Ok(())
    }

    fn lower_while(&mut self, tree: &SemanticTree, cond: ExprId, body: StmtId, function: FunctionValue<'ctx>) -> Result<()> {
        let cond_bb = self.context.append_basic_block(function, "while_cond");
        let body_bb = self.context.append_basic_block(function, "while_body");
        let continue_bb = self.context.append_basic_block(function, "while_continue");

        self.builder.build_unconditional_branch(cond_bb).map_err(llvm_err)?;

        self.builder.position_at_end(cond_bb);
        let cond_val = self.lower_expr(tree, cond, function)?.into_int_value();
        self.builder.build_conditional_branch(cond_val, body_bb, continue_bb).map_err(llvm_err)?;

        self.builder.position_at_end(body_bb);
        self.lower_stmt(tree, body, function)?;
        self.builder.build_unconditional_branch(cond_bb).map_err(llvm_err)?;

        self.builder.position_at_end(continue_bb);
        Ok(())
    }

    fn lower_for(
        &mut self,
        tree: &SemanticTree,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
        function: FunctionValue<'ctx>,
    ) -> Result<()> {
        if let Some(init_stmt) = init {
            self.lower_stmt(tree, init_stmt, function)?;
        }

        let cond_bb = self.context.append_basic_block(function, "for_cond");
        let body_bb = self.context.append_basic_block(function, "for_body");
        let continue_bb = self.context.append_basic_block(function, "for_continue");

        self.builder.build_unconditional_branch(cond_bb).map_err(llvm_err)?;

        self.builder.position_at_end(cond_bb);
        match cond {
            Some(cond_expr) => {
                let cond_val = self.lower_expr(tree, cond_expr, function)?.into_int_value();
                self.builder.build_conditional_branch(cond_val, body_bb, continue_bb).map_err(llvm_err)?;
            }
            None => {
                self.builder.build_unconditional_branch(body_bb).map_err(llvm_err)?;
            }
        }

        self.builder.position_at_end(body_bb);
        self.lower_stmt(tree, body, function)?;
        if let Some(step_expr) = step {
            self.lower_expr(tree, step_expr, function)?;
        }
        self.builder.build_unconditional_branch(cond_bb).map_err(llvm_err)?;

        self.builder.position_at_end(continue_bb);
        Ok(())
    }

    // ---- expressions ----

    fn lower_expr(&mut self, tree: &SemanticTree, expr_id: ExprId, function: FunctionValue<'ctx>) -> Result<BasicValueEnum<'ctx>> {
        match &tree.exprs[expr_id] {
            Expr::IntLiteral { token, ty } => {
                let primitive = require_primitive(ty)?;
                let base = match token.kind {
                    vela_lex::token::TokenKind::IntegerLiteral { base, .. } => base,
                    _ => unreachable!("int literal carries a non-integer token kind"),
                };
                let value = literal::decode_int(token.text.as_str(), base);
                let int_ty = self.type_mapper.map_primitive(&primitive).into_int_type();
                Ok(int_ty.const_int(value, primitive.signed).into())
            }
            Expr::FloatLiteral { token, ty } => {
                let primitive = require_primitive(ty)?;
                let value = literal::decode_float(token.text.as_str());
                let float_ty = self.type_mapper.map_primitive(&primitive).into_float_type();
                Ok(float_ty.const_float(value).into())
            }
            Expr::CharLiteral { token, .. } => {
                let value = literal::decode_char(token.text.as_str());
                Ok(self.context.i8_type().const_int(value as u64, false).into())
            }
            Expr::BoolLiteral { token, .. } => {
                let value = literal::decode_bool(token.text.as_str());
                Ok(self.context.bool_type().const_int(value as u64, false).into())
            }
            Expr::StringLiteral { token, .. } => {
                let bytes = literal::decode_string(token.text.as_str());
                let global = self.builder.build_global_string_ptr(
                    &String::from_utf8_lossy(&bytes[..bytes.len().saturating_sub(1)]),
                    "str",
                );
                Ok(global.as_pointer_value().into())
            }
            Expr::NullLiteral { .. } => {
                Err(GenerationError::UnsupportedCast { from: "null".to_string(), to: "<no admissible type>".to_string() })
            }
            Expr::Symbol { referent, .. } => {
                let (slot, ty) = self.variable_slot(tree, *referent)?;
                let llvm_ty = self.type_mapper.map_to_basic(&ty);
                self.builder.build_load(llvm_ty, slot, "load").map_err(llvm_err)
            }
            Expr::Unary { op, operand, is_postfix, .. } => self.lower_unary(tree, *op, *operand, *is_postfix, function),
            Expr::Binary { op, lhs, rhs, .. } => self.lower_binary(tree, *op, *lhs, *rhs, function),
            Expr::Assign { op, target, value, .. } => self.lower_assign(tree, *op, *target, *value, function),
            Expr::Ternary { cond, then_branch, else_branch, ty, .. } => {
                self.lower_ternary(tree, *cond, *then_branch, *else_branch, ty, function)
            }
            Expr::Cast { target, operand, .. } => {
                let operand_ty = tree.exprs[*operand].ty().clone();
                let value = self.lower_expr(tree, *operand, function)?;
                self.lower_cast(value, &operand_ty, target)
            }
            Expr::Call { callee, args, .. } => self.lower_call(tree, *callee, args, function),
            Expr::Index { .. } => {
                // The resolver rejects every index expression (spec.md §1
                // Non-goals: no array/pointer types), so this arm is
                // unreachable from a tree that resolved successfully.
                unreachable!("index expressions never survive resolution")
            }
        }
    }

    fn variable_slot(&self, tree: &SemanticTree, referent: Referent) -> Result<(PointerValue<'ctx>, Type)> {
        match referent {
            Referent::Variable(VariableId::Global(id)) => Ok((self.globals[&id], tree.globals[id].ty.clone())),
            Referent::Variable(VariableId::Local(id)) => Ok((self.locals[&id], tree.locals[id].ty.clone())),
            Referent::Variable(VariableId::Param(id)) => Ok((self.params[&id], tree.params[id].ty.clone())),
            Referent::Function(_) | Referent::Unresolved => {
                Err(GenerationError::MissingValue("symbol has no addressable slot".to_string()))
            }
        }
    }

    fn lower_unary(
        &mut self,
        tree: &SemanticTree,
        op: UnaryOp,
        operand: ExprId,
        is_postfix: bool,
        function: FunctionValue<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>> {
        match op {
            UnaryOp::Plus => self.lower_expr(tree, operand, function),
            UnaryOp::Minus => {
                let primitive = require_primitive(tree.exprs[operand].ty())?;
                let value = self.lower_expr(tree, operand, function)?;
                if primitive.is_float {
                    Ok(self.builder.build_float_neg(value.into_float_value(), "fneg").map_err(llvm_err)?.into())
                } else {
                    Ok(self.builder.build_int_neg(value.into_int_value(), "neg").map_err(llvm_err)?.into())
                }
            }
            UnaryOp::BitNot => {
                let value = self.lower_expr(tree, operand, function)?;
                Ok(self.builder.build_not(value.into_int_value(), "not").map_err(llvm_err)?.into())
            }
            UnaryOp::LogicalNot => {
                let value = self.lower_expr(tree, operand, function)?;
                Ok(self.builder.build_not(value.into_int_value(), "lnot").map_err(llvm_err)?.into())
            }
            UnaryOp::Increment | UnaryOp::Decrement => {
                self.lower_incr_decr(tree, operand, op == UnaryOp::Increment, is_postfix, function)
            }
        }
    }

    fn lower_incr_decr(
        &mut self,
        tree: &SemanticTree,
        operand: ExprId,
        is_increment: bool,
        is_postfix: bool,
        function: FunctionValue<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>> {
        let primitive = require_primitive(tree.exprs[operand].ty())?;
        let referent = match tree.exprs[operand] {
            Expr::Symbol { referent, .. } => Some(referent),
            _ => None,
        };
        let old_value = self.lower_expr(tree, operand, function)?;
        let new_value = if primitive.is_float {
            let one = self.type_mapper.map_primitive(&primitive).into_float_type().const_float(1.0);
            let old = old_value.into_float_value();
            let result = if is_increment {
                self.builder.build_float_add(old, one, "finc")
            } else {
                self.builder.build_float_sub(old, one, "fdec")
            };
            BasicValueEnum::from(result.map_err(llvm_err)?)
        } else {
            let one = self.type_mapper.map_primitive(&primitive).into_int_type().const_int(1, primitive.signed);
            let old = old_value.into_int_value();
            let result = if is_increment {
                self.builder.build_int_add(old, one, "inc")
            } else {
                self.builder.build_int_sub(old, one, "dec")
            };
            BasicValueEnum::from(result.map_err(llvm_err)?)
        };
        if let Some(referent) = referent {
            let (slot, _) = self.variable_slot(tree, referent)?;
            self.builder.build_store(slot, new_value).map_err(llvm_err)?;
        }
        Ok(if is_postfix { old_value } else { new_value })
    }

    fn lower_binary(
        &mut self,
        tree: &SemanticTree,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        function: FunctionValue<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>> {
        let lhs_val = self.lower_expr(tree, lhs, function)?;
        let rhs_val = self.lower_expr(tree, rhs, function)?;
        let operand_ty = require_primitive(tree.exprs[lhs].ty())?;

        if matches!(op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr) {
            let a = lhs_val.into_int_value();
            let b = rhs_val.into_int_value();
            let result = match op {
                BinaryOp::LogicalAnd => self.builder.build_and(a, b, "land"),
                BinaryOp::LogicalOr => self.builder.build_or(a, b, "lor"),
                _ => unreachable!(),
            };
            return Ok(result.map_err(llvm_err)?.into());
        }

        if matches!(
            op,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq
        ) {
            return self.lower_comparison(op, lhs_val, rhs_val, &operand_ty);
        }

        if operand_ty.is_float {
            let a = lhs_val.into_float_value();
            let b = rhs_val.into_float_value();
            let result = match op {
                BinaryOp::Add => self.builder.build_float_add(a, b, "fadd"),
                BinaryOp::Sub => self.builder.build_float_sub(a, b, "fsub"),
                BinaryOp::Mul => self.builder.build_float_mul(a, b, "fmul"),
                BinaryOp::Div => self.builder.build_float_div(a, b, "fdiv"),
                BinaryOp::Mod => self.builder.build_float_rem(a, b, "frem"),
                _ => unreachable!("forbidden on float operands after resolution"),
            };
            return Ok(result.map_err(llvm_err)?.into());
        }

        let a = lhs_val.into_int_value();
        let b = rhs_val.into_int_value();
        let result = match op {
            BinaryOp::Add => self.builder.build_int_add(a, b, "add"),
            BinaryOp::Sub => self.builder.build_int_sub(a, b, "sub"),
            BinaryOp::Mul => self.builder.build_int_mul(a, b, "mul"),
            BinaryOp::Div if operand_ty.signed => self.builder.build_int_signed_div(a, b, "sdiv"),
            BinaryOp::Div => self.builder.build_int_unsigned_div(a, b, "udiv"),
            BinaryOp::Mod if operand_ty.signed => self.builder.build_int_signed_rem(a, b, "srem"),
            BinaryOp::Mod => self.builder.build_int_unsigned_rem(a, b, "urem"),
            BinaryOp::BitAnd => self.builder.build_and(a, b, "and"),
            BinaryOp::BitOr => self.builder.build_or(a, b, "or"),
            BinaryOp::BitXor => self.builder.build_xor(a, b, "xor"),
            BinaryOp::Shl => self.builder.build_left_shift(a, b, "shl"),
            BinaryOp::Shr => self.builder.build_right_shift(a, b, operand_ty.signed, "shr"),
            BinaryOp::MemberPointer => {
                unreachable!("the resolver rejects every use of .* / ->* before codegen")
            }
            BinaryOp::LogicalAnd
            | BinaryOp::LogicalOr
            | BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::LtEq
            | BinaryOp::GtEq => unreachable!("handled above"),
        };
        Ok(result.map_err(llvm_err)?.into())
    }

    fn lower_comparison(
        &self,
        op: BinaryOp,
        lhs_val: BasicValueEnum<'ctx>,
        rhs_val: BasicValueEnum<'ctx>,
        operand_ty: &Primitive,
    ) -> Result<BasicValueEnum<'ctx>> {
        if operand_ty.is_float {
            let predicate = match op {
                BinaryOp::Eq => FloatPredicate::OEQ,
                BinaryOp::NotEq => FloatPredicate::ONE,
                BinaryOp::Lt => FloatPredicate::OLT,
                BinaryOp::Gt => FloatPredicate::OGT,
                BinaryOp::LtEq => FloatPredicate::OLE,
                BinaryOp::GtEq => FloatPredicate::OGE,
                _ => unreachable!(),
            };
            let result = self.builder.build_float_compare(predicate, lhs_val.into_float_value(), rhs_val.into_float_value(), "fcmp");
            Ok(result.map_err(llvm_err)?.into())
        } else {
            let predicate = match (op, operand_ty.signed) {
                (BinaryOp::Eq, _) => IntPredicate::EQ,
                (BinaryOp::NotEq, _) => IntPredicate::NE,
                (BinaryOp::Lt, true) => IntPredicate::SLT,
                (BinaryOp::Lt, false) => IntPredicate::ULT,
                (BinaryOp::Gt, true) => IntPredicate::SGT,
                (BinaryOp::Gt, false) => IntPredicate::UGT,
                (BinaryOp::LtEq, true) => IntPredicate::SLE,
                (BinaryOp::LtEq, false) => IntPredicate::ULE,
                (BinaryOp::GtEq, true) => IntPredicate::SGE,
                (BinaryOp::GtEq, false) => IntPredicate::UGE,
                _ => unreachable!(),
            };
            let result = self.builder.build_int_compare(predicate, lhs_val.into_int_value(), rhs_val.into_int_value(), "icmp");
            Ok(result.map_err(llvm_err)?.into())
        }
    }

    fn lower_assign(
        &mut self,
        tree: &SemanticTree,
        op: AssignOp,
        target: ExprId,
        value: ExprId,
        function: FunctionValue<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>> {
        let referent = match tree.exprs[target] {
            Expr::Symbol { referent, .. } => referent,
            _ => unreachable!("the resolver only admits a symbol as an assignment target"),
        };
        let (slot, target_ty) = self.variable_slot(tree, referent)?;
        let rhs_val = self.lower_expr(tree, value, function)?;

        let result = if op == AssignOp::Assign {
            rhs_val
        } else {
            let primitive = require_primitive(&target_ty)?;
            let llvm_ty = self.type_mapper.map_to_basic(&target_ty);
            let current = self.builder.build_load(llvm_ty, slot, "load").map_err(llvm_err)?;
            self.apply_compound_op(op, current, rhs_val, &primitive)?
        };
        self.builder.build_store(slot, result).map_err(llvm_err)?;
        Ok(result)
    }

    fn apply_compound_op(
        &self,
        op: AssignOp,
        current: BasicValueEnum<'ctx>,
        rhs: BasicValueEnum<'ctx>,
        ty: &Primitive,
    ) -> Result<BasicValueEnum<'ctx>> {
        if ty.is_float {
            let a = current.into_float_value();
            let b = rhs.into_float_value();
            let result = match op {
                AssignOp::AddAssign => self.builder.build_float_add(a, b, "fadd_assign"),
                AssignOp::SubAssign => self.builder.build_float_sub(a, b, "fsub_assign"),
                AssignOp::MulAssign => self.builder.build_float_mul(a, b, "fmul_assign"),
                AssignOp::DivAssign => self.builder.build_float_div(a, b, "fdiv_assign"),
                AssignOp::ModAssign => self.builder.build_float_rem(a, b, "frem_assign"),
                _ => unreachable!("bitwise compound assignment is forbidden on float operands"),
            };
            Ok(result.map_err(llvm_err)?.into())
        } else {
            let a = current.into_int_value();
            let b = rhs.into_int_value();
            let result = match op {
                AssignOp::AddAssign => self.builder.build_int_add(a, b, "add_assign"),
                AssignOp::SubAssign => self.builder.build_int_sub(a, b, "sub_assign"),
                AssignOp::MulAssign => self.builder.build_int_mul(a, b, "mul_assign"),
                AssignOp::DivAssign if ty.signed => self.builder.build_int_signed_div(a, b, "sdiv_assign"),
                AssignOp::DivAssign => self.builder.build_int_unsigned_div(a, b, "udiv_assign"),
                AssignOp::ModAssign if ty.signed => self.builder.build_int_signed_rem(a, b, "srem_assign"),
                AssignOp::ModAssign => self.builder.build_int_unsigned_rem(a, b, "urem_assign"),
                AssignOp::AndAssign => self.builder.build_and(a, b, "and_assign"),
                AssignOp::OrAssign => self.builder.build_or(a, b, "or_assign"),
                AssignOp::XorAssign => self.builder.build_xor(a, b, "xor_assign"),
                AssignOp::ShlAssign => self.builder.build_left_shift(a, b, "shl_assign"),
                AssignOp::ShrAssign => self.builder.build_right_shift(a, b, ty.signed, "shr_assign"),
                AssignOp::Assign => unreachable!("handled by the caller"),
            };
            Ok(result.map_err(llvm_err)?.into())
        }
    }

    fn lower_ternary(
        &mut self,
        tree: &SemanticTree,
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
        result_ty: &Type,
        function: FunctionValue<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>> {
        let cond_val = self.lower_expr(tree, cond, function)?.into_int_value();
        let then_bb = self.context.append_basic_block(function, "ternary_then");
        let else_bb = self.context.append_basic_block(function, "ternary_else");
        let merge_bb = self.context.append_basic_block(function, "ternary_merge");
        self.builder.build_conditional_branch(cond_val, then_bb, else_bb).map_err(llvm_err)?;

        self.builder.position_at_end(then_bb);
        let then_val = self.lower_expr(tree, then_branch, function)?;
        let then_end_bb = self.builder.get_insert_block().expect("builder has an insertion point");
        self.builder.build_unconditional_branch(merge_bb).map_err(llvm_err)?;

        self.builder.position_at_end(else_bb);
        let else_val = self.lower_expr(tree, else_branch, function)?;
        let else_end_bb = self.builder.get_insert_block().expect("builder has an insertion point");
        self.builder.build_unconditional_branch(merge_bb).map_err(llvm_err)?;

        self.builder.position_at_end(merge_bb);
        let llvm_ty = self.type_mapper.map_to_basic(result_ty);
        let phi = self.builder.build_phi(llvm_ty, "ternary_result").map_err(llvm_err)?;
        phi.add_incoming(&[(&then_val as &dyn BasicValue, then_end_bb), (&else_val as &dyn BasicValue, else_end_bb)]);
        Ok(phi.as_basic_value())
    }

    fn lower_call(
        &mut self,
        tree: &SemanticTree,
        callee: ExprId,
        args: &[ExprId],
        function: FunctionValue<'ctx>,
    ) -> Result<BasicValueEnum<'ctx>> {
        let callee_id = match tree.exprs[callee] {
            Expr::Symbol { referent: Referent::Function(f), .. } => f,
            _ => unreachable!("the resolver only admits a function symbol as a call target"),
        };
        let callee_value = *self
            .functions
            .get(&callee_id)
            .ok_or_else(|| GenerationError::MissingFunction(tree.functions[callee_id].name.to_string()))?;
        let mut arg_values = Vec::with_capacity(args.len());
        for &arg in args {
            arg_values.push(self.lower_expr(tree, arg, function)?.into());
        }
        let call = self.builder.build_call(callee_value, &arg_values, "call").map_err(llvm_err)?;
        match call.try_as_basic_value().left() {
            Some(value) => Ok(value),
            // A void-returning call only ever appears as an
            // expression-statement, where the result is discarded.
            None => Ok(self.context.bool_type().const_int(0, false).into()),
        }
    }

    fn lower_cast(&self, value: BasicValueEnum<'ctx>, from: &Type, to: &Type) -> Result<BasicValueEnum<'ctx>> {
        let from = require_primitive(from)?;
        let to = require_primitive(to)?;
        if from.same_as(&to) {
            return Ok(value);
        }
        let target_llvm = self.type_mapper.map_primitive(&to);

        match (from.is_float, to.is_float) {
            // bool -> int / int -> int
            (false, false) if from.kind == PrimitiveKind::Bool => {
                Ok(self.builder.build_int_z_extend(value.into_int_value(), target_llvm.into_int_type(), "bool_to_int").map_err(llvm_err)?.into())
            }
            (false, false) if to.kind == PrimitiveKind::Bool => {
                let int_val = value.into_int_value();
                let zero = int_val.get_type().const_zero();
                Ok(self
                    .builder
                    .build_int_compare(IntPredicate::NE, int_val, zero, "int_to_bool")
                    .map_err(llvm_err)?
                    .into())
            }
            (false, false) => {
                let int_val = value.into_int_value();
                let target_int_ty = target_llvm.into_int_type();
                let result = if to.width > from.width {
                    if from.signed {
                        self.builder.build_int_s_extend(int_val, target_int_ty, "sext")
                    } else {
                        self.builder.build_int_z_extend(int_val, target_int_ty, "zext")
                    }
                } else if to.width < from.width {
                    self.builder.build_int_truncate(int_val, target_int_ty, "trunc")
                } else {
                    // Same width, differing signedness only: LLVM has no
                    // signed/unsigned distinction in its integer types.
                    return Ok(value);
                };
                Ok(result.map_err(llvm_err)?.into())
            }
            // bool -> float
            (false, true) if from.kind == PrimitiveKind::Bool => {
                let float_ty = target_llvm.into_float_type();
                let one = float_ty.const_float(1.0);
                let zero = float_ty.const_float(0.0);
                Ok(self.builder.build_select(value.into_int_value(), one, zero, "bool_to_float").map_err(llvm_err)?)
            }
            // int -> float
            (false, true) => {
                let int_val = value.into_int_value();
                let float_ty = target_llvm.into_float_type();
                let result = if from.signed {
                    self.builder.build_signed_int_to_float(int_val, float_ty, "sitofp")
                } else {
                    self.builder.build_unsigned_int_to_float(int_val, float_ty, "uitofp")
                };
                Ok(result.map_err(llvm_err)?.into())
            }
            // float -> bool
            (true, false) if to.kind == PrimitiveKind::Bool => {
                let float_val = value.into_float_value();
                let zero = float_val.get_type().const_zero();
                Ok(self
                    .builder
                    .build_float_compare(FloatPredicate::UNE, float_val, zero, "float_to_bool")
                    .map_err(llvm_err)?
                    .into())
            }
            // float -> int
            (true, false) => {
                let float_val = value.into_float_value();
                let int_ty = target_llvm.into_int_type();
                let result = if to.signed {
                    self.builder.build_float_to_signed_int(float_val, int_ty, "fptosi")
                } else {
                    self.builder.build_float_to_unsigned_int(float_val, int_ty, "fptoui")
                };
                Ok(result.map_err(llvm_err)?.into())
            }
            // float -> float
            (true, true) => {
                let float_val = value.into_float_value();
                let target_float_ty = target_llvm.into_float_type();
                let result = if to.width > from.width {
                    self.builder.build_float_ext(float_val, target_float_ty, "fpext")
                } else {
                    self.builder.build_float_trunc(float_val, target_float_ty, "fptrunc")
                };
                Ok(result.map_err(llvm_err)?.into())
            }
        }
    }

    // ---- post-pass ----

    /// Erases every instruction following a basic block's first terminator
    /// (spec.md §4.5 "Post-pass"): straight-line statement emission never
    /// checks whether the current block already terminated, so dead code
    /// after an early `return` accumulates past it and is trimmed here.
    ///
    /// Walks from the block's first instruction rather than relying on
    /// `BasicBlock::get_terminator` (which only reports whether the *last*
    /// instruction is a terminator): the unconditional trailing void return
    /// `emit_function_body` appends after a block that already ended in a
    /// real `return` would otherwise be mistaken for the block's only
    /// terminator, leaving the genuine return buried mid-block.
    fn trim_dead_instructions(&self, function: FunctionValue<'ctx>) {
        let mut block = function.get_first_basic_block();
        while let Some(bb) = block {
            let mut instr = bb.get_first_instruction();
            let mut seen_terminator = false;
            while let Some(current) = instr {
                let next = current.get_next_instruction();
                if seen_terminator {
                    unsafe {
                        current.erase_from_basic_block();
                    }
                } else if is_terminator_instruction(&current) {
                    seen_terminator = true;
                }
                instr = next;
            }
            block = bb.get_next_basic_block();
        }
    }

    fn run_function_passes(&self) {
        let pm = PassManager::create(&self.module);
        pm.add_instruction_combining_pass();
        pm.add_reassociate_pass();
        pm.add_gvn_pass();
        pm.add_cfg_simplification_pass();
        pm.add_aggressive_dce_pass();
        for function in self.functions.values() {
            pm.run_on(function);
        }
    }

    fn verify(&self, handler: &Handler) -> Result<()> {
        self.module.verify().map_err(|e| {
            let message = e.to_string();
            handler.error(codes::GEN_VERIFICATION_FAILED, Span::DUMMY, message.clone());
            GenerationError::VerificationFailed(message)
        })
    }
}

fn require_primitive(ty: &Type) -> Result<Primitive> {
    ty.as_primitive().copied().ok_or_else(|| GenerationError::MissingValue(format!("expected a primitive type, found {:?}", ty)))
}

fn zero_value(ty: inkwell::types::BasicTypeEnum<'_>) -> inkwell::values::BasicValueEnum<'_> {
    use inkwell::types::BasicTypeEnum;
    match ty {
        BasicTypeEnum::IntType(t) => t.const_zero().into(),
        BasicTypeEnum::FloatType(t) => t.const_zero().into(),
        other => other.const_zero(),
    }
}

fn llvm_err(message: inkwell::builder::BuilderError) -> GenerationError {
    GenerationError::MissingValue(message.to_string())
}

fn is_terminator_instruction(instr: &InstructionValue<'_>) -> bool {
    matches!(
        instr.get_opcode(),
        InstructionOpcode::Return
            | InstructionOpcode::Br
            | InstructionOpcode::Switch
            | InstructionOpcode::IndirectBr
            | InstructionOpcode::Invoke
            | InstructionOpcode::Unreachable
            | InstructionOpcode::CallBr
            | InstructionOpcode::CatchSwitch
            | InstructionOpcode::CatchRet
            | InstructionOpcode::CleanupRet
    )
}

/// Walks `block_id` and every statement nested in it, collecting every
/// local the function owns so the entry block can hoist allocation for
/// all of them up front (spec.md §4.5 "Functions": "Locals receive their
/// slot at the function's entry block").
fn collect_locals(tree: &SemanticTree, block_id: BlockId, out: &mut Vec<LocalId>) {
    let block = &tree.blocks[block_id];
    out.extend(block.locals.iter().copied());
    for &stmt_id in &block.stmts {
        collect_locals_from_stmt(tree, stmt_id, out);
    }
}

fn collect_locals_from_stmt(tree: &SemanticTree, stmt_id: StmtId, out: &mut Vec<LocalId>) {
    match &tree.stmts[stmt_id] {
        Stmt::Block(block_id) => collect_locals(tree, *block_id, out),
        Stmt::IfElse { then_branch, else_branch, .. } => {
            collect_locals_from_stmt(tree, *then_branch, out);
            if let Some(else_stmt) = else_branch {
                collect_locals_from_stmt(tree, *else_stmt, out);
            }
        }
        Stmt::While { body, .. } => collect_locals_from_stmt(tree, *body, out),
        Stmt::For { scope, body, .. } => {
            out.extend(scope.values().copied());
            collect_locals_from_stmt(tree, *body, out);
        }
        Stmt::Return { .. } | Stmt::ExpressionStmt { .. } | Stmt::LocalDecl { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::context::Context;

    fn build(source: &str) -> (SemanticTree, Handler) {
        let handler = Handler::new();
        let unit = vela_par::parse(source, &handler).expect("source must parse");
        let tree = vela_sem::lower_and_resolve(&unit, &handler).expect("source must resolve");
        (tree, handler)
    }

    #[test]
    fn emits_a_verified_module_for_a_constant_function() {
        let (tree, handler) = build("test(): int { return 42; }");
        let context = Context::create();
        let module = emit_module(&tree, &context, "test", &handler).expect("module must generate");
        assert!(module.get_function("test").is_some());
        assert!(!handler.has_errors());
    }

    #[test]
    fn emits_branching_control_flow() {
        let (tree, handler) = build("cmp(a:int, b:int): bool { return a >= b; }");
        let context = Context::create();
        let module = emit_module(&tree, &context, "test", &handler).expect("module must generate");
        assert!(module.get_function("cmp").is_some());
    }

    #[test]
    fn emits_a_while_loop_without_verification_errors() {
        let (tree, handler) = build("count(n: int): int { i: int = 0; while (i < n) { i = i + 1; } return i; }");
        let context = Context::create();
        let module = emit_module(&tree, &context, "test", &handler);
        assert!(module.is_ok());
    }

    #[test]
    fn emits_a_recursive_call() {
        let (tree, handler) = build("fib(n: int): int { return fib(n); }");
        let context = Context::create();
        let module = emit_module(&tree, &context, "test", &handler).expect("module must generate");
        assert!(module.get_function("fib").is_some());
    }
}
