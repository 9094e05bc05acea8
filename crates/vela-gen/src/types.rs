//! Type mapping from the semantic type system to LLVM IR types, per
//! spec.md §4.5 "Types": primitives map to integer/float types of the
//! recorded width, `bool` maps to `i1`; signedness never appears in an LLVM
//! type, only in the opcode chosen at each use site.

use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, BasicTypeEnum, FunctionType};

use vela_sem::types::{Primitive, PrimitiveKind, Type};

pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self { context }
    }

    pub fn map_primitive(&self, primitive: &Primitive) -> BasicTypeEnum<'ctx> {
        match primitive.kind {
            PrimitiveKind::Bool => self.context.bool_type().into(),
            PrimitiveKind::Byte => self.context.i8_type().into(),
            PrimitiveKind::Char => self.context.i8_type().into(),
            PrimitiveKind::Short => self.context.i16_type().into(),
            PrimitiveKind::Int => self.context.i32_type().into(),
            PrimitiveKind::Long => self.context.i64_type().into(),
            PrimitiveKind::Float => self.context.f32_type().into(),
            PrimitiveKind::Double => self.context.f64_type().into(),
        }
    }

    /// Maps a fully resolved expression/declaration type to its LLVM basic
    /// type. `Type::String` has no basic-type representation yet (no
    /// string-literal codegen is wired up - see `IrEmitter::lower_expr`'s
    /// `StringLiteral` arm), so it is unreachable from any lowered site
    /// this emitter actually visits.
    pub fn map_to_basic(&self, ty: &Type) -> BasicTypeEnum<'ctx> {
        match ty {
            Type::Primitive(p) => self.map_primitive(p),
            other => unreachable!("no basic-type representation for a resolved {:?}", other),
        }
    }

    /// Maps a function's parameter/return types to an LLVM function type.
    /// `Type::Void` return maps to LLVM's `void`, which has no
    /// `BasicTypeEnum`, hence the separate `fn_type` entry point here
    /// rather than routing through `map_to_basic`.
    pub fn function_type(&self, params: &[Type], return_type: &Type) -> FunctionType<'ctx> {
        let param_types: Vec<BasicMetadataTypeEnum> = params.iter().map(|p| self.map_to_basic(p).into()).collect();
        match return_type {
            Type::Void => self.context.void_type().fn_type(&param_types, false),
            other => self.map_to_basic(other).fn_type(&param_types, false),
        }
    }
}
