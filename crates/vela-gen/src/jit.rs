//! A thin wrapper around `inkwell`'s JIT `ExecutionEngine`, per spec.md
//! §4.5 "JIT adapter". The original contract describes an ORC execution
//! session, object linking layer, IR compile layer, and main dylib
//! explicitly; `inkwell::execution_engine::ExecutionEngine` is backed by
//! exactly that ORC stack internally and exposes it as a single handle, so
//! this wrapper owns one `ExecutionEngine` rather than assembling the ORC
//! layers by hand (see DESIGN.md for the Open Question resolution).

use std::sync::Once;

use inkwell::execution_engine::{ExecutionEngine, JitFunction};
use inkwell::module::Module;
use inkwell::targets::{InitializationConfig, Target};
use inkwell::OptimizationLevel;

use crate::error::{GenerationError, Result};

static NATIVE_TARGET_INIT: Once = Once::new();

/// `inkwell`'s JIT execution engine needs the host's native target
/// initialized exactly once per process before the first
/// `create_jit_execution_engine` call; later calls are then free to create
/// as many engines as needed.
fn ensure_native_target() {
    NATIVE_TARGET_INIT.call_once(|| {
        Target::initialize_native(&InitializationConfig::default())
            .expect("failed to initialize native target for JIT");
    });
}

/// Owns one JIT-ed module's execution engine. `add_module` attaches a
/// verified, optimized module (spec.md: "attaches an IR module under a
/// resource tracker" - `inkwell` has no separate resource-tracker handle,
/// the `ExecutionEngine` itself owns the module for its lifetime).
/// `lookup` returns an executable address, here typed directly via the
/// caller's function-pointer signature `F` rather than an untyped address,
/// since `inkwell::JitFunction` already carries that typing safely.
pub struct Jit<'ctx> {
    engine: ExecutionEngine<'ctx>,
}

impl<'ctx> Jit<'ctx> {
    /// Creates a JIT engine with the module already attached, at the
    /// given `inkwell::OptimizationLevel` (the post-pass in `emit_module`
    /// already ran the function pass manager, so `None` is the usual
    /// choice here - re-optimizing at JIT time would be redundant).
    pub fn new(module: Module<'ctx>, opt_level: OptimizationLevel) -> Result<Self> {
        ensure_native_target();
        let engine = module
            .create_jit_execution_engine(opt_level)
            .map_err(|e| GenerationError::JitSetup(e.to_string()))?;
        Ok(Self { engine })
    }

    /// Looks up `name` and returns it typed as `F`, a `fn(...) -> ...`
    /// pointer signature.
    ///
    /// # Safety
    /// The caller must supply a signature `F` matching the actual LLVM
    /// function's calling convention and argument/return types; a
    /// mismatch is undefined behavior, exactly as with `dlsym` + a cast.
    pub unsafe fn lookup<F>(&self, name: &str) -> Result<JitFunction<'ctx, F>>
    where
        F: inkwell::execution_engine::UnsafeFunctionPointer,
    {
        self.engine.get_function(name).map_err(|_| GenerationError::JitLookup(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::context::Context;
    use vela_util::Handler;

    fn build_module<'ctx>(source: &str, context: &'ctx Context) -> Module<'ctx> {
        let handler = Handler::new();
        let unit = vela_par::parse(source, &handler).expect("source must parse");
        let tree = vela_sem::lower_and_resolve(&unit, &handler).expect("source must resolve");
        crate::emit_module(&tree, context, "test", &handler).expect("module must generate")
    }

    #[test]
    fn jit_executes_a_constant_function() {
        let context = Context::create();
        let module = build_module("test(): int { return 42; }", &context);
        let jit = Jit::new(module, OptimizationLevel::None).expect("jit setup must succeed");
        unsafe {
            let f: JitFunction<unsafe extern "C" fn() -> i32> =
                jit.lookup("test").expect("function must be found");
            assert_eq!(f.call(), 42);
        }
    }

    #[test]
    fn jit_executes_a_function_taking_an_argument() {
        let context = Context::create();
        let module = build_module("increment(i: int): int { return i + 1; }", &context);
        let jit = Jit::new(module, OptimizationLevel::None).expect("jit setup must succeed");
        unsafe {
            let f: JitFunction<unsafe extern "C" fn(i32) -> i32> =
                jit.lookup("increment").expect("function must be found");
            assert_eq!(f.call(41), 42);
        }
    }

    #[test]
    fn lookup_of_missing_function_fails() {
        let context = Context::create();
        let module = build_module("test(): int { return 42; }", &context);
        let jit = Jit::new(module, OptimizationLevel::None).expect("jit setup must succeed");
        unsafe {
            let result = jit.lookup::<unsafe extern "C" fn() -> i32>("missing");
            assert!(result.is_err());
        }
    }
}
