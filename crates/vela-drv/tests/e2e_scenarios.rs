//! End-to-end JIT scenarios from spec.md §8, each compiling source text
//! through the full pipeline (lex → parse → lower → resolve → emit →
//! JIT) and invoking the compiled function, asserting on the returned
//! value - the shape `faxc-drv`'s `integration_test.rs` exercises, minus
//! the CLI layer this crate has no non-goal-violating need for.

use inkwell::context::Context;
use inkwell::execution_engine::JitFunction;
use inkwell::OptimizationLevel;
use vela_drv::compile_to_module;
use vela_gen::Jit;
use vela_util::Handler;

fn jit_for<'ctx>(source: &str, context: &'ctx Context) -> Jit<'ctx> {
    let handler = Handler::new();
    let module =
        compile_to_module(source, "scenario", context, &handler).expect("pipeline must compile without error");
    assert!(!handler.has_errors(), "diagnostics: {:?}", handler.diagnostics());
    Jit::new(module, OptimizationLevel::None).expect("jit engine must be created")
}

#[test]
fn scenario_1_constant_return() {
    let context = Context::create();
    let jit = jit_for("test(): int { return 42; }", &context);
    unsafe {
        let f: JitFunction<unsafe extern "C" fn() -> i32> = jit.lookup("test").unwrap();
        assert_eq!(f.call(), 42);
    }
}

#[test]
fn scenario_2_increment() {
    let context = Context::create();
    let jit = jit_for("increment(i: int): int { return i + 1; }", &context);
    unsafe {
        let f: JitFunction<unsafe extern "C" fn(i32) -> i32> = jit.lookup("increment").unwrap();
        assert_eq!(f.call(41), 42);
    }
}

#[test]
fn scenario_3_multiply() {
    let context = Context::create();
    let jit = jit_for("multiply(a: int, b: int): int { return a * b; }", &context);
    unsafe {
        let f: JitFunction<unsafe extern "C" fn(i32, i32) -> i32> = jit.lookup("multiply").unwrap();
        assert_eq!(f.call(2, 3), 6);
    }
}

#[test]
fn scenario_4_signed_division() {
    let context = Context::create();
    let jit = jit_for("div(a: int, b: int): int { return a / b; }", &context);
    unsafe {
        let f: JitFunction<unsafe extern "C" fn(i32, i32) -> i32> = jit.lookup("div").unwrap();
        assert_eq!(f.call(-6, 2), -3);
    }
}

#[test]
fn scenario_4_unsigned_division_uses_unsigned_opcode() {
    let context = Context::create();
    let jit = jit_for(
        "div(a: unsigned int, b: unsigned int): unsigned int { return a / b; }",
        &context,
    );
    unsafe {
        let f: JitFunction<unsafe extern "C" fn(u32, u32) -> u32> = jit.lookup("div").unwrap();
        // Same bit pattern as scenario 4's -6, but read as udiv: a
        // colossal unsigned dividend divided by 2 truncates down, unlike
        // the signed -3 result above - proving the opcode is udiv, not
        // sdiv, for an unsigned-qualified parameter pair.
        assert_eq!(f.call((-6i32) as u32, 2), ((-6i32) as u32) / 2);
    }
}

#[test]
fn scenario_5_bitwise_and() {
    let context = Context::create();
    let jit = jit_for("and(a: byte, b: byte): byte { return a & b; }", &context);
    unsafe {
        let f: JitFunction<unsafe extern "C" fn(u8, u8) -> u8> = jit.lookup("and").unwrap();
        assert_eq!(f.call(5, 3), 1);
    }
}

#[test]
fn scenario_6_comparison() {
    let context = Context::create();
    let jit = jit_for("cmp(a: int, b: int): bool { return a >= b; }", &context);
    unsafe {
        let f: JitFunction<unsafe extern "C" fn(i32, i32) -> bool> = jit.lookup("cmp").unwrap();
        assert!(f.call(3, 3));
        assert!(!f.call(2, 3));
    }
}
