use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vela_lex::tokenize;
use vela_util::Handler;

fn token_count(source: &str) -> usize {
    let handler = Handler::new();
    tokenize(source, &handler).len()
}

fn bench_lexer_declarations(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let source = "increment(i:int):int { return i + 1; }";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("simple_function", |b| b.iter(|| token_count(black_box(source))));

    group.finish();
}

fn bench_lexer_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_complex");

    let source = r#"
        module demo;

        namespace math {
            fibonacci(n:int):int {
                if (n <= 1) {
                    return n;
                }
                return fibonacci(n - 1) + fibonacci(n - 2);
            }
        }

        public:
        origin_x:int = 0;
        origin_y:int = 0;
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("complex_unit", |b| b.iter(|| token_count(black_box(source))));

    group.finish();
}

fn bench_lexer_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_strings");

    group.bench_function("short_string", |b| b.iter(|| token_count(black_box("\"hello\""))));

    group.bench_function("long_string", |b| {
        let source = "\"This is a longer string literal used for benchmarking purposes.\"";
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_numbers");

    group.bench_function("integer", |b| b.iter(|| token_count(black_box("123456"))));
    group.bench_function("float", |b| b.iter(|| token_count(black_box("3.14159"))));
    group.bench_function("hex", |b| b.iter(|| token_count(black_box("0xDEADBEEF"))));
    group.bench_function("suffixed", |b| b.iter(|| token_count(black_box("42ull"))));

    group.finish();
}

fn bench_lexer_operator_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_operators");

    group.bench_function("shift_assign", |b| b.iter(|| token_count(black_box("a <<= b >>= c;"))));
    group.bench_function("comparison_chain", |b| {
        b.iter(|| token_count(black_box("a >= b && c <= d || e == f;")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_declarations,
    bench_lexer_complex,
    bench_lexer_strings,
    bench_lexer_numbers,
    bench_lexer_operator_runs
);
criterion_main!(benches);
