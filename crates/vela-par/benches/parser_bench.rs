use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vela_util::Handler;

fn parse_unit(source: &str) -> usize {
    let handler = Handler::new();
    vela_par::parse(black_box(source), &handler).map(|u| u.declarations.len()).unwrap_or(0)
}

fn bench_parser_function(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let source = "increment(i:int):int { return i + 1; }";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("simple_function", |b| b.iter(|| parse_unit(source)));

    group.finish();
}

fn bench_parser_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_complex");

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
    group.bench_function("complex_unit", |b| b.iter(|| parse_unit(source)));

    group.finish();
}

fn bench_parser_expression_ladder(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_expr");

    let source = "f(): int { return a + b * c - d / e % f << g & h | i ^ j && k || l ? m : n; }";
    group.bench_function("full_precedence_ladder", |b| b.iter(|| parse_unit(source)));

    group.finish();
}

criterion_group!(benches, bench_parser_function, bench_parser_complex, bench_parser_expression_ladder);
criterion_main!(benches);
