use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tapevm::{assemble, optimize, Executor, VmConfig};

/// Nested multiplication loops; the inner loops are linear
const SOURCE: &str = "++++++++[>++++++++[>++++++++[>+>++<<-]<-]<-]>>>.";

fn assemble_benchmark(c: &mut Criterion) {
    c.bench_function("assemble nested loops", |b| {
        b.iter(|| assemble(black_box(SOURCE.as_bytes())).unwrap())
    });
}

fn execution_benchmark(c: &mut Criterion) {
    let raw = assemble(SOURCE.as_bytes()).unwrap();
    let optimized = optimize(raw.clone()).program;
    let config = VmConfig::default();

    c.bench_function("execute raw", |b| {
        b.iter(|| {
            Executor::new(black_box(&raw), &config, std::iter::empty(), Vec::new())
                .run()
                .unwrap()
        })
    });

    c.bench_function("execute optimized", |b| {
        b.iter(|| {
            Executor::new(black_box(&optimized), &config, std::iter::empty(), Vec::new())
                .run()
                .unwrap()
        })
    });
}

criterion_group!(benches, assemble_benchmark, execution_benchmark);
criterion_main!(benches);
