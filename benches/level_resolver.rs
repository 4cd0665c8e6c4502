use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lunaris::progression::LevelResolver;

fn bench_level_for(c: &mut Criterion) {
    let resolver = LevelResolver::default();
    c.bench_function("level_for", |b| {
        b.iter(|| {
            for exp in (0..10_000u64).step_by(37) {
                black_box(resolver.level_for(black_box(exp)));
            }
        })
    });
}

fn bench_progress_for(c: &mut Criterion) {
    let resolver = LevelResolver::default();
    c.bench_function("progress_for", |b| b.iter(|| resolver.progress_for(black_box(3_333))));
}

criterion_group!(benches, bench_level_for, bench_progress_for);
criterion_main!(benches);
