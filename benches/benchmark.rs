//! Performance benchmarks for TrackPrep
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use track_prep::core::{resolve, FocusWindow, Strand, ViewWindow};

/// Build view/focus sources with `n` regions; every other view is too wide
fn synthetic_sources(n: usize) -> (String, String) {
    let mut views = String::with_capacity(n * 40);
    let mut foci = String::with_capacity(n * 32);
    for i in 0..n {
        let start = (i as u64) * 100_000;
        let width = if i % 2 == 0 { 5_000 } else { 80_000 };
        let strand = if i % 3 == 0 { '-' } else { '+' };
        views.push_str(&format!(
            "chr{}\t{}\t{}\tregion{}\t0\t{}\n",
            i % 22 + 1,
            start,
            start + width,
            i,
            strand
        ));
        foci.push_str(&format!(
            "chr{}\t{}\t{}\tregion{}\n",
            i % 22 + 1,
            start + 1_000,
            start + 1_200,
            i
        ));
    }
    (views, foci)
}

/// Benchmark the two-pass resolve over increasing region counts
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for size in [100, 1_000, 10_000].iter() {
        let (views, foci) = synthetic_sources(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let res = resolve(
                    black_box(views.as_bytes()),
                    black_box(foci.as_bytes()),
                    black_box(10_000),
                )
                .unwrap();
                black_box(res)
            })
        });
    }

    group.finish();
}

/// Benchmark a single clamp
fn bench_clamp(c: &mut Criterion) {
    let view = ViewWindow::new("chr1", 200, 9_000_000, Strand::Minus);
    let focus = FocusWindow::new(4_000_000, 4_000_100);

    c.bench_function("clamp_single", |b| {
        b.iter(|| black_box(&view).clamp_to_focus(black_box(&focus), black_box(1_000)))
    });
}

criterion_group!(benches, bench_resolve, bench_clamp);
criterion_main!(benches);
