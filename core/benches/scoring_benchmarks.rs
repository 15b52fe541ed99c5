//! Scoring Benchmarks
//!
//! The composite scorer runs once per candidate, so it should stay well under
//! a millisecond even against a sizeable corpus pool.
//!
//! Run with: `cargo bench --bench scoring_benchmarks`

#![allow(missing_docs)] // Benchmarks don't need extensive docs

use copy_refinery_core::metrics;
use copy_refinery_core::{CompositeScorer, CorpusPool, KeywordSet};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const DESCRIPTION: &str = "Meet the wireless mouse built for long workdays.\n\n\
Key features:\n\
- Ergonomic design that supports a natural hand position\n\
- Silent clicks, so calls and libraries stay quiet\n\
- 2.4GHz connectivity with a tiny USB receiver\n\n\
Office workers get precise tracking, all-day comfort, and a battery that lasts for months. \
Slip it into a laptop bag, plug in the receiver, and get straight back to work.";

fn corpus(size: usize) -> CorpusPool {
    (0..size)
        .map(|i| format!("Product copy number {i} with a wireless mouse, quiet clicks, and a sleek shell."))
        .collect()
}

fn benchmark_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    group.throughput(Throughput::Elements(1));
    let keywords = KeywordSet::new(["wireless mouse", "ergonomic design", "silent clicks"]);
    let curve = metrics::KeywordDensityCurve::default();

    group.bench_function("keyword", |b| {
        b.iter(|| black_box(metrics::keyword_score(black_box(DESCRIPTION), &keywords, &curve)));
    });
    group.bench_function("readability", |b| {
        b.iter(|| black_box(metrics::readability_score(black_box(DESCRIPTION))));
    });
    group.bench_function("structure", |b| {
        b.iter(|| black_box(metrics::structure_score(black_box(DESCRIPTION))));
    });

    group.finish();
}

fn benchmark_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite_scorer");
    let scorer = CompositeScorer::default();
    let keywords = KeywordSet::new(["wireless mouse", "ergonomic design", "silent clicks"]);

    for size in [0_usize, 10, 100] {
        let pool = corpus(size);
        group.bench_with_input(BenchmarkId::new("corpus", size), &pool, |b, pool| {
            b.iter(|| black_box(scorer.score_description(black_box(DESCRIPTION), &keywords, pool)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_metrics, benchmark_composite);
criterion_main!(benches);
