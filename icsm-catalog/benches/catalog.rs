//! Benchmarks de construction et de résolution du catalogue

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use icsm_catalog::{Adjacency, Catalog, Registry, Resolver};

fn bench_build(c: &mut Criterion) {
    let registry = Registry::australian();
    let adjacency = Adjacency::australian();

    c.bench_function("build_australian_catalog", |b| {
        b.iter(|| Catalog::build(black_box(&registry), black_box(&adjacency)))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let catalog = Arc::new(Catalog::australian().expect("catalog"));
    let mut resolver = Resolver::new(catalog);

    c.bench_function("resolve_and_describe", |b| {
        b.iter(|| {
            let _ = resolver.select_source_crs(black_box("EPSG:28356"));
            black_box(resolver.describe_selected())
        })
    });
}

criterion_group!(benches, bench_build, bench_resolve);
criterion_main!(benches);
