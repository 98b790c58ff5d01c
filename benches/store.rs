use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use subtiwiki::{AssociationStore, Dataset};

fn build_store_benchmark(c: &mut Criterion) {
    let bytes = Dataset::from_source_tables("tests/data")
        .expect("fixture tables must be valid")
        .as_bytes();

    c.bench_function("parse source tables", |b| {
        b.iter(|| {
            Dataset::from_source_tables(black_box("tests/data"))
                .expect("fixture tables must be valid")
                .associations()
                .len()
        })
    });

    c.bench_function("build store from bytes", |b| {
        b.iter(|| {
            AssociationStore::new(
                Dataset::from_bytes(black_box(&bytes[..])).expect("requires valid bytes"),
            )
            .all_genes()
            .len()
        })
    });
}

criterion_group! {
    name = store;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(10));
    targets = build_store_benchmark
}
criterion_main!(store);
