use criterion::{criterion_group, criterion_main, Criterion};
use blogverse_store::policy::{prune, reduce};
use blogverse_store::{codec, BoundedStore, MemoryMedium, SaveOptions, StoreConfig};
use serde_json::{json, Value};
use std::hint::black_box;

fn posts(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                json!({
                    "id": format!("post-{i}"),
                    "title": "Designing for a 5MB ceiling",
                    "content": "Local storage is small and unforgiving. ".repeat(60),
                    "createdAt": 1_700_000_000_000i64 + (i as i64 * 7_919 % 1_000) * 1_000,
                })
            })
            .collect(),
    )
}

fn bench_save_primary(c: &mut Criterion) {
    let store = BoundedStore::new(MemoryMedium::unbounded(), StoreConfig::default());
    let catalog = posts(50);

    c.bench_function("save_primary_50_posts", |b| {
        b.iter(|| black_box(store.save_primary("blogverse_blogs", black_box(&catalog))))
    });
}

fn bench_load(c: &mut Criterion) {
    let store = BoundedStore::new(MemoryMedium::unbounded(), StoreConfig::default());
    store.save_primary("blogverse_blogs", &posts(50));

    c.bench_function("load_50_posts", |b| {
        b.iter(|| black_box(store.load("blogverse_blogs", Value::Null)))
    });
}

fn bench_quota_recovery(c: &mut Criterion) {
    let catalog = posts(100);

    c.bench_function("save_with_quota_recovery_100_posts", |b| {
        b.iter(|| {
            // Too small for the full catalog, large enough for the reduced one
            let store = BoundedStore::new(MemoryMedium::with_quota(64 * 1024), StoreConfig::default());
            black_box(store.save_with_report("blogverse_posts", &catalog, &SaveOptions::plain()))
        })
    });
}

fn bench_codec(c: &mut Criterion) {
    let json = serde_json::to_vec(&posts(50)).unwrap();
    let encoded = codec::encode(json.clone(), true);

    c.bench_function("encode_lz4_50_posts", |b| {
        b.iter(|| black_box(codec::encode(black_box(json.clone()), true)))
    });
    c.bench_function("decode_lz4_50_posts", |b| {
        b.iter(|| black_box(codec::decode(black_box(&encoded)).unwrap().len()))
    });
}

fn bench_policies(c: &mut Criterion) {
    let catalog = posts(200);

    c.bench_function("reduce_200_posts", |b| {
        b.iter(|| {
            let mut value = catalog.clone();
            black_box(reduce(&mut value, 1000))
        })
    });
    c.bench_function("prune_200_posts_to_50", |b| {
        b.iter(|| {
            let mut value = catalog.clone();
            black_box(prune(&mut value, 50))
        })
    });
}

criterion_group!(
    benches,
    bench_save_primary,
    bench_load,
    bench_quota_recovery,
    bench_codec,
    bench_policies,
);
criterion_main!(benches);
