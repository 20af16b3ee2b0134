use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lineserve::{LineLookup, OffsetCache};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::{BufWriter, Write};
use tempfile::NamedTempFile;
use tokio::runtime::Runtime;

const LINES: u64 = 500_000;

fn create_test_file(lines: u64) -> NamedTempFile {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let mut writer = BufWriter::new(temp_file.reopen().unwrap());
    for i in 0..lines {
        writeln!(
            writer,
            "[2024-09-02T10:{:02}:{:02}] INFO: Request {} user_{}",
            (i / 60) % 60,
            i % 60,
            i,
            i % 1000
        )
        .unwrap();
    }
    writer.flush().unwrap();
    temp_file
}

fn bench_cache_build(c: &mut Criterion) {
    let temp_file = create_test_file(LINES);
    let mut group = c.benchmark_group("cache_build");
    group.sample_size(10);

    for &capacity in &[1_000usize, 100_000, 1_048_576] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let mut rng = ChaCha8Rng::seed_from_u64(0);
                    let cache =
                        OffsetCache::build_with_rng(temp_file.path(), capacity, &mut rng).unwrap();
                    black_box(cache.anchors().len());
                });
            },
        );
    }
    group.finish();
}

fn bench_random_lookup(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let temp_file = create_test_file(LINES);
    let mut group = c.benchmark_group("random_lookup");

    for &capacity in &[1_000usize, 10_000, 100_000] {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let cache = OffsetCache::build_with_rng(temp_file.path(), capacity, &mut rng).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(capacity), &cache, |b, cache| {
            let mut rng = ChaCha8Rng::seed_from_u64(2);
            b.to_async(&rt).iter(|| {
                let n = rng.gen_range(1..=LINES as i64);
                async move { black_box(cache.lookup(n).await.unwrap()) }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cache_build, bench_random_lookup);
criterion_main!(benches);
