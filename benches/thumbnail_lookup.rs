// SPDX-License-Identifier: MPL-2.0
//! Benchmarks for scrub preview lookups.
//!
//! Measures the performance of:
//! - Nearest-frame lookup in a fully populated cache
//! - Sampling and populating a cache for a new asset

use criterion::{criterion_group, criterion_main, Criterion};
use playscreen::engine::ImageHandle;
use playscreen::screen::thumbnails::{sample_times, ThumbnailCache};
use std::hint::black_box;

const ASSET_DURATION_SECS: f64 = 5_400.0;

fn populated_cache() -> ThumbnailCache {
    let frame = ImageHandle::solid(160, 90, [32, 32, 32, 255]);
    let mut cache = ThumbnailCache::default();
    for time_secs in sample_times(ASSET_DURATION_SECS) {
        cache.insert(time_secs, frame.clone());
    }
    cache
}

/// Benchmark nearest-frame lookup while dragging across the whole slider.
fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("thumbnail_lookup");
    let cache = populated_cache();

    group.bench_function("nearest_sweep", |b| {
        b.iter(|| {
            for step in 0..=1_000 {
                let target = ASSET_DURATION_SECS * f64::from(step) / 1_000.0;
                black_box(cache.nearest(black_box(target)));
            }
        });
    });

    group.bench_function("nearest_between_frames", |b| {
        b.iter(|| black_box(cache.nearest(black_box(1_234.5))));
    });

    group.finish();
}

/// Benchmark sampling and filling a cache for a new asset.
fn bench_populate(c: &mut Criterion) {
    let mut group = c.benchmark_group("thumbnail_lookup");

    group.bench_function("populate", |b| {
        b.iter(|| black_box(populated_cache()));
    });

    group.finish();
}

criterion_group!(benches, bench_nearest, bench_populate);
criterion_main!(benches);
