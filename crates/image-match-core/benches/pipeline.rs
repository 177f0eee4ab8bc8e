//! Benchmarks for descriptor extraction and matching.
//!
//! Run with: cargo bench -p image-match-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgb, RgbImage};
use image_match_core::descriptor::{HmmdImage, Quantizer, StructuralScanner};
use image_match_core::{Descriptor, DescriptorKind, DescriptorRecord, MatchLimit, TopKSelector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noise_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
}

fn benchmark_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    for (width, height) in [(256, 256), (1920, 1080)] {
        let img = noise_image(width, height, 7);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}")),
            &img,
            |b, img| b.iter(|| Descriptor::extract(black_box(img), DescriptorKind::Bin256)),
        );
    }
    group.finish();
}

fn benchmark_quantize_and_scan(c: &mut Criterion) {
    let hmmd = HmmdImage::from_rgb(&noise_image(256, 256, 11));

    let mut group = c.benchmark_group("quantize_scan");
    for kind in DescriptorKind::ALL {
        let quantizer = Quantizer::new(kind);
        let scanner = StructuralScanner::new(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &hmmd, |b, hmmd| {
            b.iter(|| scanner.scan(&quantizer.quantize(black_box(hmmd))))
        });
    }
    group.finish();
}

fn benchmark_topk(c: &mut Criterion) {
    let kind = DescriptorKind::Bin64;
    let mut rng = StdRng::seed_from_u64(42);
    let mut random_descriptor = || {
        let values = (0..kind.bins()).map(|_| rng.gen_range(0.0..1.0)).collect();
        Descriptor::new(kind, values).unwrap()
    };

    let query = random_descriptor();
    let records: Vec<DescriptorRecord> = (0..10_000)
        .map(|i| DescriptorRecord::new(format!("/data/{i:05}.png"), random_descriptor()))
        .collect();

    let mut group = c.benchmark_group("topk_10000");
    for limit in [MatchLimit::Count(10), MatchLimit::All] {
        let selector = TopKSelector::new(limit);
        group.bench_with_input(BenchmarkId::from_parameter(limit), &records, |b, records| {
            b.iter(|| selector.select(black_box(&query), records))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_extract,
    benchmark_quantize_and_scan,
    benchmark_topk,
);
criterion_main!(benches);
