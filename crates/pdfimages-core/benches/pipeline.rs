//! Benchmarks for the pdfimages extraction pipeline.
//!
//! Run with: cargo bench -p pdfimages-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use pdfimages_core::config::OutputFormat;
use pdfimages_core::pipeline::{
    Deduplicator, Fingerprinter, SegmentOptions, Transformer,
};
use pdfimages_core::{DedupConfig, ExtractedImage, ImageOrigin};
use std::path::PathBuf;

fn pattern(seed: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(256, 256, |x, y| {
        let v = ((x * (seed % 7 + 1) + y * 3 + seed * 17) % 256) as u8;
        Rgb([v, 255 - v, v / 2])
    }))
}

fn extracted(fp: &Fingerprinter, index: u32, image: DynamicImage) -> ExtractedImage {
    ExtractedImage {
        source_pdf: PathBuf::from("bench.pdf"),
        page: index / 4 + 1,
        index: index % 4,
        width: image.width(),
        height: image.height(),
        byte_size: 65_536,
        origin: ImageOrigin::PageImage,
        fingerprint: fp.fingerprint(&image),
        image,
        encoded: None,
    }
}

fn benchmark_fingerprint(c: &mut Criterion) {
    let fp = Fingerprinter::new();
    let img = pattern(1);

    c.bench_function("fingerprint_256px", |b| {
        b.iter(|| {
            let _ = fp.fingerprint(black_box(&img));
        })
    });
}

fn benchmark_dedup(c: &mut Criterion) {
    let fp = Fingerprinter::new();
    let images: Vec<_> = (0..64).map(|i| extracted(&fp, i, pattern(i % 16))).collect();
    let dedup = Deduplicator::new(DedupConfig::default());

    c.bench_function("dedup_64_images", |b| {
        b.iter(|| {
            let _ = dedup.run(black_box(images.clone()));
        })
    });
}

fn benchmark_segment(c: &mut Criterion) {
    let mut page = RgbImage::from_pixel(1275, 1650, Rgb([255, 255, 255]));
    for (bx, by, bw, bh) in [(100, 100, 500, 400), (700, 900, 400, 500)] {
        for y in by..by + bh {
            for x in bx..bx + bw {
                page.put_pixel(x, y, Rgb([40, 80, 120]));
            }
        }
    }
    let page = DynamicImage::ImageRgb8(page);
    let options = SegmentOptions::from_dpi(150);

    c.bench_function("segment_letter_page_150dpi", |b| {
        b.iter(|| {
            let _ = pdfimages_core::pipeline::segment::find_regions(black_box(&page), &options);
        })
    });
}

fn benchmark_transform(c: &mut Criterion) {
    let img = DynamicImage::new_rgb8(1920, 1080);
    let transformer = Transformer::new(0.5, 85, OutputFormat::Jpg);

    c.bench_function("transform_half_jpeg", |b| {
        b.iter(|| {
            let scaled = transformer.scale(black_box(&img));
            let _ = transformer.encode(&scaled);
        })
    });
}

criterion_group!(
    benches,
    benchmark_fingerprint,
    benchmark_dedup,
    benchmark_segment,
    benchmark_transform,
);
criterion_main!(benches);
