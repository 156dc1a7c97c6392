//! Benchmarks for template analysis and deck generation.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slidecraft::{GenerationOptions, SlideContent, SlideType};

fn records(count: usize) -> Vec<SlideContent> {
    (0..count)
        .map(|i| {
            let slide_type = match i % 4 {
                0 => SlideType::Title,
                1 => SlideType::Content,
                2 => SlideType::Section,
                _ => SlideType::Conclusion,
            };
            SlideContent::new(slide_type, format!("Slide {} of the benchmark deck", i + 1))
                .with_content(
                    (0..6).map(|n| format!("Point {} with some text for benchmarking", n)),
                )
                .with_notes("Speaker notes")
        })
        .collect()
}

fn blank_template() -> Vec<u8> {
    slidecraft::pptx::defaults::blank_package().to_bytes().unwrap()
}

/// A template carrying `count` example slides.
fn populated_template(count: usize) -> Vec<u8> {
    let blank = blank_template();
    let profile = slidecraft::analyze_bytes(&blank).unwrap();
    slidecraft::generate(
        Some(blank.as_slice()),
        &records(count),
        &profile,
        &GenerationOptions::default(),
    )
    .unwrap()
    .into_bytes()
}

/// Benchmark template analysis at various example-slide counts.
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("template_analysis");

    for slide_count in [0, 10, 50, 200].iter() {
        let data = populated_template(*slide_count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("slides", slide_count), &data, |b, data| {
            b.iter(|| {
                let _ = slidecraft::analyze_bytes(black_box(data));
            });
        });
    }

    group.finish();
}

/// Benchmark deck generation at various record counts.
fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("deck_generation");
    let template = populated_template(5);
    let profile = slidecraft::analyze_bytes(&template).unwrap();
    let options = GenerationOptions::default();

    for record_count in [10, 50, 200].iter() {
        let records = records(*record_count);
        group.throughput(Throughput::Elements(*record_count as u64));
        group.bench_with_input(
            BenchmarkId::new("records", record_count),
            &records,
            |b, records| {
                b.iter(|| {
                    let _ = slidecraft::generate(
                        Some(black_box(template.as_slice())),
                        black_box(records),
                        &profile,
                        &options,
                    );
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the content preview.
fn bench_preview(c: &mut Criterion) {
    let profile = slidecraft::analyze_bytes(&blank_template()).unwrap();
    let records = records(200);
    c.bench_function("preview_200", |b| {
        b.iter(|| slidecraft::preview(black_box(&records), &profile));
    });
}

criterion_group!(benches, bench_analysis, bench_generation, bench_preview);
criterion_main!(benches);
