//! Benchmarks for unlayout pipeline performance.
//!
//! Run with: cargo bench
//!
//! Documents are synthetic two-column pages with a running header and
//! footer, a few headings and a figure with its caption.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unlayout::{PipelineOptions, RawElement};

const LINE_HEIGHT: f32 = 0.0144;

/// Creates a synthetic document with the given number of pages.
fn create_test_document(page_count: u32) -> Vec<RawElement> {
    let mut elements = Vec::new();

    for page in 1..=page_count {
        elements.push(RawElement::new(page, [0.35, 0.02, 0.65, 0.035], "text", "Benchmark Journal"));
        elements.push(RawElement::new(
            page,
            [0.45, 0.95, 0.55, 0.965],
            "text",
            format!("{}", page),
        ));
        elements.push(RawElement::new(
            page,
            [0.08, 0.06, 0.38, 0.085],
            "section_header",
            format!("Chapter {}", page),
        ));

        for (column, x0) in [0.08f32, 0.54].iter().enumerate() {
            let x1 = x0 + 0.38;
            let mut y = 0.1;
            for i in 0..8 {
                let text = format!(
                    "Page {} column {} paragraph {} describes the measurements taken. ",
                    page, column, i
                )
                .repeat(6);
                elements.push(RawElement::new(page, [*x0, y, x1, y + 5.0 * LINE_HEIGHT], "text", text));
                y += 5.0 * LINE_HEIGHT + 0.012;
            }
        }

        elements.push(RawElement::new(page, [0.54, 0.72, 0.92, 0.8], "figure", ""));
        elements.push(RawElement::new(
            page,
            [0.54, 0.805, 0.92, 0.82],
            "text",
            format!("Figure {}: Measured values", page),
        ));
    }

    elements
}

/// Benchmark the full pipeline at various sizes.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for page_count in [1, 10, 50].iter() {
        let doc = create_test_document(*page_count);

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| unlayout::build_tree(black_box(&doc)));
        });
    }

    group.finish();
}

/// Benchmark column detection on its own.
fn bench_column_detection(c: &mut Criterion) {
    let doc = create_test_document(1);
    let (elements, _) = unlayout::pipeline::ingest(&doc);
    let boxes: Vec<unlayout::BoundingBox> = elements.iter().map(|e| e.bbox).collect();
    let thresholds = unlayout::Thresholds::default();

    c.bench_function("detect_columns", |b| {
        b.iter(|| unlayout::pipeline::detect_columns(1, black_box(&boxes), &thresholds));
    });
}

/// Benchmark a batch of documents, sequential and on the Rayon pool.
fn bench_batch(c: &mut Criterion) {
    let docs: Vec<Vec<RawElement>> = (0..16).map(|_| create_test_document(5)).collect();
    let mut group = c.benchmark_group("batch");

    group.bench_function("sequential", |b| {
        let options = PipelineOptions::new().sequential();
        b.iter(|| unlayout::build_trees_parallel(black_box(&docs), &options));
    });

    group.bench_function("parallel", |b| {
        let options = PipelineOptions::new();
        b.iter(|| unlayout::build_trees_parallel(black_box(&docs), &options));
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_column_detection, bench_batch);
criterion_main!(benches);
