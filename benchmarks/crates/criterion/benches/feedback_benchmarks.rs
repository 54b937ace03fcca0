//! Benchmarks for the local stages of a feedback submission.
#![allow(
    missing_docs,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::tests_outside_test_module,
    reason = "Test allows"
)]

use std::hint::black_box;
use std::sync::Arc;

use critic_core::conformance::check;
use critic_core::{
    FeedbackGenerator, FeedbackRequest, FeedbackService, ModelBackend, RawFeedbackRequest,
    SchemaVariant, render_prompt, validate,
};
use critic_providers::{MockBackend, sample_output};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use tokio::runtime::Runtime;

/// Helper to create runtime or panic (benchmarks expect setup to succeed)
fn create_runtime() -> Runtime {
    Runtime::new().unwrap_or_else(|err| panic!("Failed to create runtime: {err}"))
}

/// A snippet of roughly `lines` lines of JavaScript.
fn snippet(lines: usize) -> String {
    (0..lines)
        .map(|idx| format!("const value{idx} = items.filter((item) => item.id === {idx});\n"))
        .collect()
}

fn validated(lines: usize) -> FeedbackRequest {
    validate(
        &RawFeedbackRequest::new(snippet(lines), "javascript", "intermediate")
            .with_coding_style("functional, small helpers"),
    )
    .unwrap_or_else(|err| panic!("Benchmark input rejected: {err}"))
}

/// Benchmark request validation
fn bench_validate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("validate");

    for lines in [5, 50, 500] {
        let raw = RawFeedbackRequest::new(snippet(lines), "JavaScript", " Beginner ");
        group.throughput(Throughput::Bytes(raw.code.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &raw, |bencher, raw| {
            bencher.iter(|| validate(black_box(raw)));
        });
    }

    group.finish();
}

/// Benchmark prompt rendering for both result variants
fn bench_render_prompt(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("render_prompt");

    for lines in [5, 500] {
        let request = validated(lines);
        for variant in [SchemaVariant::Standard, SchemaVariant::Extended] {
            group.bench_with_input(
                BenchmarkId::new(format!("{variant:?}"), lines),
                &request,
                |bencher, request| {
                    bencher.iter(|| render_prompt(black_box(request), variant));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark the conformance check on accepted and rejected outputs
fn bench_conformance(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("conformance");

    let mut bulleted = sample_output();
    bulleted["feedback"] = json!("- Name the filter.\n- Hoist the repeated lookup.\n- Add a test.");
    let mut missing = sample_output();
    if let Some(fields) = missing.as_object_mut() {
        fields.remove("maintainability");
    }

    let cases = [
        ("list_feedback", sample_output()),
        ("bulleted_feedback", bulleted),
        ("missing_score", missing),
    ];

    for (name, output) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &output, |bencher, output| {
            bencher.iter(|| check(black_box(Some(output.clone())), SchemaVariant::Standard));
        });
    }

    group.finish();
}

/// Benchmark a full submission against the in-process backend
fn bench_end_to_end(criterion: &mut Criterion) {
    let runtime = create_runtime();
    let backend: Arc<dyn ModelBackend> = Arc::new(MockBackend::new());
    let service = FeedbackService::new(FeedbackGenerator::new(backend));
    let raw = RawFeedbackRequest::new(snippet(50), "javascript", "advanced");

    criterion.bench_function("end_to_end_mock", |bencher| {
        bencher.to_async(&runtime).iter(|| service.get_feedback(black_box(&raw)));
    });
}

criterion_group!(
    benches,
    bench_validate,
    bench_render_prompt,
    bench_conformance,
    bench_end_to_end
);
criterion_main!(benches);
