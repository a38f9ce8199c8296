//! Performance benchmarks for the commonforms Lambda handler
//!
//! Run with: `cargo bench`
//!
//! The conversion routine is replaced by a file copy, so these numbers cover
//! only the handler's own overhead: decoding, work directory setup and
//! teardown, and encoding.

use base64::Engine;
use commonforms_lambda::{
    preparer_fn, EnvDefaults, FormHandler, FormOptions, HandlerConfig, InvocationContext,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::path::Path;

fn synthetic_pdf(size: usize) -> Vec<u8> {
    let mut data = b"%PDF-1.7\n".to_vec();
    data.resize(size, b'x');
    data
}

/// Benchmark a full invocation for increasing payload sizes
fn bench_handle(c: &mut Criterion) {
    let root = tempfile::tempdir().expect("Failed to create scratch root");
    let handler = FormHandler::new(
        HandlerConfig {
            env: EnvDefaults::default(),
            work_root: Some(root.path().to_path_buf()),
        },
        preparer_fn(|input: &Path, output: &Path, _: &FormOptions| {
            std::fs::copy(input, output)?;
            Ok(())
        }),
    );
    let context = InvocationContext::default();

    let mut group = c.benchmark_group("handle");
    for size in [64 * 1024, 1024 * 1024, 8 * 1024 * 1024] {
        let event = json!({
            "pdf_base64": base64::engine::general_purpose::STANDARD.encode(synthetic_pdf(size)),
            "confidence": 0.6
        });
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &event, |b, event| {
            b.iter(|| {
                let response = handler.handle(black_box(event), &context);
                assert!(response.is_success());
            });
        });
    }
    group.finish();
}

/// Benchmark the rejection path, which still creates and removes a work directory
fn bench_missing_input(c: &mut Criterion) {
    let root = tempfile::tempdir().expect("Failed to create scratch root");
    let handler = FormHandler::new(
        HandlerConfig {
            env: EnvDefaults::default(),
            work_root: Some(root.path().to_path_buf()),
        },
        preparer_fn(|_: &Path, _: &Path, _: &FormOptions| Ok(())),
    );
    let context = InvocationContext::default();
    let event = json!({"confidence": 0.6});

    c.bench_function("missing_input", |b| {
        b.iter(|| handler.handle(black_box(&event), &context));
    });
}

criterion_group!(benches, bench_handle, bench_missing_input);
criterion_main!(benches);
