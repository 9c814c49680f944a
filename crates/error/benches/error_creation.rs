// Baseline benchmarks for VelaError performance
// Run with: cargo bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vela_error::{ErrorCode, VelaError, wrap};

/// Baseline: a message-only generic error (sentinel code, stack captured
/// through the cache like any other error).
fn bench_error_creation_generic(c: &mut Criterion) {
    // Warm the cache so the loop measures the steady state, not the one-off
    // symbolication cost.
    black_box(VelaError::generic("warm"));
    c.bench_function("error_creation_generic", |b| {
        b.iter(|| {
            let error = VelaError::generic(black_box("Invalid input"));
            black_box(error);
        });
    });
}

/// The contract under test: a coded, full-stack error should cost close to
/// the generic baseline once its call site is warm in the cache.
fn bench_error_creation_coded(c: &mut Criterion) {
    black_box(VelaError::new(ErrorCode::new(42), "warm"));
    c.bench_function("error_creation_coded", |b| {
        b.iter(|| {
            let error = VelaError::new(black_box(ErrorCode::new(42)), black_box("Invalid input"));
            black_box(error);
        });
    });
}

/// Render text from a warm error: pre-sized buffer, no reallocation.
fn bench_render_text(c: &mut Criterion) {
    let error = VelaError::new(ErrorCode::new(42), "Database connection failed");
    c.bench_function("render_text_warm", |b| {
        b.iter(|| {
            black_box(black_box(&error).render_text());
        });
    });
}

/// Render the structured form from a warm error.
fn bench_render_json(c: &mut Criterion) {
    let error = VelaError::new(ErrorCode::new(42), "Database connection failed");
    c.bench_function("render_json_warm", |b| {
        b.iter(|| {
            black_box(black_box(&error).to_json());
        });
    });
}

/// Breadcrumb append: a depth-1 capture, much cheaper than a full error.
fn bench_wrap_breadcrumb(c: &mut Criterion) {
    c.bench_function("wrap_breadcrumb", |b| {
        b.iter(|| {
            let chain = wrap(
                VelaError::new(ErrorCode::new(1), black_box("root")),
                black_box("crossing boundary"),
            );
            black_box(chain);
        });
    });
}

/// Cloning errors (cheap by design: code + Cow + Arc).
fn bench_error_clone(c: &mut Criterion) {
    let error = VelaError::new(ErrorCode::new(42), "Database connection failed");
    c.bench_function("error_clone", |b| {
        b.iter(|| {
            let cloned = black_box(error.clone());
            black_box(cloned);
        });
    });
}

criterion_group!(
    benches,
    bench_error_creation_generic,
    bench_error_creation_coded,
    bench_render_text,
    bench_render_json,
    bench_wrap_breadcrumb,
    bench_error_clone
);
criterion_main!(benches);
