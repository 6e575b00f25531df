//! Benchmarks for expression rendering
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use cube_client::expression::*;
use cube_client::time::{floor, Resolution};
use chrono::Utc;

fn request_metric(i: usize) -> MetricExpression {
    let event = EventExpression::new("request")
        .with_property("elapsed_ms")
        .eq("path", format!("/page/{}", i))
        .gt("status", 199)
        .in_array("method", ["GET", "HEAD"]);
    MetricExpression::sum(event).unwrap()
}

/// Left-deep sum of `depth` metrics
fn deep_compound(depth: usize) -> CompoundMetricExpression {
    let mut expr = CompoundMetricExpression::bare(request_metric(0));
    for i in 1..depth {
        expr = expr + request_metric(i);
    }
    expr
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let metric = request_metric(0);
    group.bench_function("metric", |b| b.iter(|| black_box(&metric).render()));

    for depth in [10, 100, 1000] {
        let expr = deep_compound(depth);
        group.throughput(Throughput::Elements(depth as u64));

        group.bench_function(format!("compound_{}", depth), |b| {
            b.iter(|| black_box(&expr).render())
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    let base = EventExpression::new("request").with_property("elapsed_ms");
    group.bench_function("filter_chain", |b| {
        b.iter(|| {
            black_box(&base)
                .eq("path", "/")
                .ne("status", 404)
                .re("agent", "^curl")
                .in_array("method", ["GET", "POST"])
        })
    });

    group.bench_function("compound_100", |b| b.iter(|| deep_compound(black_box(100))));

    group.finish();
}

fn bench_floor(c: &mut Criterion) {
    let now = Utc::now();
    c.bench_function("floor_one_hour", |b| {
        b.iter(|| floor(black_box(now), Resolution::OneHour))
    });
}

criterion_group!(benches, bench_render, bench_build, bench_floor);
criterion_main!(benches);
