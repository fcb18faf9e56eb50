//! Decision-path benchmarks.
//!
//! The sampler sits on every request of a proxy; the decision path has
//! to stay well under a microsecond.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tracegate::core::{ConfigBuilder, HttpContext, SpanKind};
use tracegate::sampling::{AdaptiveSampler, Sampler, StreamSummary};

fn bench_should_sample(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let config = ConfigBuilder::new()
        .tenant("abc12345")
        .cluster_id(0x980df25c)
        .build()
        .unwrap();
    let sampler = AdaptiveSampler::new(&config);
    let http = HttpContext::new("GET", "/path");

    c.bench_function("should_sample_no_parent", |b| {
        b.iter(|| {
            let result = sampler.should_sample(
                None,
                black_box("67a9a23155e1741b5b35368e08e6ece5"),
                "op",
                SpanKind::Server,
                Some(&http),
                &[],
            );
            black_box(result);
        });
    });

    let parent = tracegate::core::SpanContext::new(
        "0af7651916cd43dd8448eb211c80319c",
        "b7ad6b7169203331",
        true,
        "5b3f9fed-980df25c@dt=fw4;0;0;0;0;0;1;0,ot=foo:bar",
    );
    c.bench_function("should_sample_with_parent_tag", |b| {
        b.iter(|| {
            let result = sampler.should_sample(
                Some(&parent),
                black_box("67a9a23155e1741b5b35368e08e6ece5"),
                "op",
                SpanKind::Server,
                Some(&http),
                &[],
            );
            black_box(result);
        });
    });
}

fn bench_stream_summary_offer(c: &mut Criterion) {
    c.bench_function("stream_summary_offer_hit", |b| {
        let mut summary = StreamSummary::new(100);
        summary.offer("GET_/path".to_owned());
        b.iter(|| {
            summary.offer(black_box("GET_/path".to_owned()));
        });
    });

    c.bench_function("stream_summary_offer_churn", |b| {
        let mut summary = StreamSummary::new(100);
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            summary.offer(black_box(format!("GET_/path/{}", i % 500)));
        });
    });
}

criterion_group!(benches, bench_should_sample, bench_stream_summary_offer);
criterion_main!(benches);
