//! End-to-end sampler behavior.

use tracegate::core::{ConfigBuilder, HttpContext, SpanContext, SpanKind};
use tracegate::sampling::{AdaptiveSampler, Sampler, SamplingDecision};

const TRACE_ID: &str = "67a9a23155e1741b5b35368e08e6ece5";

fn sampler(root_spans_per_minute: u32) -> AdaptiveSampler {
    let config = ConfigBuilder::new()
        .tenant("9712ad40")
        .cluster_id(0x980df25c)
        .root_spans_per_minute(root_spans_per_minute)
        .build()
        .unwrap();
    AdaptiveSampler::new(&config)
}

#[tokio::test]
async fn cold_start_samples_and_tags() {
    let sampler = sampler(200);
    let http = HttpContext::new("GET", "/path");

    let result = sampler.should_sample(None, TRACE_ID, "operation_name", SpanKind::Server, Some(&http), &[]);

    assert_eq!(result.decision, SamplingDecision::RecordAndSample);
    assert_eq!(
        result.attributes.get("supportability.atm_sampling_ratio"),
        Some("1")
    );
    // tenant "9712ad40" folded, cluster id in lowercase hex
    assert!(result
        .tracestate
        .starts_with("100f8eb3-980df25c@dt=fw4;0;0;0;0;0;0;"));
}

#[tokio::test]
async fn upstream_ignore_decision_wins() {
    let sampler = sampler(200);
    let tracestate = "100f8eb3-980df25c@dt=fw4;0;0;0;0;1;2;95,ot=foo:bar";
    let parent = SpanContext::new(
        "0af7651916cd43dd8448eb211c80319c",
        "b7ad6b7169203331",
        true,
        tracestate,
    );
    let http = HttpContext::new("GET", "/path");

    let result = sampler.should_sample(
        Some(&parent),
        TRACE_ID,
        "operation_name",
        SpanKind::Server,
        Some(&http),
        &[],
    );

    assert_eq!(result.decision, SamplingDecision::Drop);
    // the parent tracestate travels on unchanged
    assert_eq!(result.tracestate, tracestate);
}

#[tokio::test]
async fn foreign_entries_survive_a_rewrite() {
    let sampler = sampler(200);
    let parent = SpanContext::new(
        "0af7651916cd43dd8448eb211c80319c",
        "b7ad6b7169203331",
        true,
        "congo=t61rcWkgMzE,rojo=00f067aa0ba902b7",
    );

    let result = sampler.should_sample(
        Some(&parent),
        TRACE_ID,
        "operation_name",
        SpanKind::Server,
        None,
        &[],
    );

    assert!(result.tracestate.starts_with("100f8eb3-980df25c@dt=fw4;"));
    assert!(result
        .tracestate
        .ends_with(",congo=t61rcWkgMzE,rojo=00f067aa0ba902b7"));
}

/// Under sustained cold traffic the warm-up heuristic tightens the
/// sampling rate before the first refresh fires.
#[tokio::test]
async fn warm_up_trends_toward_budget() {
    let sampler = sampler(200);
    let http = HttpContext::new("GET", "/hot");

    let mut sampled_per_quarter = [0u32; 4];
    for i in 0..4000 {
        let trace_id = format!("trace{i}");
        let result = sampler.should_sample(
            None,
            &trace_id,
            "operation_name",
            SpanKind::Server,
            Some(&http),
            &[],
        );
        if result.is_sampled() {
            sampled_per_quarter[i / 1000] += 1;
        }
    }

    for pair in sampled_per_quarter.windows(2) {
        assert!(
            pair[1] < pair[0],
            "sampled fraction must fall: {sampled_per_quarter:?}"
        );
    }
    // far below the 4000 requests, approaching the budget
    assert!(sampled_per_quarter.iter().sum::<u32>() < 450);
}

/// After a refresh, hot endpoints are suppressed while rare ones keep
/// full visibility.
#[tokio::test]
async fn refresh_redistributes_the_budget() {
    let sampler = sampler(200);
    let hot = HttpContext::new("GET", "/hot");
    let rare = HttpContext::new("GET", "/rare");

    for i in 0..2000 {
        let trace_id = format!("hot{i}");
        sampler.should_sample(None, &trace_id, "op", SpanKind::Server, Some(&hot), &[]);
    }
    for i in 0..5 {
        let trace_id = format!("rare{i}");
        sampler.should_sample(None, &trace_id, "op", SpanKind::Server, Some(&rare), &[]);
    }
    sampler.controller().update();

    let hot_multiplicity = sampler.controller().sampling_state("GET_/hot").multiplicity();
    let rare_multiplicity = sampler.controller().sampling_state("GET_/rare").multiplicity();
    assert!(hot_multiplicity > rare_multiplicity);
    assert!(sampler.controller().effective_count() <= 2005);
}

/// Many request threads against one background refresher: decisions
/// stay total and nothing deadlocks.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_decisions_and_updates() {
    let sampler = std::sync::Arc::new(sampler(500));

    let mut workers = Vec::new();
    for t in 0..8 {
        let sampler = sampler.clone();
        workers.push(std::thread::spawn(move || {
            let http = HttpContext::new("GET", format!("/endpoint/{t}"));
            for i in 0..1000 {
                let trace_id = format!("{t}-{i}");
                let result = sampler.should_sample(
                    None,
                    &trace_id,
                    "op",
                    SpanKind::Server,
                    Some(&http),
                    &[],
                );
                // total: every call yields a decision and a tracestate
                assert!(!result.tracestate.is_empty());
            }
        }));
    }
    let updater = {
        let sampler = sampler.clone();
        std::thread::spawn(move || {
            for _ in 0..50 {
                sampler.controller().update();
            }
        })
    };

    for worker in workers {
        worker.join().unwrap();
    }
    updater.join().unwrap();

    sampler.shutdown();
}
