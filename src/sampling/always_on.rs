//! Trivial sampler that keeps everything.

use super::{Sampler, SamplingDecision, SamplingResult};
use crate::core::{AttributeMap, HttpContext, SpanContext, SpanKind};

/// Samples every span and passes the parent tracestate through
/// unchanged. Useful as a baseline and for environments where the
/// adaptive machinery is not wanted.
#[derive(Debug, Default)]
pub struct AlwaysOnSampler;

impl Sampler for AlwaysOnSampler {
    fn should_sample(
        &self,
        parent_context: Option<&SpanContext>,
        _trace_id: &str,
        _name: &str,
        _span_kind: SpanKind,
        _trace_context: Option<&HttpContext>,
        _links: &[SpanContext],
    ) -> SamplingResult {
        SamplingResult {
            decision: SamplingDecision::RecordAndSample,
            attributes: AttributeMap::new(),
            tracestate: parent_context
                .map(|context| context.tracestate.clone())
                .unwrap_or_default(),
        }
    }

    fn description(&self) -> String {
        "AlwaysOnSampler".to_owned()
    }
}
