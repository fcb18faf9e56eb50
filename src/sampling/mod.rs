//! Adaptive head sampling.
//!
//! The goal: keep the number of sampled root spans per refresh
//! interval near an operator-configured budget, no matter how the
//! request rate moves. Frequent request kinds get suppressed harder
//! than rare ones, so low-traffic endpoints stay visible.
//!
//! Pieces, bottom up:
//! - [`StreamSummary`]: bounded top-k frequency estimation over the
//!   stream of request kinds
//! - [`SamplingState`]: a power-of-two sampling multiplicity
//! - [`SamplingController`]: turns a frequency snapshot plus budget
//!   into per-key exponents
//! - [`AdaptiveSampler`]: the per-request decision path, tracestate
//!   handling included

pub mod adaptive;
pub mod always_on;
pub mod budget;
pub mod controller;
pub mod hash;
pub mod scheduler;
pub mod state;
pub mod stream_summary;

pub use adaptive::AdaptiveSampler;
pub use always_on::AlwaysOnSampler;
pub use budget::{SamplerConfigProvider, SamplingBudget};
pub use controller::SamplingController;
pub use scheduler::PeriodicTask;
pub use state::{SamplingState, MAX_EXPONENT};
pub use stream_summary::{Counter, StreamSummary};

use crate::core::{AttributeMap, HttpContext, SpanContext, SpanKind};

/// Sampling decision for a single root span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingDecision {
    /// Span is not recorded; all events and attributes are dropped.
    Drop,
    /// Span is recorded, but the sampled flag must not be set.
    RecordOnly,
    /// Span is recorded and the sampled flag is set.
    RecordAndSample,
}

/// Outcome of a sampling decision.
#[derive(Debug, Clone)]
pub struct SamplingResult {
    pub decision: SamplingDecision,
    /// Attributes to add to the span.
    pub attributes: AttributeMap,
    /// The tracestate to propagate downstream.
    pub tracestate: String,
}

impl SamplingResult {
    #[inline]
    pub fn is_recording(&self) -> bool {
        matches!(
            self.decision,
            SamplingDecision::RecordOnly | SamplingDecision::RecordAndSample
        )
    }

    #[inline]
    pub fn is_sampled(&self) -> bool {
        self.decision == SamplingDecision::RecordAndSample
    }
}

/// Head sampler interface.
///
/// `name`, `span_kind` and `links` take part in the signature for
/// interface compatibility; the implementations here do not consult
/// them.
pub trait Sampler: Send + Sync {
    /// Decide whether a root span for `trace_id` should be sampled.
    /// Total: always produces a result, never fails.
    fn should_sample(
        &self,
        parent_context: Option<&SpanContext>,
        trace_id: &str,
        name: &str,
        span_kind: SpanKind,
        trace_context: Option<&HttpContext>,
        links: &[SpanContext],
    ) -> SamplingResult;

    /// Human-readable sampler name.
    fn description(&self) -> String;
}
