//! Request-rate-adaptive head sampler.
//!
//! Per request: derive the sampling key from method and path, feed it
//! to the frequency estimator, then decide. An upstream decision found
//! in the vendor tracestate tag wins; otherwise the trace-id hash is
//! tested against the key's current sampling multiplicity and a fresh
//! tag is written for downstream hops.
//!
//! The decision path never blocks on I/O. The only locks on it are the
//! estimator mutex (offer) and nothing else: exponent lookups read a
//! lock-free snapshot.

use super::budget::{SamplerConfigProvider, SamplingBudget};
use super::controller::SamplingController;
use super::hash::hash64;
use super::scheduler::PeriodicTask;
use super::state::SamplingState;
use super::{Sampler, SamplingDecision, SamplingResult};
use crate::core::{AttributeMap, Config, HttpContext, SpanContext, SpanKind};
use crate::tracestate::{vendor_tracestate_key, TraceStateList, VendorTag};
use std::sync::Arc;

/// Span attribute carrying the sampling multiplicity for count
/// extrapolation.
const SAMPLING_RATIO_ATTRIBUTE: &str = "supportability.atm_sampling_ratio";

/// Span attribute carrying the 56-bit sampling threshold; only set
/// when the span survived a multiplicity above one.
const SAMPLING_THRESHOLD_ATTRIBUTE: &str = "sampling.threshold";

/// Head sampler that converges on a configured budget of sampled root
/// spans per refresh interval.
pub struct AdaptiveSampler {
    vendor_key: String,
    controller: Arc<SamplingController>,
    refresh: PeriodicTask,
}

impl AdaptiveSampler {
    /// Create a sampler with the budget fixed to
    /// `config.root_spans_per_minute`.
    ///
    /// Must be called within a tokio runtime: the periodic exponent
    /// refresh is spawned here.
    pub fn new(config: &Config) -> Self {
        let budget = Arc::new(SamplingBudget::new(config.root_spans_per_minute));
        Self::with_provider(config, budget)
    }

    /// Create a sampler reading its budget from `provider`, e.g. a
    /// remote configuration-service client.
    pub fn with_provider(config: &Config, provider: Arc<dyn SamplerConfigProvider>) -> Self {
        let controller = Arc::new(SamplingController::new(
            provider,
            config.stream_summary_capacity,
        ));
        // the refresh task only holds a weak reference: dropping the
        // sampler is enough to wind everything down
        let weak = Arc::downgrade(&controller);
        let refresh = PeriodicTask::spawn(config.refresh_interval, move || {
            if let Some(controller) = weak.upgrade() {
                controller.update();
            }
        });
        Self {
            vendor_key: vendor_tracestate_key(&config.tenant, config.cluster_id),
            controller,
            refresh,
        }
    }

    /// The tenant-scoped tracestate key this sampler reads and writes.
    pub fn vendor_key(&self) -> &str {
        &self.vendor_key
    }

    /// The controller backing this sampler, for diagnostics.
    pub fn controller(&self) -> &SamplingController {
        &self.controller
    }

    /// Cancel the periodic refresh. An update already in flight
    /// completes normally.
    pub fn shutdown(&self) {
        self.refresh.cancel();
    }
}

impl Sampler for AdaptiveSampler {
    fn should_sample(
        &self,
        parent_context: Option<&SpanContext>,
        trace_id: &str,
        _name: &str,
        _span_kind: SpanKind,
        trace_context: Option<&HttpContext>,
        _links: &[SpanContext],
    ) -> SamplingResult {
        let key = trace_context
            .map(|http| SamplingController::sampling_key(&http.path, &http.method))
            .unwrap_or_default();
        self.controller.offer(&key);

        let parent_tracestate = parent_context
            .map(|context| context.tracestate.as_str())
            .unwrap_or_default();
        let mut trace_state = TraceStateList::parse(parent_tracestate);

        if let Some(tag) = trace_state.get(&self.vendor_key).and_then(VendorTag::parse) {
            // an upstream hop already decided for this trace
            let decision = if tag.ignored {
                SamplingDecision::Drop
            } else {
                SamplingDecision::RecordAndSample
            };
            return SamplingResult {
                decision,
                attributes: sampling_attributes(tag.exponent),
                tracestate: parent_tracestate.to_owned(),
            };
        }

        let r = hash64(trace_id);
        let state = self.controller.sampling_state(&key);
        let sample = state.should_sample(r);

        let tag = VendorTag::new(!sample, state.exponent(), (r & 0xff) as u32);
        trace_state.set(&self.vendor_key, &tag.to_string());

        SamplingResult {
            decision: if sample {
                SamplingDecision::RecordAndSample
            } else {
                SamplingDecision::Drop
            },
            attributes: sampling_attributes(state.exponent()),
            tracestate: trace_state.to_header(),
        }
    }

    fn description(&self) -> String {
        "AdaptiveSampler".to_owned()
    }
}

/// Attributes describing the multiplicity a decision was made with.
fn sampling_attributes(exponent: u32) -> AttributeMap {
    let multiplicity = SamplingState::new(exponent).multiplicity();
    let mut attributes = AttributeMap::new();
    attributes.push(SAMPLING_RATIO_ATTRIBUTE, multiplicity.to_string());
    if multiplicity > 1 {
        let threshold = (1u64 << 56) - (1u64 << 56) / u64::from(multiplicity);
        attributes.push(SAMPLING_THRESHOLD_ATTRIBUTE, threshold.to_string());
    }
    attributes
}
