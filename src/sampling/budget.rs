//! Sampling budget lookup.
//!
//! The budget is the number of root spans the operator wants sampled
//! per refresh interval. It usually comes from a remote configuration
//! service; the transport is the host's business, the sampler only
//! reads the current value through [`SamplerConfigProvider`].

use crate::core::ROOT_SPANS_PER_MINUTE_DEFAULT;
use serde::Deserialize;
use std::sync::atomic::{AtomicU32, Ordering};

/// Source of the current sampling budget.
///
/// Implementations must be cheap: the controller reads the budget on
/// every `update()` and during warm-up decisions.
pub trait SamplerConfigProvider: Send + Sync {
    /// The target number of sampled root spans per refresh interval.
    fn current_root_spans_per_minute(&self) -> u32;
}

/// Budget backed by an atomic, updatable from a configuration-service
/// response body.
#[derive(Debug)]
pub struct SamplingBudget {
    root_spans_per_minute: AtomicU32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetPayload {
    root_spans_per_minute: Option<u32>,
}

impl SamplingBudget {
    /// Create a budget with an initial value.
    pub fn new(root_spans_per_minute: u32) -> Self {
        Self {
            root_spans_per_minute: AtomicU32::new(root_spans_per_minute),
        }
    }

    /// Ingest a configuration-service JSON body of the form
    /// `{"rootSpansPerMinute": 1000}`.
    ///
    /// A malformed body or a missing field keeps the previous budget.
    /// Foreign payloads are expected here, so failures are logged at
    /// debug level only.
    pub fn parse(&self, json: &str) {
        let payload = match serde_json::from_str::<BudgetPayload>(json) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::debug!(%error, "malformed sampling budget payload, keeping previous budget");
                return;
            },
        };
        match payload.root_spans_per_minute {
            Some(value) => self.root_spans_per_minute.store(value, Ordering::Relaxed),
            None => {
                tracing::debug!("sampling budget payload without a budget, keeping previous");
            },
        }
    }
}

impl Default for SamplingBudget {
    fn default() -> Self {
        Self::new(ROOT_SPANS_PER_MINUTE_DEFAULT)
    }
}

impl SamplerConfigProvider for SamplingBudget {
    fn current_root_spans_per_minute(&self) -> u32 {
        self.root_spans_per_minute.load(Ordering::Relaxed)
    }
}
