//! Converts observed request frequencies into per-key sampling exponents.
//!
//! Request threads feed the controller through [`SamplingController::offer`]
//! and read decisions through [`SamplingController::sampling_state`]; a
//! background task periodically calls [`SamplingController::update`] to
//! rotate the frequency snapshot and republish the exponent table.
//!
//! Locking: the stream summary sits behind a mutex with O(1) critical
//! sections on the request path; the exponent table is an immutable
//! snapshot behind an atomic pointer swap, so readers never block.

use super::budget::SamplerConfigProvider;
use super::state::{SamplingState, MAX_EXPONENT};
use super::stream_summary::{Counter, StreamSummary};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type TopK = Vec<Counter<String>>;

/// Immutable exponent snapshot published by `update()`.
#[derive(Debug, Default)]
struct ExponentTable {
    exponents: FxHashMap<String, SamplingState>,
    /// Least-frequent key of the snapshot; applied to unseen keys.
    rest_bucket_key: String,
}

/// Owns the frequency estimator and the published exponent table.
pub struct SamplingController {
    summary: Mutex<StreamSummary<String>>,
    capacity: usize,
    table: ArcSwap<ExponentTable>,
    last_effective_count: AtomicU64,
    provider: Arc<dyn SamplerConfigProvider>,
}

impl SamplingController {
    /// Create a controller reading its budget from `provider`.
    pub fn new(provider: Arc<dyn SamplerConfigProvider>, capacity: usize) -> Self {
        Self {
            summary: Mutex::new(StreamSummary::new(capacity)),
            capacity,
            table: ArcSwap::from_pointee(ExponentTable::default()),
            last_effective_count: AtomicU64::new(0),
            provider,
        }
    }

    /// Record one occurrence of a sampling key. Empty keys are skipped.
    pub fn offer(&self, key: &str) {
        if !key.is_empty() {
            self.summary.lock().offer(key.to_owned());
        }
    }

    /// Recompute the exponent table from the current snapshot and start
    /// a fresh observation period.
    pub fn update(&self) {
        let total_wanted = self.provider.current_root_spans_per_minute();
        let new_table;
        {
            let mut summary = self.summary.lock();
            let top_k = summary.top();
            let last_period_count = summary.n();

            new_table = compute_exponents(&top_k, total_wanted);
            let effective = effective_count(&top_k, &new_table.exponents);
            self.last_effective_count.store(effective, Ordering::Relaxed);
            log_sampling_info(&top_k, &new_table, last_period_count, total_wanted);

            *summary = StreamSummary::new(self.capacity);
        }
        self.table.store(Arc::new(new_table));
    }

    /// Sampling state for `key`.
    ///
    /// Falls back to the rest bucket for unseen keys, and to the
    /// warm-up heuristic before the first snapshot is published.
    pub fn sampling_state(&self, key: &str) -> SamplingState {
        let table = self.table.load();
        if let Some(state) = table.exponents.get(key) {
            return *state;
        }
        if let Some(state) = table.exponents.get(table.rest_bucket_key.as_str()) {
            return *state;
        }
        self.warm_up_state(key)
    }

    /// Σ value / multiplicity of the last published snapshot.
    pub fn effective_count(&self) -> u64 {
        self.last_effective_count.load(Ordering::Relaxed)
    }

    /// Derive the sampling key of a request: method and path, query
    /// string stripped.
    pub fn sampling_key(path_and_query: &str, method: &str) -> String {
        let path = match path_and_query.find('?') {
            Some(offset) => &path_and_query[..offset],
            None => path_and_query,
        };
        format!("{method}_{path}")
    }

    /// Decision source while no exponent table covers `key`.
    ///
    /// Uses the running offer count of the current period so a cold
    /// start tightens monotonically under bursty traffic instead of
    /// sampling everything until the first refresh.
    fn warm_up_state(&self, key: &str) -> SamplingState {
        if key.is_empty() {
            return SamplingState::default();
        }
        let total_wanted = u64::from(self.provider.current_root_spans_per_minute());
        let count = self.summary.lock().value_of(key).unwrap_or(0);
        SamplingState::new(warm_up_exponent(count, total_wanted))
    }
}

/// Step function mapping an observed count to a warm-up exponent:
/// below half the budget nothing is suppressed, afterwards every
/// doubling of the count costs one more exponent.
fn warm_up_exponent(count: u64, total_wanted: u64) -> u32 {
    let mut exponent = 0;
    let mut threshold = total_wanted / 2;
    while threshold > 0 && count >= threshold && exponent < MAX_EXPONENT {
        exponent += 1;
        threshold = threshold.saturating_mul(2);
    }
    exponent
}

/// Compute per-key exponents so that the expected number of sampled
/// spans approaches `total_wanted`.
fn compute_exponents(top_k: &TopK, total_wanted: u32) -> ExponentTable {
    let mut table = ExponentTable::default();
    if top_k.is_empty() || total_wanted == 0 {
        return table;
    }

    // start with exponent 0: every span sampled
    for counter in top_k {
        table
            .exponents
            .insert(counter.item.clone(), SamplingState::default());
    }
    // the least-frequent entry doubles as the bucket for unseen keys
    table.rest_bucket_key = top_k[top_k.len() - 1].item.clone();

    // number of sampled spans every entry may spend
    let allowed_per_entry = u64::from(total_wanted) / top_k.len() as u64;

    for counter in top_k {
        let wanted_multiplicity = match allowed_per_entry {
            0 => u64::from(u32::MAX),
            allowed => (counter.value / allowed).max(1),
        };
        let Some(state) = table.exponents.get_mut(&counter.item) else {
            continue;
        };
        // multiplicity is a power of two; search the exponent whose
        // multiplicity reaches wanted_multiplicity
        while wanted_multiplicity > u64::from(state.multiplicity())
            && state.exponent() < MAX_EXPONENT
        {
            state.increase();
        }
        if wanted_multiplicity < u64::from(state.multiplicity()) {
            // overshot: prefer multiplicity <= wanted_multiplicity
            state.decrease();
        }
    }

    // Entries whose count is below allowed_per_entry leave part of the
    // budget unused. Hand it to the low-frequency tail by lowering
    // exponents until the effective count reaches the budget.
    let mut effective = effective_count(top_k, &table.exponents);
    if effective < u64::from(total_wanted) {
        'rounds: for _ in 0..5 {
            for counter in top_k.iter().rev() {
                if let Some(state) = table.exponents.get_mut(&counter.item) {
                    state.decrease();
                }
                effective = effective_count(top_k, &table.exponents);
                if effective >= u64::from(total_wanted) {
                    break 'rounds;
                }
            }
        }
    }
    table
}

fn effective_count(top_k: &TopK, exponents: &FxHashMap<String, SamplingState>) -> u64 {
    top_k
        .iter()
        .filter_map(|counter| {
            exponents
                .get(&counter.item)
                .map(|state| counter.value / u64::from(state.multiplicity()))
        })
        .sum()
}

fn log_sampling_info(
    top_k: &TopK,
    table: &ExponentTable,
    last_period_count: u64,
    total_wanted: u32,
) {
    tracing::debug!(
        top_k_size = top_k.len(),
        last_period_count,
        total_wanted,
        "updating sampling exponents"
    );
    for counter in top_k {
        if let Some(state) = table.exponents.get(&counter.item) {
            tracing::debug!(
                key = %counter.item,
                value = counter.value,
                exponent = state.exponent(),
                "sampling exponent"
            );
        }
    }
}
