//! Tracegate - request-rate-adaptive trace sampler.
//!
//! Tracegate sits in an HTTP proxy's distributed-tracing path and
//! decides, per request, whether the outgoing root span is sampled.
//! The decision adapts to traffic: the number of sampled spans per
//! refresh interval converges on an operator-configured budget, with
//! frequent request kinds suppressed harder than rare ones.
//!
//! # Features
//!
//! - **Adaptive rates**: Space-Saving top-k estimation over request
//!   kinds, converted into power-of-two sampling multiplicities
//! - **Tracestate interop**: W3C tracestate parsing with a vendor tag
//!   carrying the decision to downstream hops
//! - **Lock-free reads**: request threads read an atomic snapshot,
//!   only the frequency counter takes a short mutex
//! - **Budget aware**: the target rate can follow a remote
//!   configuration service
//!
//! # Example
//!
//! ```no_run
//! use tracegate::core::ConfigBuilder;
//! use tracegate::sampling::{AdaptiveSampler, Sampler};
//! use tracegate::core::{HttpContext, SpanKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigBuilder::new()
//!         .tenant("abc12345")
//!         .cluster_id(0x980df25c)
//!         .root_spans_per_minute(1000)
//!         .build()?;
//!
//!     let sampler = AdaptiveSampler::new(&config);
//!     let http = HttpContext::new("GET", "/checkout?step=2");
//!     let result = sampler.should_sample(
//!         None,
//!         "67a9a23155e1741b5b35368e08e6ece5",
//!         "GET /checkout",
//!         SpanKind::Server,
//!         Some(&http),
//!         &[],
//!     );
//!     println!("sampled: {}", result.is_sampled());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod core;
pub mod sampling;
pub mod tracestate;

pub use crate::core::{Config, ConfigBuilder, Result, TracegateError};
pub use crate::sampling::{
    AdaptiveSampler, AlwaysOnSampler, Sampler, SamplingDecision, SamplingResult,
};
