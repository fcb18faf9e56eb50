//! Core domain types, configuration and errors.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, ROOT_SPANS_PER_MINUTE_DEFAULT, STREAM_SUMMARY_SIZE};
pub use error::{Result, TracegateError};
pub use types::{AttributeMap, HttpContext, SpanContext, SpanKind};
