//! Domain types shared across the sampler.

use smallvec::SmallVec;
use std::sync::Arc;

/// Span attribute storage using SmallVec.
/// Sampling results carry at most two attributes, avoiding heap
/// allocation in the common case.
#[derive(Debug, Clone, Default)]
pub struct AttributeMap(SmallVec<[(Arc<str>, Arc<str>); 2]>);

impl AttributeMap {
    #[inline(always)]
    pub fn new() -> Self {
        AttributeMap(SmallVec::new())
    }

    #[inline]
    pub fn push(&mut self, key: impl Into<Arc<str>>, value: impl Into<Arc<str>>) {
        self.0.push((key.into(), value.into()));
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parent span context as extracted from incoming trace headers.
///
/// Only `tracestate` feeds the sampling decision; the remaining fields
/// are kept so hosts can hand the context through unchanged.
#[derive(Debug, Clone, Default)]
pub struct SpanContext {
    /// Hex trace id, as received.
    pub trace_id: String,
    /// Hex span id of the parent span.
    pub span_id: String,
    /// Sampled flag from the traceparent header.
    pub sampled: bool,
    /// Raw W3C tracestate header value.
    pub tracestate: String,
}

impl SpanContext {
    /// Create a span context from its header fields.
    pub fn new(
        trace_id: impl Into<String>,
        span_id: impl Into<String>,
        sampled: bool,
        tracestate: impl Into<String>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            sampled,
            tracestate: tracestate.into(),
        }
    }
}

/// The subset of an HTTP request the sampler keys on.
#[derive(Debug, Clone)]
pub struct HttpContext {
    /// Request method, e.g. `GET`.
    pub method: String,
    /// Request path, may include a query string.
    pub path: String,
}

impl HttpContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

/// OpenTelemetry span kind.
///
/// Accepted for interface compatibility; the adaptive decision does not
/// depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanKind {
    #[default]
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}
