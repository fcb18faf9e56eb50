//! W3C `tracestate` header handling.
//!
//! See <https://www.w3.org/TR/trace-context/#tracestate-header>. The
//! header is a comma-separated, ordered list of `key=value` members
//! owned by different vendors. Members this proxy does not own must
//! survive a rewrite byte-for-byte, so every entry keeps its raw
//! member text alongside the parsed key and value.

pub mod vendor;

pub use vendor::{tenant_id_hash, vendor_tracestate_key, VendorTag};

/// One parsed `key=value` list member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStateEntry {
    key: String,
    value: String,
    raw: String,
}

impl TraceStateEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Parsed `tracestate` header with key-addressed access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceStateList {
    entries: Vec<TraceStateEntry>,
}

impl TraceStateList {
    /// Parse a header value.
    ///
    /// Members that are not `key=value` with a non-empty key and value
    /// are dropped; whitespace around the separator is tolerated
    /// (trimmed from the parsed view, kept in the raw member).
    pub fn parse(header: &str) -> Self {
        let mut entries = Vec::new();
        for member in header.split(',') {
            if member.is_empty() {
                continue;
            }
            let parts: Vec<&str> = member.split('=').filter(|part| !part.is_empty()).collect();
            if parts.len() != 2 {
                continue;
            }
            let key = parts[0].trim_start();
            let value = parts[1].trim_end();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            entries.push(TraceStateEntry {
                key: key.to_owned(),
                value: value.to_owned(),
                raw: member.to_owned(),
            });
        }
        Self { entries }
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Set `key` to `value`.
    ///
    /// An existing member is replaced in place; a new member is
    /// prepended, becoming the head of the list per W3C semantics.
    pub fn set(&mut self, key: &str, value: &str) {
        let raw = format!("{key}={value}");
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.value = value.to_owned();
                entry.raw = raw;
            },
            None => {
                self.entries.insert(
                    0,
                    TraceStateEntry {
                        key: key.to_owned(),
                        value: value.to_owned(),
                        raw,
                    },
                );
            },
        }
    }

    /// Parsed members in list order.
    pub fn entries(&self) -> &[TraceStateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-emit the header, members in current order.
    pub fn to_header(&self) -> String {
        let members: Vec<&str> = self.entries.iter().map(|entry| entry.raw.as_str()).collect();
        members.join(",")
    }
}
