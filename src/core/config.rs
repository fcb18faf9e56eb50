//! Configuration for the adaptive sampler.
//!
//! Supports YAML files, builder-style construction, validation and
//! sensible defaults. Only `tenant` and `cluster_id` have no usable
//! default; everything else can be left out.

use crate::core::{Result, TracegateError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default budget of sampled root spans per refresh interval.
pub const ROOT_SPANS_PER_MINUTE_DEFAULT: u32 = 1000;

/// Default capacity of the top-k frequency estimator.
pub const STREAM_SUMMARY_SIZE: usize = 100;

/// Complete sampler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tenant identifier; folded into the vendor tracestate key.
    pub tenant: String,
    /// Cluster identifier; rendered as lowercase hex in the vendor key.
    pub cluster_id: u32,
    /// Target number of sampled root spans per refresh interval.
    pub root_spans_per_minute: u32,
    /// Period between sampling exponent recomputations.
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    /// Capacity of the request-kind frequency estimator.
    pub stream_summary_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tenant: String::new(),
            cluster_id: 0,
            root_spans_per_minute: ROOT_SPANS_PER_MINUTE_DEFAULT,
            refresh_interval: Duration::from_secs(60),
            stream_summary_capacity: STREAM_SUMMARY_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.tenant.is_empty() {
            return Err(TracegateError::config("tenant must not be empty"));
        }
        if self.stream_summary_capacity == 0 {
            return Err(TracegateError::config(
                "stream_summary_capacity must be at least 1",
            ));
        }
        if self.refresh_interval.is_zero() {
            return Err(TracegateError::config("refresh_interval must be non-zero"));
        }
        Ok(())
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tenant identifier.
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.config.tenant = tenant.into();
        self
    }

    /// Set the cluster identifier.
    pub fn cluster_id(mut self, cluster_id: u32) -> Self {
        self.config.cluster_id = cluster_id;
        self
    }

    /// Set the sampling budget per refresh interval.
    pub fn root_spans_per_minute(mut self, budget: u32) -> Self {
        self.config.root_spans_per_minute = budget;
        self
    }

    /// Set the period between exponent recomputations.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = interval;
        self
    }

    /// Set the frequency estimator capacity.
    pub fn stream_summary_capacity(mut self, capacity: usize) -> Self {
        self.config.stream_summary_capacity = capacity;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.root_spans_per_minute, 1000);
        assert_eq!(config.stream_summary_capacity, 100);
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        // tenant is required
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .tenant("abc12345")
            .cluster_id(0x980df25c)
            .root_spans_per_minute(200)
            .refresh_interval(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(config.tenant, "abc12345");
        assert_eq!(config.cluster_id, 0x980df25c);
        assert_eq!(config.root_spans_per_minute, 200);
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
tenant: "abc12345"
cluster_id: 2551050844
root_spans_per_minute: 500
refresh_interval: 2m
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.tenant, "abc12345");
        assert_eq!(config.cluster_id, 0x980df25c);
        assert_eq!(config.root_spans_per_minute, 500);
        assert_eq!(config.refresh_interval, Duration::from_secs(120));
        assert_eq!(config.stream_summary_capacity, 100);
    }

    #[test]
    fn test_invalid_capacity() {
        let config = ConfigBuilder::new()
            .tenant("abc12345")
            .stream_summary_capacity(0)
            .build();
        assert!(config.is_err());
    }
}
