use thiserror::Error;

#[derive(Error, Debug)]
pub enum TracegateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stream summary invariant violated: {0}")]
    InvariantViolation(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for tracegate operations
pub type Result<T> = std::result::Result<T, TracegateError>;

impl TracegateError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new invariant violation error
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TracegateError::config("tenant missing");
        assert_eq!(err.to_string(), "Configuration error: tenant missing");
    }

    #[test]
    fn test_invariant_error() {
        let err = TracegateError::invariant("buckets out of order");
        assert_eq!(
            err.to_string(),
            "Stream summary invariant violated: buckets out of order"
        );
    }
}
