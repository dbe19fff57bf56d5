//! Error types for the build monitor library.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to obtain a snapshot from the build server.
///
/// Every variant is recoverable: the monitor keeps its previous snapshot and
/// simply tries again on the next poll tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server could not be reached or the transfer failed
    #[error("network error: {0}")]
    Network(String),
    /// The server rejected our credentials
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// The server answered with something that is not a plan list
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The fetch did not finish within the configured timeout
    #[error("fetch timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Comprehensive error type for all monitor operations.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// A fetch failed outside the polling loop (for example a one-shot check)
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Invalid configuration value
    #[error("Invalid configuration for '{field}': {reason}")]
    Configuration { field: String, reason: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Builder for creating configuration errors.
pub struct ConfigErrorBuilder {
    field: String,
}

impl ConfigErrorBuilder {
    /// Create a new configuration error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> MonitorError {
        MonitorError::Configuration {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl MonitorError {
    /// Creates a builder for configuration errors.
    pub fn config(field: impl Into<String>) -> ConfigErrorBuilder {
        ConfigErrorBuilder::new(field)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::MalformedResponse(e.to_string())
        } else if e.status().is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403) {
            FetchError::Authentication(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let err = MonitorError::config("pollIntervalMs").with_reason("must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'pollIntervalMs': must be positive"
        );
        assert!(matches!(err, MonitorError::Configuration { .. }));
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err = MonitorError::from(FetchError::Timeout(Duration::from_millis(1500)));
        assert_eq!(err.to_string(), "fetch timed out after 1500ms");
        assert!(matches!(err, MonitorError::Fetch(FetchError::Timeout(_))));
    }
}
