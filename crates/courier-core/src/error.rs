//! Error types for Courier Core
//!
//! [`CourierError`] covers startup and wiring. Per-call failures of external
//! collaborators use [`crate::ProviderError`] instead, and never escape the
//! dialogue controller.

use thiserror::Error;

/// Result type for Courier Core operations
pub type Result<T> = std::result::Result<T, CourierError>;

/// Startup error
#[derive(Error, Debug)]
pub enum CourierError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Language model could not be set up
    #[error("LLM error: {0}")]
    Llm(String),
}

impl CourierError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        CourierError::Config(msg.into())
    }
}

impl From<crate::config::ConfigError> for CourierError {
    fn from(err: crate::config::ConfigError) -> Self {
        CourierError::Config(err.to_string())
    }
}

impl From<crate::ProviderError> for CourierError {
    fn from(err: crate::ProviderError) -> Self {
        CourierError::Llm(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::ProviderError;

    #[test]
    fn test_display() {
        let err = CourierError::config("missing bot token");
        assert_eq!(err.to_string(), "Configuration error: missing bot token");
    }

    #[test]
    fn test_from_config_error() {
        let err: CourierError = ConfigError::Invalid("max_attempts".into()).into();
        assert!(matches!(err, CourierError::Config(m) if m.contains("max_attempts")));
    }

    #[test]
    fn test_from_provider_error() {
        let err: CourierError = ProviderError::not_configured("llm.api_key is not set").into();
        assert_eq!(
            err.to_string(),
            "LLM error: Not configured: llm.api_key is not set"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(CourierError::from(io), CourierError::Io(_)));
    }
}
