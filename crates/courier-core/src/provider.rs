//! Classified failures of external collaborators
//!
//! Every language-model and capability call fails with a [`ProviderError`].
//! The retry executor decides what to do from [`ProviderError::class`], never
//! by inspecting message text.

use std::fmt;

/// How the retry executor should treat a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Retry after an exponential backoff
    RateLimited,

    /// Retry after a linear delay
    Retriable,

    /// Give up immediately
    Fatal,
}

/// Error type for a single external call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Network/connection error
    Connection(String),

    /// API error with HTTP status
    Api { status: u16, message: String },

    /// Credentials rejected
    Unauthorized(String),

    /// Request timeout
    Timeout,

    /// Invalid request (bad parameters, malformed input)
    InvalidRequest(String),

    /// Rate limited, with an optional server hint in seconds
    RateLimited { retry_after: Option<u64> },

    /// Provider has no usable configuration
    NotConfigured(String),

    /// Internal error (unexpected response shape, worker panic)
    Internal(String),
}

impl ProviderError {
    /// Classify this failure for retry purposes
    pub fn class(&self) -> FailureClass {
        match self {
            ProviderError::RateLimited { .. } => FailureClass::RateLimited,
            ProviderError::Connection(_) | ProviderError::Timeout => FailureClass::Retriable,
            ProviderError::Api { status, .. } if *status >= 500 => FailureClass::Retriable,
            ProviderError::Api { .. }
            | ProviderError::Unauthorized(_)
            | ProviderError::InvalidRequest(_)
            | ProviderError::NotConfigured(_)
            | ProviderError::Internal(_) => FailureClass::Fatal,
        }
    }

    /// Backoff hint supplied by a rate-limited provider
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        ProviderError::Internal(msg.into())
    }

    /// Create a not-configured error
    pub fn not_configured(msg: impl Into<String>) -> Self {
        ProviderError::NotConfigured(msg.into())
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Connection(msg) => write!(f, "Connection error: {}", msg),
            ProviderError::Api { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            ProviderError::Unauthorized(msg) => write!(f, "Authentication failed: {}", msg),
            ProviderError::Timeout => write!(f, "Request timed out"),
            ProviderError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ProviderError::RateLimited { retry_after } => {
                if let Some(seconds) = retry_after {
                    write!(f, "Rate limited, retry after {} seconds", seconds)
                } else {
                    write!(f, "Rate limited")
                }
            }
            ProviderError::NotConfigured(msg) => write!(f, "Not configured: {}", msg),
            ProviderError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<ureq::Error> for ProviderError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let retry_after = response
                    .header("Retry-After")
                    .and_then(|v| v.trim().parse::<u64>().ok());
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                match status {
                    429 => ProviderError::RateLimited { retry_after },
                    401 | 403 => ProviderError::Unauthorized(message),
                    400 | 422 => ProviderError::InvalidRequest(message),
                    408 | 504 => ProviderError::Timeout,
                    _ => ProviderError::Api { status, message },
                }
            }
            ureq::Error::Transport(transport) => ProviderError::Connection(transport.to_string()),
        }
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::TimedOut {
            ProviderError::Timeout
        } else {
            ProviderError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Internal(format!("JSON error: {}", err))
    }
}

/// Run a blocking HTTP call on tokio's blocking pool
pub(crate) async fn run_blocking<T, F>(call: F) -> Result<T, ProviderError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ProviderError> + Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| ProviderError::internal(format!("worker failed: {}", e)))?
}
