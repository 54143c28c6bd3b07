//! Backend error types.

use std::time::Duration;
use thiserror::Error;

/// Errors a completion backend can produce.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP-level error from the provider.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// API-level error.
    #[error("API error: {message}")]
    Api {
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Request timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested retry delay.
        retry_after: Option<Duration>,
    },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request cancelled by the caller.
    #[error("Request cancelled")]
    Cancelled,

    /// Model not found.
    #[error("Model not found: {0}")]
    NotFound(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackendError {
    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Timeout(_) => true,
            BackendError::RateLimited { .. } => true,
            BackendError::Connection(_) => true,
            BackendError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: None,
        }
    }

    /// Create an API error with code.
    pub fn api_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(BackendError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(BackendError::RateLimited { retry_after: None }.is_retryable());
        assert!(BackendError::connection("reset").is_retryable());
        assert!(BackendError::http(503, "unavailable").is_retryable());

        assert!(!BackendError::http(400, "bad request").is_retryable());
        assert!(!BackendError::api("nope").is_retryable());
        assert!(!BackendError::Cancelled.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = BackendError::api_with_code("quota exceeded", "insufficient_quota");
        assert!(err.to_string().contains("quota exceeded"));

        let err = BackendError::http(404, "not found");
        assert!(err.to_string().contains("404"));
    }
}
