//! Streaming errors.

use thiserror::Error;

/// Errors that can occur while consuming a completion stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Backend reported an error mid-stream.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Stream was interrupted before the finish event.
    #[error("Stream interrupted: {0}")]
    Interrupted(String),

    /// Request was cancelled by the caller.
    #[error("Stream cancelled")]
    Cancelled,

    /// Timeout waiting for the next delta.
    #[error("Timeout waiting for delta")]
    Timeout,

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StreamError {
    /// Create a backend error from any displayable error.
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    /// Check if the error is recoverable by retrying the chunk.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Interrupted(_))
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
