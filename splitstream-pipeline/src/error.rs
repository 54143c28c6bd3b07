//! Orchestration errors.

use splitstream_models::BackendError;
use splitstream_streaming::StreamError;
use thiserror::Error;

/// Errors surfaced to callers of the orchestrator.
///
/// Deliberately small: per-chunk backend failures on the chunked path
/// are folded into the response text rather than raised, so the only
/// hard failures are configuration problems, single-shot backend
/// errors, and cancellation.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The resolved provider has no models at all; nothing can proceed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backend failed on the single-shot path, where there is no
    /// merge step to absorb it.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The single-shot stream failed while being returned.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// The caller cancelled between chunks.
    #[error("Request cancelled")]
    Cancelled,
}

/// Result type for orchestration.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
