//! # splitstream
//!
//! Token-aware request shaping and chunked streaming for LLM
//! conversations.
//!
//! When a conversation exceeds what a model can take in one request,
//! splitstream estimates its token footprint, splits it into ordered
//! chunks that each fit the model's completion budget, streams the
//! chunks sequentially with carried-over context, and merges the
//! partial responses into a single result. Conversations that fit go
//! straight through untouched.
//!
//! ## Quick Start
//!
//! ```rust
//! use splitstream::prelude::*;
//! use splitstream::models::{MockBackend, ModelInfo, StaticModelRegistry};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! // Any `CompletionBackend` works; the mock stands in for a provider.
//! let backend = Arc::new(MockBackend::new("gpt-4o", "OpenAI").with_text("Hi there!"));
//! let registry = Arc::new(
//!     StaticModelRegistry::new().with_model(ModelInfo::new("gpt-4o", "OpenAI")),
//! );
//!
//! let orchestrator = StreamOrchestrator::builder()
//!     .backend(backend)
//!     .registry(registry)
//!     .default_model("gpt-4o")
//!     .default_provider("OpenAI")
//!     .build()
//!     .unwrap();
//!
//! let request = StreamRequest::new(vec![Message::user("Hello!")])
//!     .with_system_prompt("You are helpful.");
//! let response = orchestrator
//!     .stream_text(request)
//!     .await
//!     .unwrap()
//!     .collect()
//!     .await
//!     .unwrap();
//! assert_eq!(response.text, "Hi there!");
//! # });
//! ```
//!
//! ## Architecture
//!
//! splitstream is organized as a workspace of focused crates:
//!
//! - [`core`] - Messages, token estimation, generation settings, usage
//! - [`streaming`] - Stream events, streaming results, collection
//! - [`models`] - Limits catalog, backend trait, model registry, mocks
//! - [`pipeline`] - Chunking, summarization, the orchestrator

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Messages, token estimation, settings, and usage accounting.
pub use splitstream_core as core;

/// Streaming events and results.
pub use splitstream_streaming as streaming;

/// Model limits, backend trait, and model registry.
pub use splitstream_models as models;

/// Chunking and the stream orchestrator.
pub use splitstream_pipeline as pipeline;

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types, importable in one line.
pub mod prelude {
    // Core types
    pub use crate::core::{
        estimate_messages, estimate_text, ContentPart, FinishReason, GenerationSettings, Message,
        MessageContent, Role, TokenUsage,
    };

    // Streaming
    pub use crate::streaming::{
        CollectedResponse, StreamError, StreamEvent, StreamingResult, TextStream,
    };

    // Models
    pub use crate::models::{
        is_reasoning_model, BackendError, CompletionBackend, CompletionRequest, LimitsCatalog,
        ModelInfo, ModelLimits, ModelRegistry, TokenBudget,
    };

    // Pipeline
    pub use crate::pipeline::{
        chunk_messages, Chunk, OrchestratorError, StreamOrchestrator, StreamRequest,
    };
}

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of splitstream.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
