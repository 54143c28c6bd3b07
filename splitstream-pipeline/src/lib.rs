//! # splitstream-pipeline
//!
//! Conversation chunking and the stream orchestrator:
//!
//! - [`chunk_messages`]: greedy conversation packing with
//!   sentence-level splitting of oversized messages
//! - [`summarize_results`] / [`merge_results`]: chunk-context digests
//!   and response merging
//! - [`sanitize_message`] / [`extract_model_hint`]: reasoning-block
//!   stripping and in-message model/provider annotations
//! - [`StreamOrchestrator`]: model resolution, budget clamping,
//!   reasoning-model shaping and the sequential chunk loop
//!
//! ## Example
//!
//! ```rust
//! use splitstream_core::Message;
//! use splitstream_models::{MockBackend, ModelInfo, StaticModelRegistry};
//! use splitstream_pipeline::{StreamOrchestrator, StreamRequest};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let backend = Arc::new(MockBackend::new("gpt-4o", "OpenAI").with_text("Hello!"));
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
//! let request = StreamRequest::new(vec![Message::user("Hi!")])
//!     .with_system_prompt("You are helpful.");
//! let response = orchestrator
//!     .stream_text(request)
//!     .await
//!     .unwrap()
//!     .collect()
//!     .await
//!     .unwrap();
//! assert_eq!(response.text, "Hello!");
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod chunker;
pub mod error;
pub mod orchestrator;
pub mod sanitize;
pub mod summary;

// Re-exports
pub use chunker::{chunk_messages, Chunk};
pub use error::{OrchestratorError, OrchestratorResult};
pub use orchestrator::{
    StreamOrchestrator, StreamOrchestratorBuilder, StreamRequest, DEFAULT_MODEL, DEFAULT_PROVIDER,
};
pub use sanitize::{extract_model_hint, sanitize_message, sanitize_text, ModelHint};
pub use summary::{merge_results, summarize_results};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        chunk_messages, merge_results, summarize_results, Chunk, OrchestratorError,
        OrchestratorResult, StreamOrchestrator, StreamRequest,
    };
}
