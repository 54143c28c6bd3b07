//! # splitstream-models
//!
//! Model reference data and backend abstractions for splitstream:
//!
//! - [`LimitsCatalog`]: model/provider token-ceiling resolution with
//!   fuzzy matching and layered fallbacks
//! - [`CompletionBackend`]: the trait the orchestrator drives
//! - [`ModelRegistry`]: available-model lookup per provider
//! - [`MockBackend`] / [`FunctionBackend`]: test doubles
//!
//! ## Example
//!
//! ```rust
//! use splitstream_models::LimitsCatalog;
//!
//! let catalog = LimitsCatalog::builtin();
//! let limits = catalog.lookup("gpt-99-ultra", "OpenAI");
//! // unknown model, known provider -> provider defaults
//! assert_eq!(limits.max_completion_tokens, 4_096);
//!
//! let validation = catalog.validate("gpt-4o", "OpenAI", 500_000);
//! assert!(!validation.valid);
//! assert_eq!(validation.actual_limit, 16_384);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backend;
pub mod error;
pub mod limits;
pub mod mock;
pub mod registry;

// Re-exports
pub use backend::{BoxedBackend, CompletionBackend, CompletionRequest, TokenBudget};
pub use error::{BackendError, BackendResult};
pub use limits::{
    is_reasoning_model, ChunkEstimate, LimitsCatalog, ModelLimits, ResolvedLimits, TokenValidation,
};
pub use mock::{FunctionBackend, MockBackend, MockOutcome};
pub use registry::{BoxedRegistry, ModelInfo, ModelRegistry, StaticModelRegistry};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        is_reasoning_model, BackendError, BoxedBackend, CompletionBackend, CompletionRequest,
        LimitsCatalog, ModelInfo, ModelLimits, ModelRegistry, ResolvedLimits, StaticModelRegistry,
        TokenBudget, TokenValidation,
    };
}
