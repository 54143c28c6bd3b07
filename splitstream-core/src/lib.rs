//! # splitstream-core
//!
//! Core types for the splitstream pipeline.
//!
//! This crate provides the foundational types used throughout the
//! splitstream workspace:
//!
//! - **Messages**: role/content message model with a tagged text-or-parts
//!   content variant
//! - **Estimation**: approximate token cost heuristics for budgeting
//! - **Settings**: sampling controls forwarded to the completion backend
//! - **Usage**: token usage accounting
//! - **Identifiers**: request/chunk IDs for log correlation
//!
//! ## Example
//!
//! ```rust
//! use splitstream_core::{
//!     estimate::{estimate_message, estimate_messages},
//!     messages::Message,
//!     settings::GenerationSettings,
//!     usage::TokenUsage,
//! };
//!
//! let messages = vec![
//!     Message::user("What's the capital of France?"),
//!     Message::assistant("Paris."),
//! ];
//! let budgeted = estimate_messages(&messages);
//! assert!(budgeted >= estimate_message(&messages[0]));
//!
//! let settings = GenerationSettings::new().temperature(0.7);
//! let usage = TokenUsage::with_tokens(100, 42);
//! assert_eq!(usage.total_tokens, 142);
//! # let _ = settings;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod estimate;
pub mod identifier;
pub mod messages;
pub mod settings;
pub mod usage;

// Re-exports for convenience
pub use estimate::{
    estimate_message, estimate_messages, estimate_text, MESSAGE_OVERHEAD_TOKENS, TOKENS_PER_WORD,
};
pub use identifier::{generate_chunk_id, generate_request_id};
pub use messages::{ContentPart, FinishReason, Message, MessageContent, OpaqueSource, Role};
pub use settings::GenerationSettings;
pub use usage::TokenUsage;

/// Prelude module for common imports.
///
/// ```rust
/// use splitstream_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::estimate::{estimate_message, estimate_messages, estimate_text};
    pub use crate::messages::{
        ContentPart, FinishReason, Message, MessageContent, OpaqueSource, Role,
    };
    pub use crate::settings::GenerationSettings;
    pub use crate::usage::TokenUsage;
}
