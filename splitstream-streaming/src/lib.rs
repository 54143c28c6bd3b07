//! # splitstream-streaming
//!
//! Streaming support for splitstream.
//!
//! This crate provides the streaming contract between the completion
//! backend and the orchestrator's callers:
//!
//! - [`StreamEvent`]: incremental deltas and the terminal finish event
//! - [`StreamingResult`]: the value returned to callers, consumable
//!   incrementally or drained to a [`CollectedResponse`]
//! - [`StreamError`]: stream-level failures
//!
//! ## Example
//!
//! ```rust
//! use splitstream_core::TokenUsage;
//! use splitstream_streaming::StreamingResult;
//!
//! # tokio_test::block_on(async {
//! let result = StreamingResult::from_text("answer", TokenUsage::with_tokens(12, 3));
//! let collected = result.collect().await.unwrap();
//! assert_eq!(collected.text, "answer");
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod events;
pub mod result;

// Re-exports
pub use error::{StreamError, StreamResult};
pub use events::StreamEvent;
pub use result::{CollectedResponse, StreamingResult, TextStream};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        CollectedResponse, StreamError, StreamEvent, StreamResult, StreamingResult, TextStream,
    };
}
