//! Generative text backend.
//!
//! The conversation treats the model as an opaque request/response service:
//! the flattened context goes in, generated text comes out.

mod ollama;

pub use ollama::OllamaChatService;

use async_trait::async_trait;
use std::time::Duration;

/// Text delivered in place of a reply when the backend fails or returns nothing.
pub const NO_RESPONSE: &str = "(No Response)";

/// Backend failure. Always recovered by the caller with [`NO_RESPONSE`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// A service that continues a conversation.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Generate a continuation of `context`.
    async fn generate(&self, context: &str) -> Result<String, ServiceError>;
}
