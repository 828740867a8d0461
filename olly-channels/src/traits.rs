//! Channel traits for implementing channel adapters.

use crate::message::{ChannelMessage, OutgoingMessage};
use async_trait::async_trait;

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Channel error type.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Message send failed: {0}")]
    SendFailed(String),
}

/// Channel adapter trait.
///
/// A chat platform the conversation is reachable through.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name.
    fn name(&self) -> &'static str;

    /// Initialize the channel (connect, authenticate, etc.).
    async fn init(&mut self) -> ChannelResult<()>;

    /// Send a message to the channel, returning its platform id.
    async fn send(&self, message: OutgoingMessage) -> ChannelResult<String>;

    /// Deliver incoming messages to `callback` until the channel closes.
    async fn listen<F>(&self, callback: F) -> ChannelResult<()>
    where
        F: Fn(ChannelMessage) + Send + Sync + 'static;

    /// Check if the channel is healthy.
    async fn health_check(&self) -> ChannelResult<()>;

    /// Shutdown the channel gracefully.
    async fn shutdown(&self) -> ChannelResult<()>;
}

/// Turns an incoming message into the replies to send.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: ChannelMessage) -> ChannelResult<Vec<OutgoingMessage>>;
}
