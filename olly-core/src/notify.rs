//! Eviction notifications.
//!
//! The reaper reports every eviction to an [`EvictionSink`]. The channel layer
//! usually listens on a [`ChannelSink`] and renders a notice in the home channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A member removed for inactivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evicted {
    /// Identity of the removed member
    pub id: String,
    /// Occupancy label taken right after the removal
    pub occupancy: String,
}

/// Notification delivery failure.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification receiver is closed")]
    Closed,

    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Destination for eviction notices.
#[async_trait]
pub trait EvictionSink: Send + Sync {
    async fn notify(&self, evicted: &Evicted) -> Result<(), NotifyError>;
}

/// Forwards evictions over a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Evicted>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Evicted>) -> Self {
        Self { tx }
    }

    /// Create a sink together with its receiving end.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Evicted>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl EvictionSink for ChannelSink {
    async fn notify(&self, evicted: &Evicted) -> Result<(), NotifyError> {
        self.tx
            .send(evicted.clone())
            .await
            .map_err(|_| NotifyError::Closed)
    }
}

/// Writes evictions to the log and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl EvictionSink for LogSink {
    async fn notify(&self, evicted: &Evicted) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = %evicted.id,
            occupancy = %evicted.occupancy,
            "Member evicted for inactivity"
        );
        Ok(())
    }
}
