//! Conversation membership with inactivity deadlines.

mod entry;
mod table;

pub use entry::SessionEntry;
pub use table::{SessionError, SessionTable};

use std::sync::Arc;
use tokio::sync::Mutex;

/// The membership table shared between handlers and the reaper.
pub type SharedSessions = Arc<Mutex<SessionTable>>;

/// Wrap a table for sharing.
pub fn shared(table: SessionTable) -> SharedSessions {
    Arc::new(Mutex::new(table))
}
