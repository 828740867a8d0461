//! Olly Core - Membership, inactivity eviction, and rolling context.
//!
//! A small, capacity-bounded set of participants is admitted into a shared
//! conversation with a generative model. Each participant holds an inactivity
//! window that is extended on activity and enforced by a periodic reaper.
//!
//! ## Architecture
//!
//! ```text
//! join/leave/message ──► Conversation ──► SessionTable (Mutex)
//!                              │      └──► ContextBuffer (Mutex) ──► ChatService
//!                              │
//! InactivityReaper (interval) ─┘──► EvictionSink ──► channel layer
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod chat;
pub mod context;
pub mod conversation;
pub mod delivery;
pub mod home;
pub mod instructions;
pub mod notify;
pub mod permission;
pub mod reaper;
pub mod session;

pub use chat::{ChatService, OllamaChatService, ServiceError, NO_RESPONSE};
pub use context::ContextBuffer;
pub use conversation::{
    Conversation, ConversationError, ConversationSettings, Exchange, JoinReceipt, MessageOutcome,
};
pub use delivery::split_message;
pub use home::{HomeChannel, HomeCheck};
pub use instructions::{Instructions, FRAMING};
pub use notify::{ChannelSink, Evicted, EvictionSink, LogSink, NotifyError};
pub use permission::{require_admin, Caller, PermissionDenied};
pub use reaper::{InactivityReaper, TickReport};
pub use session::{SessionEntry, SessionError, SessionTable, SharedSessions};
