//! Olly Channels - Channel layer and service wiring for Olly.
//!
//! Inbound messages are parsed into commands or chat, routed through the
//! shared [`olly_core::Conversation`], and the replies are sent back on the
//! originating channel. Eviction notices from the reaper are posted to the
//! home channel.
//!
//! ```text
//! stdin → CliChannel → processor → ConversationHandler → Conversation
//!              ↑                                             │
//! stdout ←── send ←─── replies / eviction notices ←──────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod cli;
pub mod command;
pub mod display;
pub mod handler;
pub mod message;
pub mod service;
pub mod traits;

pub use cli::CliChannel;
pub use command::{Command, CommandError};
pub use handler::ConversationHandler;
pub use message::{ChannelMessage, OutgoingContent, OutgoingMessage};
pub use service::{build_conversation, run, spawn_eviction_notices, spawn_processor};
pub use traits::{Channel, ChannelError, ChannelResult, MessageHandler};
