//! Olly Common - Shared configuration, errors, and logging for the Olly service.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Error types and handling utilities
//! - Logging setup and trace id helpers
//! - Small utility functions shared by the other crates

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;

pub use config::{
    AccessConfig, ChatConfig, Config, ContextConfig, ObservabilityConfig, OllamaConfig,
    SessionConfig,
};
pub use error::{Error, Result};
