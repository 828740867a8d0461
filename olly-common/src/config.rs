//! Configuration management for the Olly service.
//!
//! The service reads a single configuration file at `~/.olly/config.json`.
//! Values are fixed for the lifetime of the process; there is no reload.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (OLLY_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `OLLY_LOG_LEVEL` → observability.log_level
//! - `OLLY_LOG_FORMAT` → observability.log_format
//! - `OLLY_SESSION_CAPACITY` → session.capacity
//! - `OLLY_SESSION_TTL` → session.ttl_secs (accepts `30s`, `10m`, `1h`)
//! - `OLLY_REAPER_INTERVAL` → session.reaper_interval_secs
//! - `OLLY_INSTRUCTIONS_PATH` → context.instructions_path
//! - `OLLAMA_BASE_URL` → ollama.base_url
//! - `OLLY_MODEL` → ollama.model
//! - `OLLY_ADMINS` → access.admins (comma separated)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::util::parse_duration_secs;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".olly"),
        |dirs| dirs.home_dir().join(".olly"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Session Configuration
// ============================================================================

/// Membership and inactivity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of simultaneous members (default: 5)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Inactivity window granted on join, in seconds (default: 600)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Cadence of the inactivity reaper, in seconds (default: 60)
    #[serde(default = "default_reaper_interval_secs")]
    pub reaper_interval_secs: u64,
}

fn default_capacity() -> usize {
    5
}

fn default_ttl_secs() -> u64 {
    600
}

fn default_reaper_interval_secs() -> u64 {
    60
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
            reaper_interval_secs: default_reaper_interval_secs(),
        }
    }
}

// ============================================================================
// Context Configuration
// ============================================================================

/// Rolling conversation context settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Total number of context entries, pinned framing included (default: 31)
    #[serde(default = "default_context_length")]
    pub length: usize,

    /// File holding the default personality, goal and restriction lines
    #[serde(default = "default_instructions_path")]
    pub instructions_path: String,
}

fn default_context_length() -> usize {
    31
}

fn default_instructions_path() -> String {
    "default_instructions.txt".into()
}

impl ContextConfig {
    /// Number of non-pinned turns the buffer keeps.
    pub fn turn_capacity(&self) -> usize {
        self.length.saturating_sub(1)
    }

    /// Instructions path with a leading `~` expanded.
    pub fn resolved_instructions_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.instructions_path).into_owned())
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            length: default_context_length(),
            instructions_path: default_instructions_path(),
        }
    }
}

// ============================================================================
// Chat Configuration
// ============================================================================

/// Message handling and delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Prefix a message must start with to reach the model (default: ">")
    #[serde(default = "default_trigger_prefix")]
    pub trigger_prefix: String,

    /// Maximum characters per delivered message (default: 2000)
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,

    /// Upper bound on a single generate call, in seconds (default: 300)
    #[serde(default = "default_generate_timeout_secs")]
    pub generate_timeout_secs: u64,
}

fn default_trigger_prefix() -> String {
    ">".into()
}

fn default_chunk_limit() -> usize {
    2000
}

fn default_generate_timeout_secs() -> u64 {
    300
}

impl ChatConfig {
    pub fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            trigger_prefix: default_trigger_prefix(),
            chunk_limit: default_chunk_limit(),
            generate_timeout_secs: default_generate_timeout_secs(),
        }
    }
}

// ============================================================================
// Ollama Configuration
// ============================================================================

/// Local Ollama backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama API base URL
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Model name passed to `/api/generate`
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_ollama_timeout")]
    pub timeout_secs: u64,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}

fn default_ollama_model() -> String {
    "llama3".into()
}

fn default_ollama_timeout() -> u64 {
    300 // local models can be slow
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_ollama_timeout(),
        }
    }
}

// ============================================================================
// Access Configuration
// ============================================================================

/// Who may run administrative commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// User ids treated as administrators
    #[serde(default)]
    pub admins: Vec<String>,
}

impl AccessConfig {
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|a| a == user_id)
    }
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub context: ContextConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub access: AccessConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides, then validate.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("OLLY_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("OLLY_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if let Ok(capacity) = std::env::var("OLLY_SESSION_CAPACITY") {
            match capacity.parse() {
                Ok(c) => self.session.capacity = c,
                Err(_) => tracing::warn!(value = %capacity, "Ignoring invalid OLLY_SESSION_CAPACITY"),
            }
        }
        if let Ok(ttl) = std::env::var("OLLY_SESSION_TTL") {
            match parse_duration_secs(&ttl) {
                Ok(secs) => self.session.ttl_secs = secs,
                Err(e) => tracing::warn!(error = %e, "Ignoring invalid OLLY_SESSION_TTL"),
            }
        }
        if let Ok(interval) = std::env::var("OLLY_REAPER_INTERVAL") {
            match parse_duration_secs(&interval) {
                Ok(secs) => self.session.reaper_interval_secs = secs,
                Err(e) => tracing::warn!(error = %e, "Ignoring invalid OLLY_REAPER_INTERVAL"),
            }
        }

        if let Ok(path) = std::env::var("OLLY_INSTRUCTIONS_PATH") {
            self.context.instructions_path = path;
        }

        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            self.ollama.base_url = url;
        }
        if let Ok(model) = std::env::var("OLLY_MODEL") {
            self.ollama.model = model;
        }

        if let Ok(admins) = std::env::var("OLLY_ADMINS") {
            self.access.admins = admins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.session.capacity == 0 {
            return Err(Error::Config("session.capacity must be at least 1".into()));
        }
        if self.session.ttl_secs == 0 {
            return Err(Error::Config("session.ttl_secs must be positive".into()));
        }
        if self.session.reaper_interval_secs == 0 {
            return Err(Error::Config(
                "session.reaper_interval_secs must be positive".into(),
            ));
        }
        if self.context.length < 2 {
            return Err(Error::Config(
                "context.length must leave room for at least one turn".into(),
            ));
        }
        if self.chat.chunk_limit == 0 {
            return Err(Error::Config("chat.chunk_limit must be positive".into()));
        }
        if self.chat.trigger_prefix.is_empty() {
            return Err(Error::Config("chat.trigger_prefix must not be empty".into()));
        }
        Ok(())
    }
}
