//! Join, leave, message and administrative operations over the shared state.

use crate::chat::{ChatService, ServiceError, NO_RESPONSE};
use crate::context::ContextBuffer;
use crate::delivery::split_message;
use crate::home::{HomeChannel, HomeCheck};
use crate::instructions::{pinned_turn, Instructions};
use crate::permission::{require_admin, Caller, PermissionDenied};
use crate::session::{self, SessionError, SessionTable, SharedSessions};
use chrono::TimeDelta;
use olly_common::util::truncate_with_ellipsis;
use olly_common::{Config, Error};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Rejections surfaced to users. The display text is what they are shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error("You need to set a home channel (/set-home) to use this command!")]
    NotHome,

    #[error("You're already in the conversation!")]
    AlreadyMember,

    #[error("Conversation is full, try again later")]
    Full,

    #[error("You are not part of the conversation.")]
    NotMember,

    #[error("You need administrator permissions to use this command!")]
    Forbidden(#[from] PermissionDenied),
}

impl From<SessionError> for ConversationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::AlreadyMember(_) => Self::AlreadyMember,
            SessionError::Full { .. } => Self::Full,
            SessionError::NotFound(_) => Self::NotMember,
        }
    }
}

/// Runtime settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub capacity: usize,
    pub ttl: TimeDelta,
    pub trigger_prefix: String,
    pub chunk_limit: usize,
    pub generate_timeout: Duration,
    pub context_capacity: usize,
    /// Defaults file re-read on instruction reset
    pub instructions_path: Option<PathBuf>,
}

impl ConversationSettings {
    pub fn from_config(config: &Config) -> olly_common::Result<Self> {
        let ttl = TimeDelta::from_std(config.session.ttl())
            .map_err(|e| Error::Config(format!("session ttl out of range: {e}")))?;

        Ok(Self {
            capacity: config.session.capacity,
            ttl,
            trigger_prefix: config.chat.trigger_prefix.clone(),
            chunk_limit: config.chat.chunk_limit,
            generate_timeout: config.chat.generate_timeout(),
            context_capacity: config.context.turn_capacity(),
            instructions_path: Some(config.context.resolved_instructions_path()),
        })
    }
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            capacity: 5,
            ttl: TimeDelta::seconds(600),
            trigger_prefix: ">".into(),
            chunk_limit: 2000,
            generate_timeout: Duration::from_secs(300),
            context_capacity: 30,
            instructions_path: None,
        }
    }
}

/// Successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReceipt {
    pub user_id: String,
    pub occupancy: String,
}

/// One prompt/reply round trip with the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The user turn as appended to the context
    pub prompt: String,
    /// Reply split for delivery; never empty
    pub chunks: Vec<String>,
    /// Whether the backend failed and the placeholder was used
    pub degraded: bool,
}

/// What became of an inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Not addressed to the model, or posted outside the home channel.
    Ignored,
    /// Addressed to the model but no home channel exists yet.
    HomeUnset,
    /// Addressed to the model by someone who has not joined.
    NotMember,
    Replied(Exchange),
}

impl MessageOutcome {
    /// Text to send back for outcomes that are not a model reply.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::HomeUnset => Some(
                "Your server needs to set a home channel for conversations. Use **/set-home**",
            ),
            Self::NotMember => Some("You must use the /join-conversation command to participate."),
            Self::Ignored | Self::Replied(_) => None,
        }
    }
}

/// The shared conversation: its members, rolling context, instructions and
/// home channel.
pub struct Conversation {
    sessions: SharedSessions,
    context: Mutex<ContextBuffer>,
    instructions: RwLock<Option<Instructions>>,
    defaults: Option<Instructions>,
    home: RwLock<HomeChannel>,
    chat: Arc<dyn ChatService>,
    settings: ConversationSettings,
}

impl Conversation {
    /// Build a conversation whose instructions start at `defaults`.
    ///
    /// `None` means no instructions: the pinned turn is the framing alone.
    pub fn new(
        settings: ConversationSettings,
        defaults: Option<Instructions>,
        chat: Arc<dyn ChatService>,
    ) -> Self {
        let sessions = session::shared(SessionTable::new(settings.capacity));
        let context = ContextBuffer::new(pinned_turn(defaults.as_ref()), settings.context_capacity);

        Self {
            sessions,
            context: Mutex::new(context),
            instructions: RwLock::new(defaults.clone()),
            defaults,
            home: RwLock::new(HomeChannel::new()),
            chat,
            settings,
        }
    }

    /// Handle to the membership table, for the reaper.
    pub fn sessions(&self) -> SharedSessions {
        Arc::clone(&self.sessions)
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    pub async fn home_check(&self, channel_id: &str) -> HomeCheck {
        self.home.read().await.check(channel_id)
    }

    pub async fn home_channel(&self) -> Option<String> {
        self.home.read().await.get().map(str::to_string)
    }

    pub async fn occupancy(&self) -> String {
        self.sessions.lock().await.remaining_capacity()
    }

    /// The exact text that would be sent to the model with no new turn.
    pub async fn render_context(&self) -> String {
        self.context.lock().await.render()
    }

    /// Admit `user_id`. Only allowed from the home channel.
    pub async fn join(
        &self,
        user_id: &str,
        channel_id: &str,
    ) -> Result<JoinReceipt, ConversationError> {
        if self.home_check(channel_id).await != HomeCheck::Match {
            return Err(ConversationError::NotHome);
        }

        let mut table = self.sessions.lock().await;
        table.admit(user_id, self.settings.ttl)?;
        let occupancy = table.remaining_capacity();
        drop(table);

        tracing::info!(user_id, channel_id, occupancy = %occupancy, "Member joined");
        Ok(JoinReceipt {
            user_id: user_id.to_string(),
            occupancy,
        })
    }

    /// Remove `user_id`, returning the occupancy label afterwards.
    pub async fn leave(&self, user_id: &str) -> Result<String, ConversationError> {
        let mut table = self.sessions.lock().await;
        if !table.remove(user_id) {
            return Err(ConversationError::NotMember);
        }
        let occupancy = table.remaining_capacity();
        drop(table);

        tracing::info!(user_id, occupancy = %occupancy, "Member left");
        Ok(occupancy)
    }

    /// Route an inbound chat message.
    pub async fn handle_message(&self, user_id: &str, channel_id: &str, text: &str) -> MessageOutcome {
        let home = self.home_check(channel_id).await;
        if home == HomeCheck::Mismatch {
            return MessageOutcome::Ignored;
        }
        let Some(body) = text.strip_prefix(self.settings.trigger_prefix.as_str()) else {
            return MessageOutcome::Ignored;
        };
        if home == HomeCheck::Unset {
            return MessageOutcome::HomeUnset;
        }

        if self.sessions.lock().await.touch(user_id).is_err() {
            tracing::debug!(user_id, "Message from non-member");
            return MessageOutcome::NotMember;
        }

        MessageOutcome::Replied(self.exchange(user_id, body).await)
    }

    /// Send one user turn to the model and collect the reply.
    ///
    /// The context lock is not held while the model runs. A reset that lands
    /// during the call discards the reply instead of appending it.
    pub async fn exchange(&self, speaker: &str, body: &str) -> Exchange {
        let prompt = format!("**{speaker}** said: \"{body}\"");

        let (generation, rendered) = {
            let mut context = self.context.lock().await;
            let generation = context.generation();
            context.append(prompt.clone());
            (generation, context.render())
        };

        tracing::debug!(
            user_id = speaker,
            prompt = %truncate_with_ellipsis(body, 80),
            context_chars = rendered.chars().count(),
            "Sending turn to model"
        );

        let result = match tokio::time::timeout(
            self.settings.generate_timeout,
            self.chat.generate(&rendered),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ServiceError::Timeout(self.settings.generate_timeout)),
        };

        let (reply, degraded) = match result {
            Ok(response) => {
                let kept = self
                    .context
                    .lock()
                    .await
                    .append_if_generation(generation, response.clone());
                if !kept {
                    tracing::debug!(user_id = speaker, "Context was reset during generation; reply not kept");
                }
                (response, false)
            }
            Err(e) => {
                tracing::warn!(
                    user_id = speaker,
                    backend = self.chat.name(),
                    error = %e,
                    "Generation failed, replying with placeholder"
                );
                (NO_RESPONSE.to_string(), true)
            }
        };

        let mut chunks = split_message(&reply, self.settings.chunk_limit);
        if chunks.is_empty() {
            chunks.push(NO_RESPONSE.to_string());
        }

        Exchange {
            prompt,
            chunks,
            degraded,
        }
    }

    /// Designate `channel_id` as the home channel.
    pub async fn set_home(&self, caller: &Caller, channel_id: &str) -> Result<(), ConversationError> {
        require_admin(caller)?;
        self.home.write().await.set(channel_id);
        tracing::info!(user_id = %caller.user_id, channel_id, "Home channel set");
        Ok(())
    }

    /// Forget all conversation turns.
    pub async fn reset_history(&self, caller: &Caller) -> Result<(), ConversationError> {
        require_admin(caller)?;
        self.context.lock().await.reset();
        tracing::info!(user_id = %caller.user_id, "Conversation history reset");
        Ok(())
    }

    /// Replace the instructions, which also clears the history.
    ///
    /// Returns the rendered instructions.
    pub async fn edit_instructions(
        &self,
        caller: &Caller,
        instructions: Instructions,
    ) -> Result<String, ConversationError> {
        require_admin(caller)?;
        let rendered = self.apply_instructions(Some(instructions)).await;
        tracing::info!(user_id = %caller.user_id, "Instructions edited");
        Ok(rendered)
    }

    /// Restore the default instructions, which also clears the history.
    ///
    /// The defaults file is read again so edits to it take effect. If it
    /// cannot be read the instructions loaded at startup are used.
    pub async fn reset_instructions(&self, caller: &Caller) -> Result<String, ConversationError> {
        require_admin(caller)?;
        let defaults = self.reload_defaults();
        let rendered = self.apply_instructions(defaults).await;
        tracing::info!(user_id = %caller.user_id, "Instructions reset to defaults");
        Ok(rendered)
    }

    /// Current instructions as shown to users; empty when there are none.
    pub async fn view_instructions(&self) -> String {
        self.instructions
            .read()
            .await
            .as_ref()
            .map(Instructions::render)
            .unwrap_or_default()
    }

    fn reload_defaults(&self) -> Option<Instructions> {
        let Some(path) = self.settings.instructions_path.as_deref() else {
            return self.defaults.clone();
        };
        match Instructions::load_from(path) {
            Ok(loaded) => Some(loaded),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Default instructions unavailable, using startup copy"
                );
                self.defaults.clone()
            }
        }
    }

    async fn apply_instructions(&self, instructions: Option<Instructions>) -> String {
        let mut current = self.instructions.write().await;
        self.context
            .lock()
            .await
            .set_pinned(pinned_turn(instructions.as_ref()));
        *current = instructions;
        current.as_ref().map(Instructions::render).unwrap_or_default()
    }
}
