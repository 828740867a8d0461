//! Routes parsed commands and chat into the conversation.

use crate::command::{self, Command};
use crate::display;
use crate::message::{ChannelMessage, OutgoingMessage};
use crate::traits::{ChannelResult, MessageHandler};
use async_trait::async_trait;
use olly_core::{Conversation, ConversationError, MessageOutcome};
use std::sync::Arc;

/// Drives a [`Conversation`] from channel messages.
pub struct ConversationHandler {
    conversation: Arc<Conversation>,
}

impl ConversationHandler {
    pub fn new(conversation: Arc<Conversation>) -> Self {
        Self { conversation }
    }

    async fn run(&self, message: &ChannelMessage, cmd: Command) -> Result<Vec<OutgoingMessage>, ConversationError> {
        let convo = &self.conversation;
        let channel = message.channel_id.as_str();
        let user = message.user_id.as_str();
        let caller = message.caller();

        let replies = match cmd {
            Command::Join => {
                let receipt = convo.join(user, channel).await?;
                vec![display::joined(
                    channel,
                    user,
                    &receipt.occupancy,
                    &convo.settings().trigger_prefix,
                )]
            }
            Command::Leave => {
                let occupancy = convo.leave(user).await?;
                vec![display::left(channel, user, &occupancy)]
            }
            Command::SetHome => {
                convo.set_home(&caller, channel).await?;
                vec![display::home_set(channel)]
            }
            Command::ResetHistory => {
                convo.reset_history(&caller).await?;
                vec![display::history_reset(channel, user)]
            }
            Command::EditInstructions(instructions) => {
                convo.edit_instructions(&caller, instructions).await?;
                vec![display::instructions_edited(channel, user)]
            }
            Command::ResetInstructions => {
                let rendered = convo.reset_instructions(&caller).await?;
                vec![display::instructions(channel, &rendered)]
            }
            Command::ViewInstructions => {
                let rendered = convo.view_instructions().await;
                vec![display::instructions(channel, &rendered)]
            }
            Command::Chat(text) => match convo.handle_message(user, channel, &text).await {
                MessageOutcome::Replied(exchange) => exchange
                    .chunks
                    .into_iter()
                    .map(|chunk| OutgoingMessage::text(channel, chunk).in_reply_to(&message.id))
                    .collect(),
                other => other
                    .notice()
                    .map(|notice| vec![OutgoingMessage::text(channel, notice)])
                    .unwrap_or_default(),
            },
        };

        Ok(replies)
    }
}

#[async_trait]
impl MessageHandler for ConversationHandler {
    async fn handle(&self, message: ChannelMessage) -> ChannelResult<Vec<OutgoingMessage>> {
        let cmd = match command::parse(&message.text) {
            Ok(cmd) => cmd,
            Err(e) => {
                return Ok(vec![
                    OutgoingMessage::text(&message.channel_id, e.to_string()).in_reply_to(&message.id)
                ]);
            }
        };

        match self.run(&message, cmd).await {
            Ok(replies) => Ok(replies),
            Err(e) => {
                tracing::debug!(
                    trace_id = %message.trace_id,
                    user_id = %message.user_id,
                    channel_id = %message.channel_id,
                    reason = ?e,
                    "Request rejected"
                );
                Ok(vec![
                    OutgoingMessage::text(&message.channel_id, e.to_string()).in_reply_to(&message.id)
                ])
            }
        }
    }
}
