//! User-facing notices.

use crate::message::{OutgoingContent, OutgoingMessage};
use olly_core::Evicted;

const BOT_NAME: &str = "Olly";

pub fn joined(channel_id: &str, user: &str, occupancy: &str, trigger_prefix: &str) -> OutgoingMessage {
    OutgoingMessage::notice(
        channel_id,
        format!("{user} has joined the conversation!"),
        Some(format!("Begin messages with a '{trigger_prefix}'")),
        Some(occupancy.to_string()),
    )
}

pub fn left(channel_id: &str, user: &str, occupancy: &str) -> OutgoingMessage {
    OutgoingMessage::notice(
        channel_id,
        format!("{user} has left the conversation!"),
        None,
        Some(occupancy.to_string()),
    )
}

pub fn evicted(channel_id: &str, evicted: &Evicted) -> OutgoingMessage {
    OutgoingMessage::notice(
        channel_id,
        format!("⚠️ **{}** was kicked due to inactivity!", evicted.id),
        None,
        Some(evicted.occupancy.clone()),
    )
}

pub fn home_set(channel_id: &str) -> OutgoingMessage {
    OutgoingMessage::text(channel_id, format!("Home channel set to {channel_id}"))
}

pub fn history_reset(channel_id: &str, user: &str) -> OutgoingMessage {
    OutgoingMessage::notice(
        channel_id,
        format!("{user} has deleted {BOT_NAME}'s conversation history!"),
        Some(format!("{BOT_NAME} won't remember any prior conversation.")),
        None,
    )
}

pub fn instructions_edited(channel_id: &str, user: &str) -> OutgoingMessage {
    OutgoingMessage::notice(
        channel_id,
        format!("{user} has edited {BOT_NAME}'s instructions!"),
        Some("Use **/view-instructions** to see the changes!".to_string()),
        None,
    )
}

pub fn instructions(channel_id: &str, rendered: &str) -> OutgoingMessage {
    OutgoingMessage::notice(
        channel_id,
        format!("{BOT_NAME}'s instructions:"),
        Some(rendered.to_string()),
        Some(
            "use /edit-instructions to modify, or /reset-instructions to reset to default."
                .to_string(),
        ),
    )
}

/// Plain-text rendering for terminals and logs.
pub fn render_plain(content: &OutgoingContent) -> String {
    match content {
        OutgoingContent::Text { text } => text.clone(),
        OutgoingContent::Notice {
            title,
            description,
            footer,
        } => {
            let mut out = title.clone();
            for line in [description, footer].into_iter().flatten() {
                out.push('\n');
                out.push_str(line);
            }
            out
        }
    }
}
