//! CLI channel adapter for interactive terminal sessions.
//!
//! Each input line is one message, optionally addressed with a channel and
//! an author:
//!
//! ```text
//! #general @alice /join-conversation
//! #general @alice >hello everyone
//! ```
//!
//! Omitted parts fall back to the channel's defaults.

use crate::display::render_plain;
use crate::message::{ChannelMessage, OutgoingMessage};
use crate::traits::{Channel, ChannelError, ChannelResult};
use async_trait::async_trait;
use olly_common::AccessConfig;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// CLI channel - stdin/stdout, always available.
pub struct CliChannel {
    access: AccessConfig,
    default_channel: String,
    default_user: String,
}

impl CliChannel {
    pub fn new(access: AccessConfig) -> Self {
        Self {
            access,
            default_channel: "cli".to_string(),
            default_user: "user".to_string(),
        }
    }

    pub fn with_defaults(mut self, channel_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.default_channel = channel_id.into();
        self.default_user = user_id.into();
        self
    }

    /// Turn one input line into a message. Blank lines yield nothing.
    pub fn parse_line(&self, line: &str) -> Option<ChannelMessage> {
        let mut rest = line.trim();
        let mut channel = self.default_channel.as_str();
        let mut user = self.default_user.as_str();

        if let Some((tag, tail)) = split_tag(rest, '#') {
            channel = tag;
            rest = tail;
        }
        if let Some((tag, tail)) = split_tag(rest, '@') {
            user = tag;
            rest = tail;
        }
        if rest.is_empty() {
            return None;
        }

        let is_admin = self.access.is_admin(user);
        Some(ChannelMessage::new(channel, user, rest).with_admin(is_admin))
    }

    /// Feed each line of `reader` to `callback` until EOF or `/quit`.
    async fn read_lines<R, F>(&self, reader: R, callback: F) -> ChannelResult<()>
    where
        R: AsyncBufRead + Unpin,
        F: Fn(ChannelMessage),
    {
        let mut lines = reader.lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => return Err(ChannelError::Connection(format!("reading input: {e}"))),
            };
            let line = line.trim();
            if line == "/quit" || line == "/exit" {
                break;
            }
            if let Some(msg) = self.parse_line(line) {
                callback(msg);
            }
        }
        Ok(())
    }
}

async fn write_line<W>(writer: &mut W, line: &str) -> ChannelResult<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    };
    written
        .await
        .map_err(|e| ChannelError::SendFailed(format!("writing output: {e}")))
}

fn split_tag(input: &str, marker: char) -> Option<(&str, &str)> {
    let tail = input.strip_prefix(marker)?;
    let (tag, rest) = tail.split_once(char::is_whitespace).unwrap_or((tail, ""));
    if tag.is_empty() {
        return None;
    }
    Some((tag, rest.trim_start()))
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &'static str {
        "cli"
    }

    async fn init(&mut self) -> ChannelResult<()> {
        Ok(())
    }

    async fn send(&self, message: OutgoingMessage) -> ChannelResult<String> {
        let line = format!("[#{}] {}", message.channel_id, render_plain(&message.content));
        write_line(&mut io::stdout(), &line).await?;
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn listen<F>(&self, callback: F) -> ChannelResult<()>
    where
        F: Fn(ChannelMessage) + Send + Sync + 'static,
    {
        self.read_lines(BufReader::new(io::stdin()), callback).await
    }

    async fn health_check(&self) -> ChannelResult<()> {
        Ok(())
    }

    async fn shutdown(&self) -> ChannelResult<()> {
        Ok(())
    }
}
