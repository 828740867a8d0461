//! Service wiring: conversation, reaper, channel and message processing.

use crate::cli::CliChannel;
use crate::display;
use crate::handler::ConversationHandler;
use crate::message::ChannelMessage;
use crate::traits::{Channel, MessageHandler};
use anyhow::Result;
use olly_common::Config;
use olly_core::{
    ChannelSink, Conversation, ConversationSettings, Evicted, InactivityReaper, Instructions,
    OllamaChatService,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Load the startup instructions. `None` if the defaults file is unusable.
pub fn load_instructions(config: &Config) -> Option<Instructions> {
    let path = config.context.resolved_instructions_path();
    match Instructions::load_from(&path) {
        Ok(instructions) => Some(instructions),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Default instructions unavailable, starting with none"
            );
            None
        }
    }
}

/// Build the conversation from configuration.
pub fn build_conversation(config: &Config) -> Result<Arc<Conversation>> {
    let settings = ConversationSettings::from_config(config)?;
    let chat = OllamaChatService::from_config(&config.ollama);
    tracing::info!(
        base_url = %chat.base_url(),
        model = %chat.model(),
        "Using Ollama backend"
    );

    Ok(Arc::new(Conversation::new(
        settings,
        load_instructions(config),
        Arc::new(chat),
    )))
}

/// Post eviction notices to the home channel.
pub fn spawn_eviction_notices<C>(
    conversation: Arc<Conversation>,
    channel: Arc<C>,
    mut rx: mpsc::Receiver<Evicted>,
) -> JoinHandle<()>
where
    C: Channel + 'static,
{
    tokio::spawn(async move {
        while let Some(evicted) = rx.recv().await {
            let Some(home) = conversation.home_channel().await else {
                tracing::warn!(user_id = %evicted.id, "No home channel for eviction notice");
                continue;
            };
            if let Err(e) = channel.send(display::evicted(&home, &evicted)).await {
                tracing::warn!(user_id = %evicted.id, error = %e, "Failed to post eviction notice");
            }
        }
    })
}

/// Handle each inbound message in its own task and send the replies.
pub fn spawn_processor<C, H>(
    channel: Arc<C>,
    handler: Arc<H>,
    mut rx: mpsc::Receiver<ChannelMessage>,
) -> JoinHandle<()>
where
    C: Channel + 'static,
    H: MessageHandler + 'static,
{
    tokio::spawn(async move {
        tracing::info!("Message processor started");

        while let Some(message) = rx.recv().await {
            let channel = channel.clone();
            let handler = handler.clone();

            tokio::spawn(async move {
                let trace_id = message.trace_id.clone();
                tracing::debug!(
                    trace_id = %trace_id,
                    user_id = %message.user_id,
                    channel_id = %message.channel_id,
                    "Processing message"
                );

                let replies = match handler.handle(message).await {
                    Ok(replies) => replies,
                    Err(e) => {
                        tracing::error!(trace_id = %trace_id, error = %e, "Failed to process message");
                        return;
                    }
                };
                for reply in replies {
                    if let Err(e) = channel.send(reply).await {
                        tracing::warn!(trace_id = %trace_id, error = %e, "Failed to send reply");
                    }
                }
            });
        }

        tracing::info!("Message processor stopped");
    })
}

/// Run the service on the CLI channel until stdin closes or Ctrl-C.
pub async fn run(config: &Config) -> Result<()> {
    let conversation = build_conversation(config)?;

    let (sink, eviction_rx) = ChannelSink::channel(32);
    let reaper = InactivityReaper::new(
        conversation.sessions(),
        Arc::new(sink),
        config.session.reaper_interval(),
    )
    .spawn();

    let mut cli = CliChannel::new(config.access.clone());
    cli.init().await?;
    cli.health_check().await?;
    let channel = Arc::new(cli);

    let notices = spawn_eviction_notices(conversation.clone(), channel.clone(), eviction_rx);

    let (tx, rx) = mpsc::channel::<ChannelMessage>(64);
    let handler = Arc::new(ConversationHandler::new(conversation.clone()));
    let processor = spawn_processor(channel.clone(), handler, rx);

    tracing::info!(
        capacity = config.session.capacity,
        ttl_secs = config.session.ttl_secs,
        "Olly is listening on the terminal"
    );

    let listen = channel.listen(move |message| {
        if let Err(e) = tx.try_send(message) {
            tracing::warn!(error = %e, "Dropping inbound message");
        }
    });

    tokio::select! {
        result = listen => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutdown signal received"),
    }

    reaper.abort();
    notices.abort();
    processor.abort();
    channel.shutdown().await?;

    Ok(())
}
