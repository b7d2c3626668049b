use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::channel::console::{self, ConsoleChannel};
use crate::channel::Channel;
use crate::config::Settings;
use crate::handlers::event_handler::handle_message;
use crate::models::Identity;
use crate::services::moderation::mute_service;

/// Run the bot on the console transport: JSON lines in on stdin, out on stdout
pub async fn run(settings: Settings) -> Result<(), Error> {
    let channel = Arc::new(ConsoleChannel::stdout(Identity::new(
        settings.bot_identity.as_str(),
    )));
    let input = BufReader::new(tokio::io::stdin());
    run_with(settings, channel, input).await
}

/// Run the bot against any channel, reading inbound JSON lines from `input`
/// until it closes
pub async fn run_with<R>(
    settings: Settings,
    channel: Arc<dyn Channel>,
    input: R,
) -> Result<(), Error>
where
    R: AsyncBufRead + Unpin,
{
    info!(
        "Bot running as {} (prefix '{}', mute {:?}, suppression {})",
        channel.bot_identity(),
        settings.command_prefix,
        settings.mute_duration,
        settings.suppression_mode
    );

    let (data, events) = Data::new(settings, channel);
    let data = Arc::new(data);

    // Start background task that announces expired and lifted mutes
    mute_service::spawn_unmute_notifier(data.clone(), events);
    info!("Started unmute notifier");

    // Start background sweep when suppressed messages are batched
    if mute_service::spawn_sweeper(data.clone()).is_some() {
        info!("Started suppression sweeper");
    }

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match console::parse_inbound(&line) {
            Ok(message) => {
                handle_message(&data, message).await;
            }
            Err(e) => {
                warn!("Skipping malformed input line: {}", e);
            }
        }
    }

    info!("Input closed, shutting down ({:?})", data);
    Ok(())
}
