use std::sync::Arc;

use tracing::debug;

use crate::bot::data::Data;
use crate::commands;
use crate::models::InboundMessage;
use crate::services::moderation::mute_service;
use crate::utils::formatting::truncate;

/// What happened to an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sender is muted; the message is being deleted
    Suppressed,
    /// Handed to the command dispatcher
    Command,
    /// Plain chat, nothing to do
    Ignored,
}

/// Handle one inbound message.
///
/// Messages are handled in arrival order: the mute check and any command run
/// before the next message is looked at, so a `.mute` is in force for
/// whatever the target sends next.
pub async fn handle_message(data: &Arc<Data>, message: InboundMessage) -> Outcome {
    debug!(
        "Message {} from {} in {}: {}",
        message.key,
        message.sender,
        message.group,
        truncate(&message.text, 80)
    );

    if mute_service::suppress_if_muted(data, &message) {
        return Outcome::Suppressed;
    }

    if commands::dispatch(Arc::clone(data), message).await {
        Outcome::Command
    } else {
        Outcome::Ignored
    }
}
