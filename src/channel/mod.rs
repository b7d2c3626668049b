pub mod console;
#[cfg(test)]
pub mod memory;

use crate::bot::error::Error;
use crate::models::{GroupId, Identity, MessageKey};

/// Messaging primitives provided by the chat transport
#[async_trait::async_trait]
pub trait Channel: Send + Sync {
    /// The account the bot is logged in as
    fn bot_identity(&self) -> Identity;

    async fn send_message(
        &self,
        group: &GroupId,
        text: &str,
        mentions: &[Identity],
    ) -> Result<(), Error>;

    async fn delete_message(&self, group: &GroupId, key: &MessageKey) -> Result<(), Error>;
}
