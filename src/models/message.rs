use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::ids::{GroupId, Identity, MessageKey};

/// A message delivered by the transport
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub group: GroupId,
    pub sender: Identity,
    #[serde(default = "MessageKey::generate")]
    pub key: MessageKey,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub mentions: Vec<Identity>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(group: GroupId, sender: Identity, text: impl Into<String>) -> Self {
        Self {
            group,
            sender,
            key: MessageKey::generate(),
            text: text.into(),
            mentions: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_key(mut self, key: MessageKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_mentions(mut self, mentions: Vec<Identity>) -> Self {
        self.mentions = mentions;
        self
    }
}
