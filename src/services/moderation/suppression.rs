use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::models::{GroupId, Identity, MessageKey};
use crate::services::moderation::mute_registry::{MuteKey, MuteRegistry};

/// How suppressed messages get removed from the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuppressionMode {
    /// Delete each message as soon as it arrives
    #[default]
    Immediate,
    /// Park messages and delete them in periodic batches
    Sweep,
}

impl FromStr for SuppressionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "sweep" => Ok(Self::Sweep),
            other => Err(format!(
                "unknown suppression mode '{}' (expected 'immediate' or 'sweep')",
                other
            )),
        }
    }
}

impl fmt::Display for SuppressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("immediate"),
            Self::Sweep => f.write_str("sweep"),
        }
    }
}

/// A message that arrived from a muted identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressedMessage {
    pub group: GroupId,
    pub identity: Identity,
    pub message_key: MessageKey,
    /// Timestamp the transport stamped on the message
    pub received_at: DateTime<Utc>,
}

impl SuppressedMessage {
    fn into_delete(self) -> SuppressAction {
        SuppressAction::Delete {
            group: self.group,
            key: self.message_key,
        }
    }
}

/// What the caller should do with a suppressed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressAction {
    /// Delete this message from the channel now
    Delete { group: GroupId, key: MessageKey },
    /// Held for the next sweep; nothing to do now
    Deferred,
}

/// Decides whether inbound messages get suppressed, based on the mute registry
pub struct SuppressionSink {
    registry: MuteRegistry,
    mode: SuppressionMode,
    pending: DashMap<MuteKey, Vec<SuppressedMessage>>,
}

impl SuppressionSink {
    pub fn new(registry: MuteRegistry, mode: SuppressionMode) -> Self {
        Self {
            registry,
            mode,
            pending: DashMap::new(),
        }
    }

    pub fn mode(&self) -> SuppressionMode {
        self.mode
    }

    /// Check an inbound message. `None` means it passes through untouched.
    pub fn on_message(
        &self,
        group: &GroupId,
        identity: &Identity,
        message_key: &MessageKey,
    ) -> Option<SuppressAction> {
        self.on_message_at(group, identity, message_key, Utc::now())
    }

    /// Same as `on_message`, recording the transport's receive time
    pub fn on_message_at(
        &self,
        group: &GroupId,
        identity: &Identity,
        message_key: &MessageKey,
        received_at: DateTime<Utc>,
    ) -> Option<SuppressAction> {
        if !self.registry.is_muted(group, identity) {
            return None;
        }

        let record = SuppressedMessage {
            group: group.clone(),
            identity: identity.clone(),
            message_key: message_key.clone(),
            received_at,
        };

        match self.mode {
            SuppressionMode::Immediate => Some(record.into_delete()),
            SuppressionMode::Sweep => {
                debug!("Parked message {} from {} in {}", message_key, identity, group);
                self.pending
                    .entry(MuteKey::new(group, identity))
                    .or_default()
                    .push(record);
                Some(SuppressAction::Deferred)
            }
        }
    }

    /// Drain every parked message into delete actions
    pub fn sweep(&self) -> Vec<SuppressAction> {
        // Collect keys first; removing while iterating would deadlock the shard
        let keys: Vec<MuteKey> = self.pending.iter().map(|e| e.key().clone()).collect();

        let now = Utc::now();
        keys.into_iter()
            .filter_map(|key| self.pending.remove(&key))
            .flat_map(|(_, records)| records)
            .inspect(|record| {
                debug!(
                    "Sweeping message {} from {} (parked {}s)",
                    record.message_key,
                    record.identity,
                    (now - record.received_at).num_seconds()
                )
            })
            .map(SuppressedMessage::into_delete)
            .collect()
    }

    /// Parked messages of a single key, oldest first
    pub fn pending(&self, group: &GroupId, identity: &Identity) -> Vec<SuppressedMessage> {
        self.pending
            .get(&MuteKey::new(group, identity))
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Drain the parked messages of a single key
    pub fn take_pending(&self, group: &GroupId, identity: &Identity) -> Vec<SuppressAction> {
        self.pending
            .remove(&MuteKey::new(group, identity))
            .map(|(_, records)| records.into_iter().map(SuppressedMessage::into_delete).collect())
            .unwrap_or_default()
    }

    /// Number of messages waiting for a sweep
    pub fn pending_len(&self) -> usize {
        self.pending.iter().map(|e| e.value().len()).sum()
    }
}
