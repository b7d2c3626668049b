use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::channel::Channel;
use crate::config::Settings;
use crate::services::moderation::mute_registry::{MuteEvent, MuteRegistry};
use crate::services::moderation::suppression::SuppressionSink;

/// Shared data available to all commands and handlers
pub struct Data {
    pub settings: Settings,
    /// Transport used for every outbound call
    pub channel: Arc<dyn Channel>,
    /// Active mutes, keyed by (group, identity)
    pub mutes: MuteRegistry,
    /// Decides which inbound messages get deleted
    pub suppression: SuppressionSink,
}

impl Data {
    /// Build shared state. The receiver yields unmute events and should be
    /// handed to `mute_service::spawn_unmute_notifier`.
    pub fn new(
        settings: Settings,
        channel: Arc<dyn Channel>,
    ) -> (Self, mpsc::UnboundedReceiver<MuteEvent>) {
        let (mutes, events) = MuteRegistry::new();
        let suppression = SuppressionSink::new(mutes.clone(), settings.suppression_mode);

        let data = Self {
            settings,
            channel,
            mutes,
            suppression,
        };
        (data, events)
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("active_mutes", &self.mutes.len())
            .field("pending_suppressions", &self.suppression.pending_len())
            .finish_non_exhaustive()
    }
}
