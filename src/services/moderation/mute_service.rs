use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::replies;
use crate::models::{GroupId, Identity, InboundMessage, MessageKey};
use crate::services::moderation::mute_registry::{MuteEntry, MuteEvent};
use crate::services::moderation::suppression::{SuppressAction, SuppressionMode};

/// Mute a user in a group and announce it
pub async fn mute_user(
    data: &Arc<Data>,
    group: &GroupId,
    target: &Identity,
    duration: Duration,
) -> Result<MuteEntry, Error> {
    let entry = data.mutes.mute(group, target, duration)?;

    data.channel
        .send_message(group, &replies::muted(target, duration), &[target.clone()])
        .await?;

    Ok(entry)
}

/// Lift a mute early. The "no longer muted" notice is sent by the notifier
/// when the resulting event arrives.
pub fn unmute_user(data: &Arc<Data>, group: &GroupId, target: &Identity) -> bool {
    data.mutes.unmute(group, target)
}

/// Suppress an inbound message if its sender is muted.
///
/// Returns true when the message was suppressed and must not be processed
/// any further. Deletion runs on its own task and never blocks the caller.
pub fn suppress_if_muted(data: &Arc<Data>, message: &InboundMessage) -> bool {
    match data.suppression.on_message_at(
        &message.group,
        &message.sender,
        &message.key,
        message.timestamp,
    ) {
        Some(SuppressAction::Delete { group, key }) => {
            debug!("Suppressing message {} from {} in {}", key, message.sender, group);
            dispatch_delete(data, group, key);
            true
        }
        Some(SuppressAction::Deferred) => true,
        None => false,
    }
}

fn dispatch_actions(data: &Arc<Data>, actions: Vec<SuppressAction>) {
    for action in actions {
        if let SuppressAction::Delete { group, key } = action {
            dispatch_delete(data, group, key);
        }
    }
}

/// Delete a message in the background; failures are logged, never retried
fn dispatch_delete(data: &Arc<Data>, group: GroupId, key: MessageKey) {
    let channel = Arc::clone(&data.channel);
    tokio::spawn(async move {
        if let Err(e) = channel.delete_message(&group, &key).await {
            warn!("Failed to delete message {} in {}: {:?}", key, group, e);
        }
    });
}

/// Start the background task that turns unmute events into group notices
pub fn spawn_unmute_notifier(
    data: Arc<Data>,
    mut events: mpsc::UnboundedReceiver<MuteEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let MuteEvent::Unmuted {
                group,
                identity,
                reason,
            } = event;

            debug!("Unmute event for {} in {} ({:?})", identity, group, reason);

            // Anything parked for this user still has to go
            dispatch_actions(&data, data.suppression.take_pending(&group, &identity));

            // One task per notice
            let channel = Arc::clone(&data.channel);
            tokio::spawn(async move {
                let text = replies::unmuted(&identity);
                if let Err(e) = channel
                    .send_message(&group, &text, std::slice::from_ref(&identity))
                    .await
                {
                    error!("Failed to announce unmute of {} in {}: {:?}", identity, group, e);
                }
            });
        }

        warn!("Unmute notifier stopped");
    })
}

/// Start the periodic sweep when running in sweep mode
pub fn spawn_sweeper(data: Arc<Data>) -> Option<JoinHandle<()>> {
    if data.suppression.mode() != SuppressionMode::Sweep {
        return None;
    }

    let period = data.settings.sweep_interval;
    info!("Sweeping suppressed messages every {:?}", period);

    Some(tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            ticker.tick().await;

            let actions = data.suppression.sweep();
            if !actions.is_empty() {
                debug!("Sweeping {} suppressed messages", actions.len());
                dispatch_actions(&data, actions);
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::memory::MemoryChannel;
    use crate::config::Settings;
    use tokio::time::advance;

    fn group() -> GroupId {
        GroupId::new("120363025246125888@g.us")
    }

    fn user(n: &str) -> Identity {
        Identity::new(format!("{}@s.whatsapp.net", n))
    }

    fn setup(mode: SuppressionMode) -> (Arc<Data>, Arc<MemoryChannel>, JoinHandle<()>) {
        let channel = Arc::new(MemoryChannel::new("1000@s.whatsapp.net"));
        let settings = Settings {
            suppression_mode: mode,
            ..Settings::default()
        };
        let (data, events) = Data::new(settings, channel.clone());
        let data = Arc::new(data);
        let notifier = spawn_unmute_notifier(data.clone(), events);
        (data, channel, notifier)
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mute_announces_and_expires() {
        let (data, channel, _notifier) = setup(SuppressionMode::Immediate);
        let target = user("2001");

        mute_user(&data, &group(), &target, Duration::from_secs(300)).await.unwrap();
        assert_eq!(channel.texts(), vec!["🔇 @2001 has been muted for 5 minutes."]);
        assert_eq!(channel.sent()[0].mentions, vec![target.clone()]);

        advance(Duration::from_secs(301)).await;
        settle().await;

        assert!(!data.mutes.is_muted(&group(), &target));
        assert_eq!(channel.texts().last().unwrap(), "🔊 @2001 is no longer muted.");
        assert_eq!(channel.sent().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suppress_deletes_muted_messages_only() {
        let (data, channel, _notifier) = setup(SuppressionMode::Immediate);
        mute_user(&data, &group(), &user("2001"), Duration::from_secs(300)).await.unwrap();

        let muted = InboundMessage::new(group(), user("2001"), "hello")
            .with_key(MessageKey::new("k1"));
        let free = InboundMessage::new(group(), user("2002"), "hello")
            .with_key(MessageKey::new("k2"));

        assert!(suppress_if_muted(&data, &muted));
        assert!(!suppress_if_muted(&data, &free));
        settle().await;

        assert_eq!(channel.deleted(), vec![(group(), MessageKey::new("k1"))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_failure_keeps_mute() {
        let (data, channel, _notifier) = setup(SuppressionMode::Immediate);
        channel.fail_deletes(true);
        mute_user(&data, &group(), &user("2001"), Duration::from_secs(300)).await.unwrap();

        let first = InboundMessage::new(group(), user("2001"), "one");
        let second = InboundMessage::new(group(), user("2001"), "two");
        assert!(suppress_if_muted(&data, &first));
        settle().await;
        assert!(suppress_if_muted(&data, &second));
        settle().await;

        assert!(channel.deleted().is_empty());
        assert!(data.mutes.is_muted(&group(), &user("2001")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_unmute_announces_once() {
        let (data, channel, _notifier) = setup(SuppressionMode::Immediate);
        mute_user(&data, &group(), &user("2001"), Duration::from_secs(300)).await.unwrap();

        assert!(unmute_user(&data, &group(), &user("2001")));
        assert!(!unmute_user(&data, &group(), &user("2001")));

        advance(Duration::from_secs(600)).await;
        settle().await;

        let notices: Vec<String> = channel
            .texts()
            .into_iter()
            .filter(|t| t.starts_with("🔊"))
            .collect();
        assert_eq!(notices.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_mode_deletes_on_tick() {
        let (data, channel, _notifier) = setup(SuppressionMode::Sweep);
        let _sweeper = spawn_sweeper(data.clone()).expect("sweep mode starts a sweeper");
        mute_user(&data, &group(), &user("2001"), Duration::from_secs(300)).await.unwrap();

        let msg = InboundMessage::new(group(), user("2001"), "hi").with_key(MessageKey::new("k1"));
        assert!(suppress_if_muted(&data, &msg));
        settle().await;
        assert!(channel.deleted().is_empty());
        assert_eq!(data.suppression.pending_len(), 1);
        assert_eq!(
            data.suppression.pending(&group(), &user("2001"))[0].received_at,
            msg.timestamp
        );

        advance(data.settings.sweep_interval).await;
        settle().await;

        assert_eq!(channel.deleted(), vec![(group(), MessageKey::new("k1"))]);
        assert_eq!(data.suppression.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmute_flushes_parked_messages() {
        let (data, channel, _notifier) = setup(SuppressionMode::Sweep);
        mute_user(&data, &group(), &user("2001"), Duration::from_secs(300)).await.unwrap();

        let msg = InboundMessage::new(group(), user("2001"), "hi").with_key(MessageKey::new("k9"));
        assert!(suppress_if_muted(&data, &msg));

        unmute_user(&data, &group(), &user("2001"));
        settle().await;

        assert_eq!(channel.deleted(), vec![(group(), MessageKey::new("k9"))]);
    }

    #[tokio::test]
    async fn test_no_sweeper_in_immediate_mode() {
        let (data, _channel, _notifier) = setup(SuppressionMode::Immediate);
        assert!(spawn_sweeper(data).is_none());
    }
}
