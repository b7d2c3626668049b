use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::bot::error::Error;
use crate::models::{GroupId, Identity};

/// Registry key: one mute per identity per group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MuteKey {
    pub group: GroupId,
    pub identity: Identity,
}

impl MuteKey {
    pub fn new(group: &GroupId, identity: &Identity) -> Self {
        Self {
            group: group.clone(),
            identity: identity.clone(),
        }
    }
}

/// An active mute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuteEntry {
    pub group: GroupId,
    pub identity: Identity,
    pub muted_at: Instant,
    pub expires_at: Instant,
}

impl MuteEntry {
    pub fn is_active_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmuteReason {
    /// The mute window ran out
    Expired,
    /// Lifted early by `unmute`
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuteEvent {
    Unmuted {
        group: GroupId,
        identity: Identity,
        reason: UnmuteReason,
    },
}

struct MuteSlot {
    entry: MuteEntry,
    generation: u64,
    timer: AbortHandle,
}

struct Inner {
    slots: DashMap<MuteKey, MuteSlot>,
    next_generation: AtomicU64,
    events: mpsc::UnboundedSender<MuteEvent>,
}

impl Inner {
    fn emit(&self, key: MuteKey, reason: UnmuteReason) {
        let event = MuteEvent::Unmuted {
            group: key.group,
            identity: key.identity,
            reason,
        };
        // Nobody listening is fine; the mute state is already gone
        if self.events.send(event).is_err() {
            debug!("Unmute event dropped, no subscriber");
        }
    }
}

/// Tracks active mutes keyed by (group, identity) and fires an unmute event
/// when each one runs out.
///
/// Every key owns at most one expiry timer. Mutations for a key go through
/// the map's per-shard lock, and a timer only clears the slot it was
/// scheduled for (matched by generation), so a late timer can never remove
/// a newer mute or emit a second event.
///
/// Cloning is cheap and yields a handle to the same registry. Must be used
/// from inside a tokio runtime since `mute` spawns the expiry task.
#[derive(Clone)]
pub struct MuteRegistry {
    inner: Arc<Inner>,
}

impl MuteRegistry {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MuteEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = Self {
            inner: Arc::new(Inner {
                slots: DashMap::new(),
                next_generation: AtomicU64::new(0),
                events: tx,
            }),
        };
        (registry, rx)
    }

    /// Mute `identity` in `group` for `duration`, replacing any earlier mute
    pub fn mute(
        &self,
        group: &GroupId,
        identity: &Identity,
        duration: Duration,
    ) -> Result<MuteEntry, Error> {
        if duration.is_zero() {
            return Err(Error::InvalidDuration);
        }

        let now = Instant::now();
        let expires_at = now.checked_add(duration).ok_or(Error::InvalidDuration)?;
        let entry = MuteEntry {
            group: group.clone(),
            identity: identity.clone(),
            muted_at: now,
            expires_at,
        };
        let key = MuteKey::new(group, identity);
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);

        // The timer is spawned while the key's shard is held, so it cannot
        // look for its slot before the slot is in the map
        match self.inner.slots.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let slot = MuteSlot {
                    entry: entry.clone(),
                    generation,
                    timer: self.spawn_expiry(key, generation, expires_at),
                };
                let previous = occupied.insert(slot);
                previous.timer.abort();
                debug!(
                    "Replaced mute for {} in {} (generation {} -> {})",
                    identity, group, previous.generation, generation
                );
            }
            Entry::Vacant(vacant) => {
                let slot = MuteSlot {
                    entry: entry.clone(),
                    generation,
                    timer: self.spawn_expiry(key, generation, expires_at),
                };
                vacant.insert(slot);
            }
        }

        info!("Muted {} in {} for {:?}", identity, group, duration);
        Ok(entry)
    }

    fn spawn_expiry(&self, key: MuteKey, generation: u64, deadline: Instant) -> AbortHandle {
        tokio::spawn(expire_at(Arc::clone(&self.inner), key, generation, deadline)).abort_handle()
    }

    /// Whether `identity` is muted in `group` right now.
    ///
    /// Decided by the stored expiry time, not by whether the timer has run,
    /// so a delayed timer never extends a mute.
    pub fn is_muted(&self, group: &GroupId, identity: &Identity) -> bool {
        self.inner
            .slots
            .get(&MuteKey::new(group, identity))
            .map(|slot| slot.entry.is_active_at(Instant::now()))
            .unwrap_or(false)
    }

    /// Lift a mute early. Returns false (and emits nothing) if there was none.
    pub fn unmute(&self, group: &GroupId, identity: &Identity) -> bool {
        match self.inner.slots.remove(&MuteKey::new(group, identity)) {
            Some((key, slot)) => {
                slot.timer.abort();
                info!("Unmuted {} in {}", key.identity, key.group);
                self.inner.emit(key, UnmuteReason::Manual);
                true
            }
            None => false,
        }
    }

    /// The live entry for a key, if it has not yet run out
    pub fn get(&self, group: &GroupId, identity: &Identity) -> Option<MuteEntry> {
        let now = Instant::now();
        self.inner
            .slots
            .get(&MuteKey::new(group, identity))
            .map(|slot| slot.entry.clone())
            .filter(|entry| entry.is_active_at(now))
    }

    /// Time left on a mute
    pub fn remaining(&self, group: &GroupId, identity: &Identity) -> Option<Duration> {
        self.get(group, identity)
            .map(|entry| entry.expires_at.saturating_duration_since(Instant::now()))
    }

    /// All live mutes in a group, soonest expiry first
    pub fn active_in_group(&self, group: &GroupId) -> Vec<MuteEntry> {
        let now = Instant::now();
        let mut entries: Vec<MuteEntry> = self
            .inner
            .slots
            .iter()
            .filter(|slot| &slot.key().group == group && slot.entry.is_active_at(now))
            .map(|slot| slot.entry.clone())
            .collect();
        entries.sort_by_key(|entry| entry.expires_at);
        entries
    }

    /// Number of tracked mutes, including any whose timer has not run yet
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }
}

async fn expire_at(inner: Arc<Inner>, key: MuteKey, generation: u64, deadline: Instant) {
    sleep_until(deadline).await;

    let removed = inner
        .slots
        .remove_if(&key, |_, slot| slot.generation == generation);

    if let Some((key, _)) = removed {
        info!("Mute expired for {} in {}", key.identity, key.group);
        inner.emit(key, UnmuteReason::Expired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::advance;
    use tokio_test::assert_err;

    fn g(id: &str) -> GroupId {
        GroupId::new(id)
    }

    fn u(id: &str) -> Identity {
        Identity::new(id)
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mute_then_expire() {
        let (registry, mut events) = MuteRegistry::new();

        registry.mute(&g("g1"), &u("u1"), Duration::from_millis(5000)).unwrap();
        assert!(registry.is_muted(&g("g1"), &u("u1")));

        advance(Duration::from_millis(4999)).await;
        assert!(registry.is_muted(&g("g1"), &u("u1")));

        advance(Duration::from_millis(2)).await;
        assert!(!registry.is_muted(&g("g1"), &u("u1")));

        settle().await;
        assert_eq!(
            events.try_recv().unwrap(),
            MuteEvent::Unmuted {
                group: g("g1"),
                identity: u("u1"),
                reason: UnmuteReason::Expired,
            }
        );
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_rejected() {
        let (registry, _events) = MuteRegistry::new();

        let err = assert_err!(registry.mute(&g("g1"), &u("u1"), Duration::ZERO));
        assert!(matches!(err, Error::InvalidDuration));
        assert!(!registry.is_muted(&g("g1"), &u("u1")));
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_duration_rejected() {
        let (registry, _events) = MuteRegistry::new();

        let err = assert_err!(registry.mute(&g("g1"), &u("u1"), Duration::from_secs(u64::MAX)));
        assert!(matches!(err, Error::InvalidDuration));
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tiny_duration_still_expires() {
        let (registry, mut events) = MuteRegistry::new();

        registry.mute(&g("g1"), &u("u1"), Duration::from_nanos(1)).unwrap();
        advance(Duration::from_millis(1)).await;
        settle().await;

        assert!(registry.is_empty());
        assert!(matches!(
            events.try_recv(),
            Ok(MuteEvent::Unmuted { reason: UnmuteReason::Expired, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remute_replaces_timer() {
        let (registry, mut events) = MuteRegistry::new();

        registry.mute(&g("g1"), &u("u1"), Duration::from_millis(5000)).unwrap();
        advance(Duration::from_millis(1000)).await;
        let second = registry.mute(&g("g1"), &u("u1"), Duration::from_millis(3000)).unwrap();
        assert_eq!(second.expires_at, second.muted_at + Duration::from_millis(3000));
        assert_eq!(registry.len(), 1);

        advance(Duration::from_millis(2500)).await;
        assert!(registry.is_muted(&g("g1"), &u("u1")));

        advance(Duration::from_millis(1000)).await;
        assert!(!registry.is_muted(&g("g1"), &u("u1")));

        // Run well past the first mute's original deadline
        advance(Duration::from_millis(10_000)).await;
        settle().await;

        assert!(matches!(
            events.try_recv(),
            Ok(MuteEvent::Unmuted { reason: UnmuteReason::Expired, .. })
        ));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmute_cancels_timer() {
        let (registry, mut events) = MuteRegistry::new();

        registry.mute(&g("g1"), &u("u1"), Duration::from_millis(5000)).unwrap();
        advance(Duration::from_millis(1000)).await;

        assert!(registry.unmute(&g("g1"), &u("u1")));
        assert!(!registry.is_muted(&g("g1"), &u("u1")));
        assert!(matches!(
            events.try_recv(),
            Ok(MuteEvent::Unmuted { reason: UnmuteReason::Manual, .. })
        ));

        advance(Duration::from_millis(10_000)).await;
        settle().await;
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmute_without_entry_is_noop() {
        let (registry, mut events) = MuteRegistry::new();

        assert!(!registry.unmute(&g("g1"), &u("u1")));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let (registry, _events) = MuteRegistry::new();

        registry.mute(&g("g1"), &u("u1"), Duration::from_secs(60)).unwrap();
        registry.mute(&g("g2"), &u("u1"), Duration::from_secs(10)).unwrap();

        assert!(registry.is_muted(&g("g1"), &u("u1")));
        assert!(registry.is_muted(&g("g2"), &u("u1")));
        assert!(!registry.is_muted(&g("g1"), &u("u2")));

        advance(Duration::from_secs(11)).await;
        assert!(registry.is_muted(&g("g1"), &u("u1")));
        assert!(!registry.is_muted(&g("g2"), &u("u1")));
        assert_eq!(registry.active_in_group(&g("g1")).len(), 1);
        assert!(registry.active_in_group(&g("g2")).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining() {
        let (registry, _events) = MuteRegistry::new();

        registry.mute(&g("g1"), &u("u1"), Duration::from_secs(300)).unwrap();
        advance(Duration::from_secs(120)).await;

        assert_eq!(registry.remaining(&g("g1"), &u("u1")), Some(Duration::from_secs(180)));
        assert_eq!(registry.remaining(&g("g1"), &u("u2")), None);
    }
}
