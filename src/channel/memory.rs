use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::bot::error::Error;
use crate::channel::Channel;
use crate::models::{GroupId, Identity, MessageKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub group: GroupId,
    pub text: String,
    pub mentions: Vec<Identity>,
}

/// Recording channel for tests
pub struct MemoryChannel {
    identity: Identity,
    sent: Mutex<Vec<SentMessage>>,
    deleted: Mutex<Vec<(GroupId, MessageKey)>>,
    fail_deletes: AtomicBool,
}

impl MemoryChannel {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: Identity::new(identity),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn deleted(&self) -> Vec<(GroupId, MessageKey)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Channel for MemoryChannel {
    fn bot_identity(&self) -> Identity {
        self.identity.clone()
    }

    async fn send_message(
        &self,
        group: &GroupId,
        text: &str,
        mentions: &[Identity],
    ) -> Result<(), Error> {
        self.sent.lock().unwrap().push(SentMessage {
            group: group.clone(),
            text: text.to_string(),
            mentions: mentions.to_vec(),
        });
        Ok(())
    }

    async fn delete_message(&self, group: &GroupId, key: &MessageKey) -> Result<(), Error> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::Channel(format!("cannot delete {}", key)));
        }
        self.deleted.lock().unwrap().push((group.clone(), key.clone()));
        Ok(())
    }
}
