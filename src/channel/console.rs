use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::bot::error::Error;
use crate::channel::Channel;
use crate::models::{GroupId, Identity, InboundMessage, MessageKey};

/// Outbound action, one JSON object per line
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Outbound<'a> {
    Send {
        group: &'a GroupId,
        text: &'a str,
        mentions: &'a [Identity],
    },
    Delete {
        group: &'a GroupId,
        key: &'a MessageKey,
    },
}

/// Line-delimited JSON transport: inbound messages are read from stdin by the
/// framework loop, outbound actions are written to the wrapped writer.
pub struct ConsoleChannel<W = Stdout> {
    identity: Identity,
    out: Mutex<W>,
}

impl ConsoleChannel<Stdout> {
    pub fn stdout(identity: Identity) -> Self {
        Self::new(identity, tokio::io::stdout())
    }
}

impl<W> ConsoleChannel<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(identity: Identity, out: W) -> Self {
        Self {
            identity,
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    async fn write(&self, action: &Outbound<'_>) -> Result<(), Error> {
        let mut line = serde_json::to_vec(action)?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line).await?;
        out.flush().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<W> Channel for ConsoleChannel<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn bot_identity(&self) -> Identity {
        self.identity.clone()
    }

    async fn send_message(
        &self,
        group: &GroupId,
        text: &str,
        mentions: &[Identity],
    ) -> Result<(), Error> {
        self.write(&Outbound::Send {
            group,
            text,
            mentions,
        })
        .await
    }

    async fn delete_message(&self, group: &GroupId, key: &MessageKey) -> Result<(), Error> {
        self.write(&Outbound::Delete { group, key }).await
    }
}

/// Parse one inbound line
pub fn parse_inbound(line: &str) -> Result<InboundMessage, Error> {
    Ok(serde_json::from_str(line)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inbound_defaults() {
        let msg = parse_inbound(r#"{"group":"1@g.us","sender":"2@s.whatsapp.net","text":".roll"}"#)
            .unwrap();
        assert_eq!(msg.group, GroupId::new("1@g.us"));
        assert_eq!(msg.sender, Identity::new("2@s.whatsapp.net"));
        assert_eq!(msg.text, ".roll");
        assert!(msg.mentions.is_empty());
        assert!(!msg.key.as_str().is_empty());
    }

    #[test]
    fn test_parse_inbound_rejects_garbage() {
        assert!(matches!(parse_inbound("not json"), Err(Error::Json(_))));
        assert!(matches!(parse_inbound(r#"{"text":"hi"}"#), Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_writes_json_lines() {
        let channel = ConsoleChannel::new(Identity::new("bot@s.whatsapp.net"), Vec::<u8>::new());
        let group = GroupId::new("1@g.us");
        let user = Identity::new("2@s.whatsapp.net");

        channel.send_message(&group, "hello", &[user.clone()]).await.unwrap();
        channel.delete_message(&group, &MessageKey::new("k1")).await.unwrap();

        let output = String::from_utf8(channel.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["action"], "send");
        assert_eq!(lines[0]["text"], "hello");
        assert_eq!(lines[0]["mentions"][0], "2@s.whatsapp.net");
        assert_eq!(lines[1]["action"], "delete");
        assert_eq!(lines[1]["key"], "k1");
    }
}
