pub mod fun;
pub mod menu;
pub mod moderation;
pub mod owner;
pub mod utility;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, error};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::replies;
use crate::models::{GroupId, Identity, InboundMessage};
use crate::utils::permissions;

pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

/// Handler signature shared by every command
pub type CommandAction = for<'a> fn(&'a CommandContext) -> CommandFuture<'a>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Group,
    Utility,
    Fun,
    Owner,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Group => "Group",
            Category::Utility => "Utility",
            Category::Fun => "Fun",
            Category::Owner => "Owner",
        };
        f.write_str(name)
    }
}

/// A pattern-triggered command
pub struct Command {
    pub pattern: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub category: Category,
    pub action: CommandAction,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("pattern", &self.pattern)
            .field("aliases", &self.aliases)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Every registered command, in menu order
pub fn all_commands() -> impl Iterator<Item = &'static Command> {
    moderation::COMMANDS
        .iter()
        .chain(utility::COMMANDS)
        .chain(fun::COMMANDS)
        .chain(owner::COMMANDS)
        .chain(menu::COMMANDS)
}

/// Lookup table from pattern and alias to command
static COMMAND_INDEX: Lazy<HashMap<&'static str, &'static Command>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for command in all_commands() {
        index.insert(command.pattern, command);
        for alias in command.aliases {
            index.insert(*alias, command);
        }
    }
    index
});

/// Find a command by pattern or alias (case-insensitive)
pub fn find_command(name: &str) -> Option<&'static Command> {
    COMMAND_INDEX.get(name.to_lowercase().as_str()).copied()
}

/// Split `<prefix><name> <args...>` into the lowercased name and arguments
pub fn parse_invocation(prefix: &str, text: &str) -> Option<(String, Vec<String>)> {
    let body = text.trim_start().strip_prefix(prefix)?;
    let mut words = body.split_whitespace();
    let name = words.next()?.to_lowercase();
    let args = words.map(str::to_string).collect();
    Some((name, args))
}

/// Everything a handler gets to work with
pub struct CommandContext {
    pub data: Arc<Data>,
    pub message: InboundMessage,
    pub args: Vec<String>,
}

impl CommandContext {
    pub fn group(&self) -> &GroupId {
        &self.message.group
    }

    pub fn sender(&self) -> &Identity {
        &self.message.sender
    }

    /// All arguments joined back into one string
    pub fn text(&self) -> String {
        self.args.join(" ")
    }

    pub async fn reply(&self, text: impl AsRef<str>) -> Result<(), Error> {
        self.data
            .channel
            .send_message(self.group(), text.as_ref(), &[])
            .await
    }

    pub async fn reply_mentioning(
        &self,
        text: impl AsRef<str>,
        mentions: &[Identity],
    ) -> Result<(), Error> {
        self.data
            .channel
            .send_message(self.group(), text.as_ref(), mentions)
            .await
    }

    pub fn require_group(&self) -> Result<(), Error> {
        if self.group().is_group() {
            Ok(())
        } else {
            Err(Error::NotAGroup)
        }
    }

    pub fn require_owner(&self) -> Result<(), Error> {
        if permissions::is_owner(&self.data, self.sender()) {
            Ok(())
        } else {
            Err(Error::PermissionDenied(
                "Only the bot owner can use this command.".to_string(),
            ))
        }
    }

    /// First mentioned user, or a MissingTarget error carrying `hint`
    pub fn mentioned(&self, hint: &str) -> Result<&Identity, Error> {
        self.message
            .mentions
            .first()
            .ok_or_else(|| Error::MissingTarget(hint.to_string()))
    }

    /// Joined arguments, or a usage error when there are none
    pub fn require_text(&self, missing: &str) -> Result<String, Error> {
        if self.args.is_empty() {
            Err(Error::invalid_argument(missing))
        } else {
            Ok(self.text())
        }
    }
}

/// Run the command in `message`, if it holds one.
///
/// Returns false when the text is not a known command. Handler errors are
/// logged and reported back to the chat, never propagated.
pub async fn dispatch(data: Arc<Data>, message: InboundMessage) -> bool {
    let Some((name, args)) = parse_invocation(&data.settings.command_prefix, &message.text) else {
        return false;
    };
    let Some(command) = find_command(&name) else {
        debug!("Ignoring unknown command '{}'", name);
        return false;
    };

    debug!("Running .{} for {} in {}", command.pattern, message.sender, message.group);

    let ctx = CommandContext {
        data,
        message,
        args,
    };

    if let Err(e) = (command.action)(&ctx).await {
        error!("Error in .{} command: {:?}", command.pattern, e);
        if let Err(send_err) = ctx.reply(replies::failure(&e)).await {
            error!("Failed to report .{} error: {:?}", command.pattern, send_err);
        }
    }

    true
}
