use tracing::info;

use crate::commands::{Category, Command, CommandContext, CommandFuture};
use crate::constants::replies;
use crate::services::moderation::mute_service;

pub const COMMANDS: &[Command] = &[
    Command {
        pattern: "mute",
        aliases: &[],
        description: "Mute a user for a while and delete their messages.",
        category: Category::Group,
        action: mute,
    },
    Command {
        pattern: "unmute",
        aliases: &[],
        description: "Lift a mute early.",
        category: Category::Group,
        action: unmute,
    },
];

/// Mute the mentioned user in this group
fn mute(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        ctx.require_group()?;
        let target = ctx.mentioned("Please mention a user to mute.")?;

        let duration = ctx.data.settings.mute_duration;
        mute_service::mute_user(&ctx.data, ctx.group(), target, duration).await?;

        info!(
            "User {} muted {} in {} for {:?}",
            ctx.sender(),
            target,
            ctx.group(),
            duration
        );
        Ok(())
    })
}

/// Unmute the mentioned user in this group
fn unmute(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        ctx.require_group()?;
        let target = ctx.mentioned("Please mention a user to unmute.")?;

        if !mute_service::unmute_user(&ctx.data, ctx.group(), target) {
            ctx.reply_mentioning(replies::not_muted(target), std::slice::from_ref(target))
                .await?;
        }
        Ok(())
    })
}
