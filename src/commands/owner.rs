use std::sync::Arc;

use tracing::error;

use crate::bot::error::Error;
use crate::channel::Channel;
use crate::commands::{Category, Command, CommandContext, CommandFuture};
use crate::constants::replies::{self, SUCCESS};
use crate::constants::timeouts::{COUNT_STEP_DELAY, MAX_COUNT};
use crate::models::GroupId;

pub const COMMANDS: &[Command] = &[
    Command {
        pattern: "count",
        aliases: &[],
        description: "Start a countdown from 1 to the specified number.",
        category: Category::Owner,
        action: count_up,
    },
    Command {
        pattern: "countx",
        aliases: &[],
        description: "Start a reverse countdown from the specified number to 1.",
        category: Category::Owner,
        action: count_down,
    },
];

/// Parse and bound-check the count argument
fn parse_count(arg: &str) -> Result<u32, Error> {
    arg.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_COUNT).contains(n))
        .ok_or_else(|| {
            Error::invalid_argument(format!(
                "Please specify a valid number between 1 and {}.",
                MAX_COUNT
            ))
        })
}

/// Shared body of `.count` and `.countx`. The numbers are sent from a
/// background task so the next inbound message is not held up.
async fn run_count(ctx: &CommandContext, example: &str, descending: bool) -> Result<(), Error> {
    ctx.require_owner()?;

    let Some(arg) = ctx.args.first() else {
        return ctx.reply(replies::usage(example)).await;
    };
    let count = parse_count(arg)?;

    if descending {
        ctx.reply(format!("⏳ Starting reverse countdown from {}...", count)).await?;
    } else {
        ctx.reply(format!("⏳ Starting countdown to {}...", count)).await?;
    }

    let channel = Arc::clone(&ctx.data.channel);
    let group = ctx.group().clone();
    tokio::spawn(async move {
        if let Err(e) = send_count(channel.as_ref(), &group, count, descending).await {
            error!("Countdown in {} stopped: {:?}", group, e);
        }
    });

    Ok(())
}

async fn send_count(
    channel: &dyn Channel,
    group: &GroupId,
    count: u32,
    descending: bool,
) -> Result<(), Error> {
    let steps: Vec<u32> = if descending {
        (1..=count).rev().collect()
    } else {
        (1..=count).collect()
    };

    for i in steps {
        channel.send_message(group, &i.to_string(), &[]).await?;
        tokio::time::sleep(COUNT_STEP_DELAY).await;
    }

    channel
        .send_message(group, &format!("{} Countdown completed.", SUCCESS), &[])
        .await
}

fn count_up(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(run_count(ctx, ".count 10", false))
}

fn count_down(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(run_count(ctx, ".countx 10", true))
}
