use rand::seq::SliceRandom;
use rand::Rng;

use crate::bot::error::Error;
use crate::commands::{Category, Command, CommandContext, CommandFuture};
use crate::constants::replies::SHAPAR_ART;
use crate::utils::formatting::mention;

pub const COMMANDS: &[Command] = &[
    Command {
        pattern: "roll",
        aliases: &[],
        description: "Roll a dice (1-6).",
        category: Category::Fun,
        action: roll,
    },
    Command {
        pattern: "coinflip",
        aliases: &[],
        description: "Flip a coin and get Heads or Tails.",
        category: Category::Fun,
        action: coin_flip,
    },
    Command {
        pattern: "reverse",
        aliases: &[],
        description: "Reverse the given text.",
        category: Category::Fun,
        action: reverse,
    },
    Command {
        pattern: "flip",
        aliases: &[],
        description: "Flip the text you provide.",
        category: Category::Fun,
        action: flip,
    },
    Command {
        pattern: "pick",
        aliases: &[],
        description: "Pick between comma-separated choices.",
        category: Category::Fun,
        action: pick,
    },
    Command {
        pattern: "rate",
        aliases: &[],
        description: "Rate someone out of 10.",
        category: Category::Fun,
        action: rate,
    },
    Command {
        pattern: "shapar",
        aliases: &[],
        description: "Send shapar ASCII art with mentions.",
        category: Category::Fun,
        action: shapar,
    },
];

// ThreadRng is !Send, so every draw happens in a plain function before any await

fn random_in(low: u32, high: u32) -> u32 {
    rand::thread_rng().gen_range(low..=high)
}

fn choose<'a>(options: &[&'a str]) -> Option<&'a str> {
    options.choose(&mut rand::thread_rng()).copied()
}

fn reversed(text: &str) -> String {
    text.chars().rev().collect()
}

/// Comma-separated choices, trimmed, empties dropped
fn split_choices(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

fn roll(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let result = random_in(1, 6);
        ctx.reply(format!("🎲 You rolled: *{}*", result)).await
    })
}

fn coin_flip(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let result = choose(&["Heads", "Tails"]).unwrap_or("Heads");
        ctx.reply(format!("🪙 Coin Flip Result: *{}*", result)).await
    })
}

fn reverse(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let text = ctx.require_text("Please provide the text to reverse.")?;
        ctx.reply(format!("🔄 Reversed Text: *{}*", reversed(&text))).await
    })
}

fn flip(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let text = ctx.require_text("Please provide the text to flip.")?;
        ctx.reply(format!("🔄 Flipped Text: *{}*", reversed(&text))).await
    })
}

fn pick(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let text = ctx.text();
        let choices = split_choices(&text);
        if choices.len() < 2 {
            return Err(Error::invalid_argument(
                "Please provide two choices to pick from. Example: `.pick Ice Cream, Pizza`",
            ));
        }

        let option = choose(&choices).unwrap_or(choices[0]);
        ctx.reply(format!("🎉 Bot picks: *{}*", option)).await
    })
}

fn rate(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        ctx.require_group()?;
        let target = ctx.mentioned("Please mention someone to rate.")?;

        let rating = random_in(1, 10);
        ctx.reply_mentioning(
            format!("{} is rated {}/10.", mention(target), rating),
            std::slice::from_ref(target),
        )
        .await
    })
}

fn shapar(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        ctx.require_group()?;
        let target = ctx.mentioned("Please mention a user to send the ASCII art to.")?;

        ctx.reply_mentioning(
            format!(
                "😂 {}!\n😂 Bruh that for you:\n\n{}",
                mention(target),
                SHAPAR_ART
            ),
            std::slice::from_ref(target),
        )
        .await
    })
}
