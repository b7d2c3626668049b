use chrono::Local;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::bot::error::Error;
use crate::commands::{Category, Command, CommandContext, CommandFuture};
use crate::constants::replies::{self, COLOR_NAMES, SUCCESS};
use crate::utils::{encoding, expression, formatting};

pub const COMMANDS: &[Command] = &[
    Command {
        pattern: "randomcolor",
        aliases: &[],
        description: "Generate a random color with name and code.",
        category: Category::Utility,
        action: random_color,
    },
    Command {
        pattern: "binary",
        aliases: &[],
        description: "Convert text into binary format.",
        category: Category::Utility,
        action: binary,
    },
    Command {
        pattern: "binarydecode",
        aliases: &[],
        description: "Decode binary string into text.",
        category: Category::Utility,
        action: binary_decode,
    },
    Command {
        pattern: "base64",
        aliases: &[],
        description: "Encode text into Base64 format.",
        category: Category::Utility,
        action: base64_encode,
    },
    Command {
        pattern: "unbase64",
        aliases: &[],
        description: "Decode Base64 encoded text.",
        category: Category::Utility,
        action: base64_decode,
    },
    Command {
        pattern: "urlencode",
        aliases: &[],
        description: "Encode text into URL encoding.",
        category: Category::Utility,
        action: url_encode,
    },
    Command {
        pattern: "urldecode",
        aliases: &[],
        description: "Decode URL encoded text.",
        category: Category::Utility,
        action: url_decode,
    },
    Command {
        pattern: "timenow",
        aliases: &[],
        description: "Check the current local time.",
        category: Category::Utility,
        action: time_now,
    },
    Command {
        pattern: "calculate",
        aliases: &["calc"],
        description: "Evaluate a mathematical expression.",
        category: Category::Utility,
        action: calculate,
    },
];

/// Pick a color name and a hex code; kept out of async code since ThreadRng is !Send
fn random_color_parts() -> (&'static str, u32) {
    let mut rng = rand::thread_rng();
    let name = COLOR_NAMES.choose(&mut rng).copied().unwrap_or("Black");
    (name, rng.gen_range(0..=0xFF_FFFF))
}

fn random_color(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let (name, code) = random_color_parts();
        ctx.reply(format!("🎨 *Random Color:* \nName: {}\nCode: #{:06x}", name, code))
            .await
    })
}

fn binary(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let text = ctx.require_text("Please provide the text to convert to binary.")?;
        ctx.reply(format!("🔑 *Binary Representation:* \n{}", encoding::to_binary(&text)))
            .await
    })
}

fn binary_decode(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let bits = ctx.require_text("Please provide the binary string to decode.")?;
        let decoded = encoding::from_binary(&bits).map_err(Error::InvalidArgument)?;
        ctx.reply(format!("🔓 *Decoded Text:* \n{}", decoded)).await
    })
}

fn base64_encode(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let text = ctx.require_text("Please provide the text to encode into Base64.")?;
        ctx.reply(format!("🔑 *Encoded Base64 Text:* \n{}", encoding::to_base64(&text)))
            .await
    })
}

fn base64_decode(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let text = ctx.require_text("Please provide the Base64 encoded text to decode.")?;
        let decoded = encoding::from_base64(&text).map_err(Error::InvalidArgument)?;
        ctx.reply(format!("🔓 *Decoded Text:* \n{}", decoded)).await
    })
}

fn url_encode(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let text = ctx.require_text("Please provide the text to encode into URL encoding.")?;
        ctx.reply(format!("🔑 *Encoded URL Text:* \n{}", encoding::url_encode(&text)))
            .await
    })
}

fn url_decode(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let text = ctx.require_text("Please provide the URL encoded text to decode.")?;
        let decoded = encoding::url_decode(&text).map_err(Error::InvalidArgument)?;
        ctx.reply(format!("🔓 *Decoded Text:* \n{}", decoded)).await
    })
}

fn time_now(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        let now = Local::now().format("%I:%M:%S %p");
        ctx.reply(format!("🕒 Current Local Time: {}", now)).await
    })
}

fn calculate(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move {
        if ctx.args.is_empty() {
            return ctx.reply(replies::usage(".calculate 5+3*2")).await;
        }

        let expr = ctx.text().trim().to_string();
        let result = expression::evaluate(&expr)?;
        ctx.reply(format!(
            "{} Result of \"{}\" is: {}",
            SUCCESS,
            expr,
            formatting::format_number(result)
        ))
        .await
    })
}

#[cfg(test)]
mod tests {
    use crate::commands::test_support::*;

    #[tokio::test]
    async fn test_encoders() {
        let (data, channel) = harness();

        let replies = run(&data, &channel, message("2001", ".binary Hi")).await;
        assert_eq!(replies, vec!["🔑 *Binary Representation:* \n01001000 01101001"]);

        let replies = run(&data, &channel, message("2001", ".binarydecode 01001000 01101001")).await;
        assert_eq!(replies, vec!["🔓 *Decoded Text:* \nHi"]);

        let replies = run(&data, &channel, message("2001", ".base64 hello world")).await;
        assert_eq!(replies, vec!["🔑 *Encoded Base64 Text:* \naGVsbG8gd29ybGQ="]);

        let replies = run(&data, &channel, message("2001", ".unbase64 aGVsbG8gd29ybGQ=")).await;
        assert_eq!(replies, vec!["🔓 *Decoded Text:* \nhello world"]);

        let replies = run(&data, &channel, message("2001", ".urlencode a b&c")).await;
        assert_eq!(replies, vec!["🔑 *Encoded URL Text:* \na%20b%26c"]);

        let replies = run(&data, &channel, message("2001", ".urldecode a%20b%26c")).await;
        assert_eq!(replies, vec!["🔓 *Decoded Text:* \na b&c"]);
    }

    #[tokio::test]
    async fn test_decoder_rejects_bad_input() {
        let (data, channel) = harness();

        let replies = run(&data, &channel, message("2001", ".binarydecode 0102")).await;
        assert_eq!(replies, vec!["❌ '0102' is not a binary byte"]);
    }

    #[tokio::test]
    async fn test_calculate() {
        let (data, channel) = harness();

        let replies = run(&data, &channel, message("2001", ".calc 5+3*2")).await;
        assert_eq!(replies, vec!["✅ Result of \"5+3*2\" is: 11"]);

        let replies = run(&data, &channel, message("2001", ".calculate 7 / 2")).await;
        assert_eq!(replies, vec!["✅ Result of \"7 / 2\" is: 3.5"]);

        let replies = run(&data, &channel, message("2001", ".calculate")).await;
        assert_eq!(replies, vec!["✳️ Use this command like:\n *Example:* .calculate 5+3*2"]);

        let replies = run(&data, &channel, message("2001", ".calculate 1/0")).await;
        assert_eq!(replies, vec!["❌ Error in calculation: division by zero"]);
    }

    #[tokio::test]
    async fn test_calculate_rejects_deep_nesting() {
        let (data, channel) = harness();

        let deep = format!(".calc {}1{}", "(".repeat(100_000), ")".repeat(100_000));
        let replies = run(&data, &channel, message("2001", &deep)).await;
        assert_eq!(replies, vec!["❌ Error in calculation: expression is longer than 1000 characters"]);

        let deep = format!(".calc {}1{}", "(".repeat(300), ")".repeat(300));
        let replies = run(&data, &channel, message("2001", &deep)).await;
        assert_eq!(replies, vec!["❌ Error in calculation: expression is nested deeper than 100 levels"]);

        let replies = run(&data, &channel, message("2001", ".calc (2+3)*4")).await;
        assert_eq!(replies, vec!["✅ Result of \"(2+3)*4\" is: 20"]);
    }

    #[tokio::test]
    async fn test_random_color_format() {
        let (data, channel) = harness();

        let replies = run(&data, &channel, message("2001", ".randomcolor")).await;
        let code = replies[0].rsplit('#').next().unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
