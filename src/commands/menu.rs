use std::collections::BTreeMap;

use crate::commands::{all_commands, Category, Command, CommandContext, CommandFuture};
use crate::constants::replies::{bullet_list, section};

pub const COMMANDS: &[Command] = &[Command {
    pattern: "menu",
    aliases: &["help"],
    description: "List every command.",
    category: Category::Utility,
    action: menu,
}];

/// Render the command list grouped by category
pub fn render_menu(prefix: &str) -> String {
    let mut by_category: BTreeMap<Category, Vec<String>> = BTreeMap::new();
    for command in all_commands() {
        by_category
            .entry(command.category)
            .or_default()
            .push(format!("{}{} - {}", prefix, command.pattern, command.description));
    }

    by_category
        .iter()
        .map(|(category, lines)| section(&category.to_string(), &bullet_list(lines)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn menu(ctx: &CommandContext) -> CommandFuture<'_> {
    Box::pin(async move { ctx.reply(render_menu(&ctx.data.settings.command_prefix)).await })
}
