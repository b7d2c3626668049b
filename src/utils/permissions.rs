use crate::bot::data::Data;
use crate::models::Identity;

/// Number that owns the bot: BOT_OWNER if set, otherwise the bot's own number
pub fn owner_number(data: &Data) -> String {
    match &data.settings.bot_owner {
        Some(owner) => Identity::new(owner.as_str()).user_part().to_string(),
        None => data.channel.bot_identity().user_part().to_string(),
    }
}

/// Check if a sender may run owner-only commands
pub fn is_owner(data: &Data, sender: &Identity) -> bool {
    sender.user_part() == owner_number(data)
}
