use std::time::Duration;

use crate::constants::timeouts::format_duration;
use crate::models::Identity;
use crate::utils::formatting::mention;

// ============================================================================
// Markers
// ============================================================================

pub const SUCCESS: &str = "✅";
pub const FAILURE: &str = "❌";
pub const USAGE: &str = "✳️";

/// Bullet point character
pub const BULLET: &str = "•";

// ============================================================================
// Moderation
// ============================================================================

pub fn muted(identity: &Identity, duration: Duration) -> String {
    format!(
        "🔇 {} has been muted for {}.",
        mention(identity),
        format_duration(duration)
    )
}

pub fn unmuted(identity: &Identity) -> String {
    format!("🔊 {} is no longer muted.", mention(identity))
}

pub fn not_muted(identity: &Identity) -> String {
    format!("{} is not muted.", mention(identity))
}

// ============================================================================
// Fun
// ============================================================================

pub const COLOR_NAMES: &[&str] = &[
    "Red", "Green", "Blue", "Yellow", "Orange", "Purple", "Pink", "Brown", "Black", "White",
    "Gray", "Cyan", "Magenta", "Violet", "Indigo", "Teal", "Lavender", "Turquoise",
];

pub const SHAPAR_ART: &str = r"
          _______
       .-'       '-.
      /           /|
     /           / |
    /___________/  |
    |   _______ |  |
    |  |  \ \  ||  |
    |  |   \ \ ||  |
    |  |____\ \||  |
    |  '._  _.'||  |
    |    .' '.  ||  |
    |   '.___.' ||  |
    |___________||  |
    '------------'  |
     \_____________\|
";

// ============================================================================
// Text Helpers
// ============================================================================

/// Format a list of items with bullet points
pub fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("{} {}", BULLET, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a section with a header and content
pub fn section(header: &str, content: &str) -> String {
    format!("*{}*\n{}", header, content)
}

/// Standard failure reply
pub fn failure(message: impl std::fmt::Display) -> String {
    format!("{} {}", FAILURE, message)
}

/// Standard usage hint
pub fn usage(example: &str) -> String {
    format!("{} Use this command like:\n *Example:* {}", USAGE, example)
}
