use std::time::Duration;

/// Mute length applied by `.mute` (defaults, can be overridden via env vars)
pub const DEFAULT_MUTE_DURATION_SECONDS: u64 = 5 * 60;

/// Longest mute the config accepts (30 days)
pub const MAX_MUTE_DURATION_SECONDS: u64 = 30 * 24 * 60 * 60;

/// How often parked messages are swept in sweep mode
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1000;

/// Delay between messages sent by `.count` / `.countx`
pub const COUNT_STEP_DELAY: Duration = Duration::from_secs(1);

/// Largest number `.count` / `.countx` accept
pub const MAX_COUNT: u32 = 50;

/// Format duration for display
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{} second{}", total_secs, if total_secs == 1 { "" } else { "s" })
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        format!("{} minute{}", mins, if mins == 1 { "" } else { "s" })
    } else if total_secs < 86400 {
        let hours = total_secs / 3600;
        format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
    } else {
        let days = total_secs / 86400;
        format!("{} day{}", days, if days == 1 { "" } else { "s" })
    }
}
