use std::env;
use std::time::Duration;

use crate::constants::timeouts::{
    DEFAULT_MUTE_DURATION_SECONDS, DEFAULT_SWEEP_INTERVAL_MS, MAX_MUTE_DURATION_SECONDS,
};
use crate::services::moderation::suppression::SuppressionMode;

/// Identity used by the console transport when BOT_IDENTITY is unset
const DEFAULT_BOT_IDENTITY: &str = "0@s.whatsapp.net";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Account the bot runs as
    pub bot_identity: String,
    /// Number allowed to run owner commands; falls back to the bot's own number
    pub bot_owner: Option<String>,
    pub command_prefix: String,
    /// How long `.mute` silences someone
    pub mute_duration: Duration,
    pub suppression_mode: SuppressionMode,
    /// Sweep period when suppression_mode is sweep
    pub sweep_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key/value source
    pub fn from_lookup<F>(get: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_identity = get("BOT_IDENTITY")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BOT_IDENTITY.to_string());

        let bot_owner = get("BOT_OWNER").filter(|s| !s.is_empty());

        let command_prefix = get("COMMAND_PREFIX")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| ".".to_string());

        let mute_secs = match get("MUTE_DURATION_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| format!("MUTE_DURATION_SECONDS is not a number: {}", raw))?,
            None => DEFAULT_MUTE_DURATION_SECONDS,
        };
        if mute_secs == 0 {
            return Err("MUTE_DURATION_SECONDS must be greater than zero".to_string());
        }
        if mute_secs > MAX_MUTE_DURATION_SECONDS {
            return Err(format!(
                "MUTE_DURATION_SECONDS must be at most {}",
                MAX_MUTE_DURATION_SECONDS
            ));
        }

        let suppression_mode = match get("SUPPRESSION_MODE") {
            Some(raw) => raw.parse()?,
            None => SuppressionMode::default(),
        };

        let sweep_ms = match get("SWEEP_INTERVAL_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| format!("SWEEP_INTERVAL_MS is not a number: {}", raw))?,
            None => DEFAULT_SWEEP_INTERVAL_MS,
        };
        if sweep_ms == 0 {
            return Err("SWEEP_INTERVAL_MS must be greater than zero".to_string());
        }

        Ok(Self {
            bot_identity,
            bot_owner,
            command_prefix,
            mute_duration: Duration::from_secs(mute_secs),
            suppression_mode,
            sweep_interval: Duration::from_millis(sweep_ms),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot_identity: DEFAULT_BOT_IDENTITY.to_string(),
            bot_owner: None,
            command_prefix: ".".to_string(),
            mute_duration: Duration::from_secs(DEFAULT_MUTE_DURATION_SECONDS),
            suppression_mode: SuppressionMode::default(),
            sweep_interval: Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS),
        }
    }
}
