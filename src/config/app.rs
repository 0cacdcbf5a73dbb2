//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup (after `.env` has been loaded by `dotenvy`)
//! and shared read-only afterwards.

use crate::errors::{Error, Result};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_HEALTH_CHECK_CRON: &str = "0 */10 * * * *";
const DEFAULT_MEMBERS_CONFIG: &str = "members.toml";

/// Settings for the bot process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Discord bot token
    pub discord_token: String,
    /// Port the health server listens on
    pub port: u16,
    /// URL pinged by the health monitor
    pub health_check_url: String,
    /// Cron expression (with seconds) for the health monitor
    pub health_check_cron: String,
    /// Scheduling webhook endpoint; `/schedule` is unavailable without it
    pub schedule_webhook_url: Option<String>,
    /// Path to the member directory TOML file
    pub members_path: String,
    /// Guild to register commands in instead of registering globally
    pub dev_guild_id: Option<u64>,
}

impl AppConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = get("DISCORD_BOT_TOKEN").ok_or_else(|| Error::Config {
            message: "DISCORD_BOT_TOKEN is not set".to_string(),
        })?;

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| Error::Config {
                message: format!("PORT must be a valid port number ({raw}): {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let dev_guild_id = match get("DEV_GUILD_ID") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|id| *id != 0)
                    .ok_or_else(|| Error::Config {
                        message: format!("DEV_GUILD_ID must be a non-zero integer ({raw})"),
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            discord_token,
            port,
            health_check_url: get("HEALTH_CHECK_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            health_check_cron: get("HEALTH_CHECK_CRON")
                .unwrap_or_else(|| DEFAULT_HEALTH_CHECK_CRON.to_string()),
            schedule_webhook_url: get("SCHEDULE_WEBHOOK_URL"),
            members_path: get("MEMBERS_CONFIG")
                .unwrap_or_else(|| DEFAULT_MEMBERS_CONFIG.to_string()),
            dev_guild_id,
        })
    }
}
