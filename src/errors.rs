//! Unified error types for the bot.
//!
//! Fatal per-invocation failures are variants of [`Error`]. Partial failures
//! (a skipped reaction, an undelivered DM) are never raised as errors; they are
//! accumulated in the result types of [`crate::core`].

use thiserror::Error;

/// All errors produced by the bot.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// The audited message does not exist or is not accessible
    #[error("Message {message_id} could not be retrieved")]
    MessageNotFound {
        /// The id that was looked up
        message_id: String,
    },

    /// The supplied message id is not a Discord snowflake
    #[error("`{input}` is not a valid message ID")]
    InvalidMessageId {
        /// Raw user input
        input: String,
    },

    /// The command was used outside a guild text channel
    #[error("This command can only be used in a text channel")]
    UnsupportedChannel,

    /// Guild information is unavailable for this invocation
    #[error("Server information could not be retrieved")]
    GuildUnavailable,

    /// The bot lacks permission to read the channel
    #[error("Missing permission to read message history in this channel")]
    Unauthorized,

    /// The scheduling webhook returned a non-success payload
    #[error("{message}")]
    Upstream {
        /// Message reported by the webhook, verbatim
        message: String,
    },

    /// Transport error talking to an HTTP endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// String formatting error
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Cron scheduler error
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
