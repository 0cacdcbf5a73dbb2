//! Bot layer - Discord-specific interface and command handlers
//!
//! This module wires the poise framework: command registration, shared data,
//! error reporting and the gateway client.

/// Discord command implementations (general, readme, schedule)
pub mod commands;
/// Serenity implementation of the chat platform used by the auditor
pub mod platform;

use crate::{
    config::{AppConfig, MemberDirectory},
    core::schedule::ScheduleClient,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
///
/// Constructed once at startup and only read afterwards.
#[derive(Debug)]
pub struct BotData {
    /// Scheduling webhook client, if a webhook URL is configured
    pub schedule: Option<ScheduleClient>,
    /// Sheet name to Discord user lookup
    pub members: MemberDirectory,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(schedule: Option<ScheduleClient>, members: MemberDirectory) -> Self {
        Self { schedule, members }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().qualified_name, error);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// All commands served by the bot
#[must_use]
pub fn commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::hello(),
        commands::help(),
        commands::readme(),
        commands::schedule(),
    ]
}

/// Gateway intents requested at login.
///
/// Reactions are read over REST when a command runs, so no reaction events
/// are subscribed to.
#[must_use]
pub fn intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
}

/// Connects to Discord and serves commands until the client stops.
#[instrument(skip_all)]
pub async fn run_bot(config: &AppConfig, data: BotData) -> Result<()> {
    let dev_guild_id = config.dev_guild_id.map(serenity::GuildId::new);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if let Some(guild_id) = dev_guild_id {
                    poise::builtins::register_in_guild(
                        ctx,
                        &framework.options().commands,
                        guild_id,
                    )
                    .await?;
                    info!("Registered commands in guild {}", guild_id);
                } else {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Registered commands globally");
                }
                Ok(data)
            })
        })
        .build();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents())
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;

    Ok(())
}
