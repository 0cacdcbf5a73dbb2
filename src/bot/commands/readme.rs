//! Read-receipt Discord commands - `/readme check` and `/readme remind`.
//!
//! Both subcommands audit a message in the current channel through
//! [`crate::core::audit`]; `remind` then DMs the members who have not reacted.
//! Replies are ephemeral so only the invoking administrator sees them.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, platform::SerenityPlatform},
        core::{
            audit::{self, AuditOutcome, AuditResult, TargetMessage},
            reminder,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::info;

    const NO_AUDIENCE_TEXT: &str = "No members addressed by this message were found.\n\
        (Right after the bot starts, the member list may take a moment to load.)";

    /// Binds to the invoking channel.
    async fn channel_platform(
        ctx: poise::Context<'_, BotData, Error>,
    ) -> Result<SerenityPlatform<'_>> {
        SerenityPlatform::for_channel(ctx.serenity_context(), ctx.guild_id(), ctx.channel_id())
            .await
    }

    /// Audits `message_id`, replying directly when the message has no audience.
    async fn run_audit(
        ctx: poise::Context<'_, BotData, Error>,
        platform: &SerenityPlatform<'_>,
        message_id: &str,
    ) -> Result<Option<(TargetMessage, AuditResult)>> {
        let message_id = audit::parse_message_id(message_id)?;

        match audit::audit(platform, message_id).await? {
            AuditOutcome::NoAudience(_) => {
                ctx.say(NO_AUDIENCE_TEXT).await?;
                Ok(None)
            }
            AuditOutcome::Completed { message, result } => Ok(Some((message, result))),
        }
    }

    /// Manages read receipts (administrators only).
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("readme_check", "readme_remind"),
        subcommand_required,
        default_member_permissions = "ADMINISTRATOR"
    )]
    pub async fn readme(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Shows who has and has not reacted to a message.
    ///
    /// Members count as addressed when the message mentions them directly, mentions
    /// one of their roles, or mentions @everyone/@here while they can see the channel.
    #[poise::command(slash_command, guild_only, rename = "check")]
    pub async fn readme_check(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ID of the message to check"] message_id: String,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let platform = channel_platform(ctx).await?;
        let Some((message, result)) = run_audit(ctx, &platform, &message_id).await? else {
            return Ok(());
        };

        let mut footer = format!("Message ID: {}", message.id);
        if result.skipped_reactions > 0 {
            write!(
                &mut footer,
                " | {} reaction(s) could not be counted",
                result.skipped_reactions
            )?;
        }

        let mut embed = serenity::CreateEmbed::default()
            .title("📋 Read status")
            .color(0x0034_98DB) // Blue
            .field(
                format!("✅ Read ({})", result.acknowledged.len()),
                audit::format_mention_list(&result.acknowledged, audit::FIELD_VALUE_LIMIT),
                false,
            )
            .field(
                format!("❌ Unread ({})", result.unacknowledged.len()),
                audit::format_mention_list(&result.unacknowledged, audit::FIELD_VALUE_LIMIT),
                false,
            )
            .footer(serenity::CreateEmbedFooter::new(footer))
            .timestamp(serenity::Timestamp::now());

        if message.is_broadcast() {
            embed = embed.description(
                "※ The message mentions @everyone / @here, so every member who can view \
                 this channel is counted.",
            );
        }

        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Sends a DM reminder to everyone who has not reacted to a message.
    #[poise::command(slash_command, guild_only, rename = "remind")]
    pub async fn readme_remind(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "ID of the message to send reminders for"] message_id: String,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;

        let platform = channel_platform(ctx).await?;
        let Some((message, result)) = run_audit(ctx, &platform, &message_id).await? else {
            return Ok(());
        };

        if result.unacknowledged.is_empty() {
            ctx.say("Everyone has read the message, so no reminders were sent.")
                .await?;
            return Ok(());
        }

        let report = reminder::notify(&platform, &message, &result.unacknowledged).await;

        info!(
            "{} requested reminders for message {}: {} sent, {} failed",
            ctx.author().tag(),
            message.id,
            report.sent_count(),
            report.failed_count()
        );

        let embed = serenity::CreateEmbed::default()
            .title("✅ Reminders sent")
            .color(0x002E_CC71) // Green
            .description(format!(
                "Sent a reminder to {} unread member(s).",
                report.sent_count()
            ))
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Targets: {} (failed: {})",
                result.unacknowledged.len(),
                report.failed_count()
            )));

        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
