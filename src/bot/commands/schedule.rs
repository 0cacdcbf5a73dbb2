//! Scheduling Discord commands - `/schedule create`, `check` and `finish`.
//!
//! Each subcommand is a thin wrapper over [`crate::core::schedule::ScheduleClient`].
//! Webhook failures are reported to the channel verbatim and end the command.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, platform},
        core::schedule::{self, ScheduleClient},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::error;

    const NOT_CONFIGURED_TEXT: &str = "❌ Error: SCHEDULE_WEBHOOK_URL is not configured.";

    /// Returns the webhook client, replying with an error when it is not configured.
    async fn client(ctx: poise::Context<'_, BotData, Error>) -> Result<Option<&ScheduleClient>> {
        let client = ctx.data().schedule.as_ref();
        if client.is_none() {
            ctx.say(NOT_CONFIGURED_TEXT).await?;
        }
        Ok(client)
    }

    /// Scheduling sheet commands.
    #[poise::command(
        slash_command,
        subcommands("schedule_create", "schedule_check", "schedule_finish"),
        subcommand_required
    )]
    pub async fn schedule(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Creates a new scheduling sheet.
    #[poise::command(slash_command, rename = "create")]
    pub async fn schedule_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Event name"] event_name: String,
        #[description = "Answer deadline"] deadline: String,
        #[description = "An extra note for participants"] comment: Option<String>,
    ) -> Result<()> {
        ctx.defer().await?;
        let Some(client) = client(ctx).await? else {
            return Ok(());
        };

        let sheet = match client.create(&event_name).await {
            Ok(sheet) => sheet,
            Err(e) => {
                ctx.say(format!("❌ Create failed: {e}")).await?;
                return Ok(());
            }
        };

        let mut description = "Please answer using the link below!".to_string();
        if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
            description.push_str("\n\n");
            description.push_str(&comment);
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("🗓️ [Scheduling] {event_name}"))
            .color(0x002E_CC71) // Green
            .description(description)
            .field("Deadline", deadline, false)
            .field("Sheet", format!("[Click to answer]({})", sheet.url), false)
            .timestamp(serenity::Timestamp::now());

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Mentions everyone with unanswered entries on a sheet.
    #[poise::command(slash_command, rename = "check")]
    pub async fn schedule_check(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sheet URL"] url: String,
    ) -> Result<()> {
        ctx.defer().await?;
        let Some(client) = client(ctx).await? else {
            return Ok(());
        };

        match platform::text_channel(ctx.serenity_context(), ctx.channel_id()).await {
            Ok(_) => {}
            Err(Error::UnsupportedChannel) => {
                ctx.say("This command can only be used in a text channel.")
                    .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let pending = match client.check(&url).await {
            Ok(pending) => pending,
            Err(e) => {
                ctx.say(format!("❌ Check failed: {e}")).await?;
                return Ok(());
            }
        };

        if pending.names.is_empty() {
            let embed = serenity::CreateEmbed::default()
                .title("🎉 Everyone has answered!")
                .color(0x002E_CC71) // Green
                .description("All entries are complete.");
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }

        let mentions = schedule::pending_mentions(&pending.names, &ctx.data().members).join(" ");

        let embed = serenity::CreateEmbed::default()
            .title("📣 Reminder: please answer!")
            .color(0x00E6_7E22) // Orange
            .description(format!(
                "{mentions}, there are unanswered entries.\n\
                 Please check the sheet and complete your answers!\n\n\
                 **📎 Sheet**\n[Click to answer]({url})"
            ))
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Unanswered: {}",
                pending.names.len()
            )));

        ctx.send(poise::CreateReply::default().content(mentions).embed(embed))
            .await?;
        Ok(())
    }

    /// Shows the ◯ / △ tally for each candidate date.
    #[poise::command(slash_command, rename = "finish")]
    pub async fn schedule_finish(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sheet URL"] url: String,
    ) -> Result<()> {
        ctx.defer().await?;
        let Some(client) = client(ctx).await? else {
            return Ok(());
        };

        let tally = match client.finish(&url).await {
            Ok(tally) => tally,
            Err(e) => {
                error!("Tally failed for {}: {}", url, e);
                ctx.say(format!("❌ Tally failed: {e}")).await?;
                return Ok(());
            }
        };

        let embed = serenity::CreateEmbed::default()
            .title("📊 Schedule tally")
            .color(0x0034_98DB) // Blue
            .description(schedule::format_tally(&tally.data)?)
            .footer(serenity::CreateEmbedFooter::new("◯ and △ answers, names without honorifics"))
            .timestamp(serenity::Timestamp::now());

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
