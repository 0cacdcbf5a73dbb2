//! General Discord commands - greeting and help.
//! These commands are stateless and make no external calls.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::greeting,
        errors::{Error, Result},
    };

    /// Replies with a greeting in a random language.
    #[poise::command(slash_command, prefix_command)]
    pub async fn hello(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(greeting::random_greeting()).await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Help**\n\
        Here is a summary of all available commands.\n\n\
        **Read receipts** (administrators)\n\
        • `/readme check <message_id>` - Shows who has and has not reacted to a message in this channel.\n\
        • `/readme remind <message_id>` - Sends a DM reminder to everyone who has not reacted yet.\n\n\
        **Scheduling**\n\
        • `/schedule create <event_name> <deadline> [comment]` - Creates a new scheduling sheet.\n\
        • `/schedule check <url>` - Mentions everyone with unanswered entries on a sheet.\n\
        • `/schedule finish <url>` - Shows the ◯ / △ tally for each candidate date.\n\n\
        **Other**\n\
        • `/hello` - Says hello in a random language.\n\
        • `/help` - Shows this help message.\n\n\
        A message counts as read once the member adds any reaction to it.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
