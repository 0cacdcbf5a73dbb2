//! Serenity implementation of [`ChatPlatform`].
//!
//! A [`SerenityPlatform`] is built per command invocation for the channel the
//! command was used in. Construction validates that the channel is a guild text
//! channel the bot can read; the audit itself never sees other channel kinds.

use crate::{
    core::{
        audit::{Addressing, TargetMessage},
        platform::{ChatPlatform, MemberSnapshot, MentionedUser},
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::DateTime;
use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

/// Members requested per page when refreshing the member list (API maximum)
const MEMBER_PAGE_SIZE: u16 = 1000;
/// Users requested per page when listing a reaction (API maximum)
const REACTION_PAGE_SIZE: u8 = 100;

/// Accepts only plain guild text channels.
///
/// # Errors
/// Returns [`Error::UnsupportedChannel`] for every other channel kind.
pub const fn ensure_text_channel(kind: serenity::ChannelType) -> Result<()> {
    match kind {
        serenity::ChannelType::Text => Ok(()),
        _ => Err(Error::UnsupportedChannel),
    }
}

/// Requires the permissions needed to read a message and its reactions.
///
/// # Errors
/// Returns [`Error::Unauthorized`] without `VIEW_CHANNEL` or `READ_MESSAGE_HISTORY`.
pub fn ensure_readable(permissions: serenity::Permissions) -> Result<()> {
    if permissions.view_channel() && permissions.read_message_history() {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

/// Resolves `channel_id` to a guild text channel.
///
/// # Errors
/// Returns [`Error::UnsupportedChannel`] for DMs, threads, voice, forum and
/// announcement channels.
pub async fn text_channel(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
) -> Result<serenity::GuildChannel> {
    match channel_id.to_channel(ctx).await? {
        serenity::Channel::Guild(channel) => {
            ensure_text_channel(channel.kind)?;
            Ok(channel)
        }
        _ => Err(Error::UnsupportedChannel),
    }
}

/// Converts a fetched message into the audit's view of it.
///
/// `@everyone` and `@here` both set `mention_everyone`, which makes the
/// message a broadcast regardless of any other mentions.
pub fn target_message(
    message: serenity::Message,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) -> TargetMessage {
    let addressing = if message.mention_everyone {
        Addressing::Broadcast
    } else {
        Addressing::Mentions {
            roles: message.mention_roles.clone(),
            users: message
                .mentions
                .iter()
                .map(|user| MentionedUser {
                    id: user.id,
                    handle: user.tag(),
                    bot: user.bot,
                })
                .collect(),
        }
    };

    TargetMessage {
        id: message.id,
        guild_id,
        channel_id,
        author: message.author.id,
        created_at: DateTime::from_timestamp(message.timestamp.unix_timestamp(), 0)
            .unwrap_or_default(),
        reactions: message
            .reactions
            .iter()
            .map(|reaction| reaction.reaction_type.clone())
            .collect(),
        content: message.content,
        addressing,
    }
}

/// Fetches every page of a user-keyed listing.
///
/// `fetch` receives the ID of the last item seen so far (`None` for the first
/// page). Listing stops at the first page shorter than `page_size`.
pub async fn paginate<T, I, F, Fut>(page_size: usize, id_of: I, mut fetch: F) -> Result<Vec<T>>
where
    I: Fn(&T) -> serenity::UserId,
    F: FnMut(Option<serenity::UserId>) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut items = Vec::new();
    let mut after = None;

    loop {
        let page = fetch(after).await?;
        let page_len = page.len();
        if let Some(last) = page.last() {
            after = Some(id_of(last));
        }
        items.extend(page);

        if page_len == 0 || page_len < page_size {
            break;
        }
    }

    Ok(items)
}

/// Discord access for auditing messages in one guild text channel.
pub struct SerenityPlatform<'a> {
    ctx: &'a serenity::Context,
    guild: serenity::PartialGuild,
    channel: serenity::GuildChannel,
    bot_id: serenity::UserId,
}

impl<'a> SerenityPlatform<'a> {
    /// Binds to `channel_id` in `guild_id`.
    ///
    /// # Errors
    /// - [`Error::GuildUnavailable`] outside a guild or when the guild cannot be fetched
    /// - [`Error::UnsupportedChannel`] when the channel is not a text channel
    /// - [`Error::Unauthorized`] when the bot cannot view the channel or read its history
    pub async fn for_channel(
        ctx: &'a serenity::Context,
        guild_id: Option<serenity::GuildId>,
        channel_id: serenity::ChannelId,
    ) -> Result<Self> {
        let guild_id = guild_id.ok_or(Error::GuildUnavailable)?;
        let channel = text_channel(ctx, channel_id).await?;

        let guild = guild_id.to_partial_guild(ctx).await.map_err(|e| {
            warn!("Failed to fetch guild {}: {}", guild_id, e);
            Error::GuildUnavailable
        })?;

        let bot_id = ctx.cache.current_user().id;
        let bot_member = guild_id.member(ctx, bot_id).await?;
        ensure_readable(guild.user_permissions_in(&channel, &bot_member))?;

        Ok(Self {
            ctx,
            guild,
            channel,
            bot_id,
        })
    }

    fn snapshot(&self, member: &serenity::Member) -> MemberSnapshot {
        MemberSnapshot {
            id: member.user.id,
            handle: member.user.tag(),
            bot: member.user.bot,
            roles: member.roles.clone(),
            can_view_channel: self
                .guild
                .user_permissions_in(&self.channel, member)
                .view_channel(),
        }
    }
}

#[async_trait]
impl ChatPlatform for SerenityPlatform<'_> {
    fn current_user_id(&self) -> serenity::UserId {
        self.bot_id
    }

    async fn fetch_message(&self, message_id: serenity::MessageId) -> Result<TargetMessage> {
        let message = self
            .channel
            .id
            .message(self.ctx, message_id)
            .await
            .map_err(|e| {
                warn!("Failed to fetch message {}: {}", message_id, e);
                Error::MessageNotFound {
                    message_id: message_id.to_string(),
                }
            })?;

        Ok(target_message(message, self.guild.id, self.channel.id))
    }

    async fn refresh_members(&self) -> Result<Vec<MemberSnapshot>> {
        let ctx = self.ctx;
        let guild_id = self.guild.id;

        let members = paginate(
            usize::from(MEMBER_PAGE_SIZE),
            |member: &serenity::Member| member.user.id,
            move |after| async move {
                Ok(guild_id
                    .members(ctx, Some(u64::from(MEMBER_PAGE_SIZE)), after)
                    .await?)
            },
        )
        .await?;

        debug!("Refreshed {} members of guild {}", members.len(), guild_id);
        Ok(members.iter().map(|member| self.snapshot(member)).collect())
    }

    fn cached_members(&self) -> Vec<MemberSnapshot> {
        self.ctx
            .cache
            .guild(self.guild.id)
            .map(|guild| {
                guild
                    .members
                    .values()
                    .map(|member| self.snapshot(member))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn reaction_users(
        &self,
        message_id: serenity::MessageId,
        reaction: &serenity::ReactionType,
    ) -> Result<Vec<serenity::UserId>> {
        let ctx = self.ctx;
        let channel_id = self.channel.id;

        let users = paginate(
            usize::from(REACTION_PAGE_SIZE),
            |user: &serenity::User| user.id,
            |after| {
                let reaction = reaction.clone();
                async move {
                    Ok(channel_id
                        .reaction_users(ctx, message_id, reaction, Some(REACTION_PAGE_SIZE), after)
                        .await?)
                }
            },
        )
        .await?;

        Ok(users.into_iter().map(|user| user.id).collect())
    }

    async fn send_direct_message(&self, user: serenity::UserId, content: &str) -> Result<()> {
        user.direct_message(self.ctx, serenity::CreateMessage::new().content(content))
            .await?;
        Ok(())
    }
}
