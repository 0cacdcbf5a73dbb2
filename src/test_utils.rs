//! Shared test utilities.
//!
//! [`MockPlatform`] is an in-memory [`ChatPlatform`] with builder-style setup and
//! call recording, plus helpers for building members, mentions and messages
//! with sensible defaults.

use crate::{
    core::{
        audit::{Addressing, TargetMessage},
        platform::{ChatPlatform, MemberSnapshot, MentionedUser},
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, ReactionType, RoleId, UserId};
use std::{
    collections::HashSet,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

/// ID of the bot account in tests
pub const TEST_BOT_ID: u64 = 999;
/// Guild every test message lives in
pub const TEST_GUILD_ID: u64 = 1000;
/// Channel every test message lives in
pub const TEST_CHANNEL_ID: u64 = 2000;
/// ID of the message returned by [`target_message`]
pub const TEST_MESSAGE_ID: u64 = 3000;

/// The ID of the message built by [`target_message`].
pub fn test_message_id() -> MessageId {
    MessageId::new(TEST_MESSAGE_ID)
}

/// A human member with the given roles and channel visibility.
pub fn member(id: u64, roles: &[u64], can_view_channel: bool) -> MemberSnapshot {
    MemberSnapshot {
        id: UserId::new(id),
        handle: format!("user{id}"),
        bot: false,
        roles: roles.iter().copied().map(RoleId::new).collect(),
        can_view_channel,
    }
}

/// A bot member that can view the channel.
pub fn bot_member(id: u64) -> MemberSnapshot {
    bot_member_with_roles(id, &[])
}

/// A bot member holding the given roles.
pub fn bot_member_with_roles(id: u64, roles: &[u64]) -> MemberSnapshot {
    MemberSnapshot {
        bot: true,
        handle: format!("bot{id}"),
        ..member(id, roles, true)
    }
}

/// An individually mentioned human user.
pub fn mentioned(id: u64) -> MentionedUser {
    MentionedUser {
        id: UserId::new(id),
        handle: format!("user{id}"),
        bot: false,
    }
}

/// An individually mentioned bot.
pub fn mentioned_bot(id: u64) -> MentionedUser {
    MentionedUser {
        id: UserId::new(id),
        handle: format!("bot{id}"),
        bot: true,
    }
}

/// The 👍 reaction.
pub fn thumbs_up() -> ReactionType {
    ReactionType::Unicode("👍".to_string())
}

/// A message with ID [`TEST_MESSAGE_ID`] in the test guild and channel.
pub fn target_message(addressing: Addressing, reactions: Vec<ReactionType>) -> TargetMessage {
    TargetMessage {
        id: test_message_id(),
        guild_id: GuildId::new(TEST_GUILD_ID),
        channel_id: ChannelId::new(TEST_CHANNEL_ID),
        author: UserId::new(1),
        content: "Please check the new rota".to_string(),
        created_at: Utc
            .with_ymd_and_hms(2025, 4, 1, 9, 30, 0)
            .single()
            .unwrap_or_default(),
        addressing,
        reactions,
    }
}

/// In-memory chat platform.
#[derive(Debug)]
pub struct MockPlatform {
    bot_id: UserId,
    message: Option<TargetMessage>,
    members: Vec<MemberSnapshot>,
    cached: Vec<MemberSnapshot>,
    refresh_fails: bool,
    reactions: Vec<(ReactionType, Option<Vec<UserId>>)>,
    dm_disabled: HashSet<UserId>,
    refreshes: AtomicUsize,
    reaction_calls: Mutex<Vec<ReactionType>>,
    dm_attempts: Mutex<Vec<UserId>>,
    sent: Mutex<Vec<(UserId, String)>>,
}

impl MockPlatform {
    /// A platform with no message, no members and no reactions.
    pub fn new() -> Self {
        Self {
            bot_id: UserId::new(TEST_BOT_ID),
            message: None,
            members: Vec::new(),
            cached: Vec::new(),
            refresh_fails: false,
            reactions: Vec::new(),
            dm_disabled: HashSet::new(),
            refreshes: AtomicUsize::new(0),
            reaction_calls: Mutex::new(Vec::new()),
            dm_attempts: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Makes `message` fetchable by its ID.
    pub fn with_message(mut self, message: TargetMessage) -> Self {
        self.message = Some(message);
        self
    }

    /// Members returned by a successful refresh.
    pub fn with_members(mut self, members: Vec<MemberSnapshot>) -> Self {
        self.members = members;
        self
    }

    /// Members returned from the local cache.
    pub fn with_cached_members(mut self, members: Vec<MemberSnapshot>) -> Self {
        self.cached = members;
        self
    }

    /// Makes every member refresh fail.
    pub fn failing_refresh(mut self) -> Self {
        self.refresh_fails = true;
        self
    }

    /// Users who applied `reaction`.
    pub fn with_reaction(mut self, reaction: ReactionType, users: &[u64]) -> Self {
        let users = users.iter().copied().map(UserId::new).collect();
        self.reactions.push((reaction, Some(users)));
        self
    }

    /// Makes fetching the users of `reaction` fail.
    pub fn with_failing_reaction(mut self, reaction: ReactionType) -> Self {
        self.reactions.push((reaction, None));
        self
    }

    /// Makes direct messages to `user` fail.
    pub fn with_dm_disabled(mut self, user: u64) -> Self {
        self.dm_disabled.insert(UserId::new(user));
        self
    }

    /// Number of member refreshes requested
    pub fn refresh_calls(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Reactions whose users were requested, in order
    pub fn reaction_calls(&self) -> Vec<ReactionType> {
        lock(&self.reaction_calls).clone()
    }

    /// Users a direct message was attempted to, in order
    pub fn dm_attempts(&self) -> Vec<UserId> {
        lock(&self.dm_attempts).clone()
    }

    /// Direct messages that were delivered
    pub fn sent_messages(&self) -> Vec<(UserId, String)> {
        lock(&self.sent).clone()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    fn current_user_id(&self) -> UserId {
        self.bot_id
    }

    async fn fetch_message(&self, message_id: MessageId) -> Result<TargetMessage> {
        self.message
            .clone()
            .filter(|message| message.id == message_id)
            .ok_or_else(|| Error::MessageNotFound {
                message_id: message_id.to_string(),
            })
    }

    async fn refresh_members(&self) -> Result<Vec<MemberSnapshot>> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.refresh_fails {
            return Err(Error::Upstream {
                message: "You are being rate limited.".to_string(),
            });
        }
        Ok(self.members.clone())
    }

    fn cached_members(&self) -> Vec<MemberSnapshot> {
        self.cached.clone()
    }

    async fn reaction_users(
        &self,
        _message_id: MessageId,
        reaction: &ReactionType,
    ) -> Result<Vec<UserId>> {
        lock(&self.reaction_calls).push(reaction.clone());
        match self.reactions.iter().find(|(r, _)| r == reaction) {
            Some((_, Some(users))) => Ok(users.clone()),
            Some((_, None)) => Err(Error::Upstream {
                message: "Unknown Emoji".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn send_direct_message(&self, user: UserId, content: &str) -> Result<()> {
        lock(&self.dm_attempts).push(user);
        if self.dm_disabled.contains(&user) {
            return Err(Error::Upstream {
                message: "Cannot send messages to this user".to_string(),
            });
        }
        lock(&self.sent).push((user, content.to_string()));
        Ok(())
    }
}
