//! Chat platform seam used by the read-receipt auditor.
//!
//! The auditor only needs a handful of Discord operations. They are collected in
//! [`ChatPlatform`] so the audit logic can run against the live serenity client
//! (see `bot::platform`) or an in-memory double in tests.

use crate::{core::audit::TargetMessage, errors::Result};
use async_trait::async_trait;
use poise::serenity_prelude::{MessageId, ReactionType, RoleId, UserId};

/// A guild member as seen from the audited channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSnapshot {
    /// User ID
    pub id: UserId,
    /// Display handle used in logs
    pub handle: String,
    /// Whether the account is a bot
    pub bot: bool,
    /// Roles held by the member
    pub roles: Vec<RoleId>,
    /// Whether the member can view the audited channel
    pub can_view_channel: bool,
}

/// A user mentioned individually in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionedUser {
    /// User ID
    pub id: UserId,
    /// Display handle used in logs
    pub handle: String,
    /// Whether the account is a bot
    pub bot: bool,
}

/// Discord operations needed to audit one message in one channel.
///
/// An implementation is bound to a single guild channel for the lifetime of a
/// command invocation.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// ID of the bot account itself
    fn current_user_id(&self) -> UserId;

    /// Fetches the message to audit.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::MessageNotFound`] if the message cannot be retrieved.
    async fn fetch_message(&self, message_id: MessageId) -> Result<TargetMessage>;

    /// Requests the full member list of the guild from the API.
    async fn refresh_members(&self) -> Result<Vec<MemberSnapshot>>;

    /// Members already known locally, used when a refresh fails.
    fn cached_members(&self) -> Vec<MemberSnapshot>;

    /// Fetches every user who applied `reaction` to the message.
    async fn reaction_users(
        &self,
        message_id: MessageId,
        reaction: &ReactionType,
    ) -> Result<Vec<UserId>>;

    /// Sends a direct message to `user`.
    async fn send_direct_message(&self, user: UserId, content: &str) -> Result<()>;
}
