//! Read-receipt audit business logic.
//!
//! An audit works out who a message was addressed to, who reacted to it, and
//! splits the addressed users into acknowledged and unacknowledged lists. All
//! Discord access goes through [`ChatPlatform`], so everything here is testable
//! without a gateway connection.

use crate::{
    core::platform::{ChatPlatform, MemberSnapshot, MentionedUser},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, ReactionType, RoleId, UserId};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Who a message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    /// `@everyone` or `@here`
    Broadcast,
    /// Explicit role and user mentions, in the order they appear
    Mentions {
        /// Mentioned roles
        roles: Vec<RoleId>,
        /// Individually mentioned users
        users: Vec<MentionedUser>,
    },
}

/// The message whose acknowledgment is being audited.
#[derive(Debug, Clone)]
pub struct TargetMessage {
    /// Message ID
    pub id: MessageId,
    /// Guild the message was posted in
    pub guild_id: GuildId,
    /// Channel the message was posted in
    pub channel_id: ChannelId,
    /// Author of the message
    pub author: UserId,
    /// Message body
    pub content: String,
    /// When the message was posted
    pub created_at: DateTime<Utc>,
    /// Addressing mode
    pub addressing: Addressing,
    /// Distinct reactions attached to the message
    pub reactions: Vec<ReactionType>,
}

impl TargetMessage {
    /// Whether the message addresses everyone who can see the channel.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        matches!(self.addressing, Addressing::Broadcast)
    }

    /// Deep link that opens the message in the Discord client.
    #[must_use]
    pub fn link(&self) -> String {
        format!(
            "https://discord.com/channels/{}/{}/{}",
            self.guild_id, self.channel_id, self.id
        )
    }
}

/// One user considered addressed by the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceEntry {
    /// User ID
    pub id: UserId,
    /// Display handle
    pub handle: String,
}

impl AudienceEntry {
    /// Discord mention markup for this user
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl From<&MemberSnapshot> for AudienceEntry {
    fn from(member: &MemberSnapshot) -> Self {
        Self {
            id: member.id,
            handle: member.handle.clone(),
        }
    }
}

impl From<&MentionedUser> for AudienceEntry {
    fn from(user: &MentionedUser) -> Self {
        Self {
            id: user.id,
            handle: user.handle.clone(),
        }
    }
}

/// A reaction whose user list could not be fetched.
#[derive(Debug, Clone)]
pub struct ReactionFailure {
    /// The reaction that was skipped
    pub reaction: ReactionType,
    /// Why the fetch failed
    pub reason: String,
}

/// Everyone who reacted to the message with any emoji.
#[derive(Debug, Clone, Default)]
pub struct ReactionAuthors {
    /// Union of the users across all fetched reactions
    pub users: HashSet<UserId>,
    /// Reactions that were skipped because their users could not be fetched
    pub failures: Vec<ReactionFailure>,
}

impl ReactionAuthors {
    /// Whether `user` reacted to the message
    #[must_use]
    pub fn contains(&self, user: UserId) -> bool {
        self.users.contains(&user)
    }
}

/// Outcome of one audit: the audience split by acknowledgment.
#[derive(Debug, Clone, Default)]
pub struct AuditResult {
    /// Addressed users who reacted, in audience order
    pub acknowledged: Vec<AudienceEntry>,
    /// Addressed users who did not react, in audience order
    pub unacknowledged: Vec<AudienceEntry>,
    /// Number of reactions skipped because their users could not be fetched
    pub skipped_reactions: usize,
}

impl AuditResult {
    /// Total number of addressed users
    #[must_use]
    pub fn audience_len(&self) -> usize {
        self.acknowledged.len() + self.unacknowledged.len()
    }
}

/// What an audit produced.
#[derive(Debug, Clone)]
pub enum AuditOutcome {
    /// Nobody was addressed by the message; nothing to report.
    NoAudience(TargetMessage),
    /// The audience was resolved and partitioned.
    Completed {
        /// The audited message
        message: TargetMessage,
        /// The partition
        result: AuditResult,
    },
}

/// Parses a user-supplied message ID.
///
/// # Errors
/// Returns [`Error::InvalidMessageId`] unless the input is a non-zero integer.
pub fn parse_message_id(input: &str) -> Result<MessageId> {
    input
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(MessageId::new)
        .ok_or_else(|| Error::InvalidMessageId {
            input: input.to_string(),
        })
}

/// Audits the acknowledgment state of a message.
///
/// Fetches the message, resolves its audience, collects the authors of every
/// reaction and partitions the audience. Nothing is cached: every call sees the
/// current state of the message.
#[instrument(skip(platform))]
pub async fn audit<P>(platform: &P, message_id: MessageId) -> Result<AuditOutcome>
where
    P: ChatPlatform + ?Sized,
{
    let message = platform.fetch_message(message_id).await?;

    let audience = resolve_audience(platform, &message).await;
    if audience.is_empty() {
        info!("Message {} has no audience", message.id);
        return Ok(AuditOutcome::NoAudience(message));
    }

    let authors = collect_reaction_authors(platform, &message).await;
    let result = partition(audience, &authors);

    info!(
        "Audited message {}: {} acknowledged, {} unacknowledged, {} reactions skipped",
        message.id,
        result.acknowledged.len(),
        result.unacknowledged.len(),
        result.skipped_reactions
    );

    Ok(AuditOutcome::Completed { message, result })
}

/// Resolves the users addressed by `message`.
///
/// Broadcast messages address every non-bot member who can view the channel.
/// Otherwise the audience is the non-bot members of every mentioned role followed
/// by the non-bot individually mentioned users. The bot itself is always removed.
/// Entries are unique by user ID and keep the order of first appearance.
pub async fn resolve_audience<P>(platform: &P, message: &TargetMessage) -> Vec<AudienceEntry>
where
    P: ChatPlatform + ?Sized,
{
    let mut audience: IndexMap<UserId, AudienceEntry> = IndexMap::new();

    match &message.addressing {
        Addressing::Broadcast => {
            let members = load_members(platform).await;
            for member in members.iter().filter(|m| !m.bot && m.can_view_channel) {
                audience
                    .entry(member.id)
                    .or_insert_with(|| AudienceEntry::from(member));
            }
        }
        Addressing::Mentions { roles, users } => {
            if !roles.is_empty() {
                let members = load_members(platform).await;
                for role in roles {
                    for member in members
                        .iter()
                        .filter(|m| !m.bot && m.roles.contains(role))
                    {
                        audience
                            .entry(member.id)
                            .or_insert_with(|| AudienceEntry::from(member));
                    }
                }
            }

            for user in users.iter().filter(|u| !u.bot) {
                audience
                    .entry(user.id)
                    .or_insert_with(|| AudienceEntry::from(user));
            }
        }
    }

    audience.shift_remove(&platform.current_user_id());

    debug!("Resolved audience of {} users", audience.len());
    audience.into_values().collect()
}

/// Refreshes the member list, falling back to the cached members on failure.
async fn load_members<P>(platform: &P) -> Vec<MemberSnapshot>
where
    P: ChatPlatform + ?Sized,
{
    match platform.refresh_members().await {
        Ok(members) => members,
        Err(e) => {
            warn!("Member refresh failed, continuing with cached members: {}", e);
            platform.cached_members()
        }
    }
}

/// Collects everyone who reacted to `message`, one reaction at a time.
///
/// A reaction whose users cannot be fetched is logged and recorded in
/// [`ReactionAuthors::failures`]; the remaining reactions are still processed.
pub async fn collect_reaction_authors<P>(platform: &P, message: &TargetMessage) -> ReactionAuthors
where
    P: ChatPlatform + ?Sized,
{
    let mut authors = ReactionAuthors::default();

    for reaction in &message.reactions {
        match platform.reaction_users(message.id, reaction).await {
            Ok(users) => authors.users.extend(users),
            Err(e) => {
                warn!("Failed to fetch users for reaction {}: {}", reaction, e);
                authors.failures.push(ReactionFailure {
                    reaction: reaction.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    authors
}

/// Splits `audience` by whether each user reacted, keeping audience order.
#[must_use]
pub fn partition(audience: Vec<AudienceEntry>, authors: &ReactionAuthors) -> AuditResult {
    let (acknowledged, unacknowledged) = audience
        .into_iter()
        .partition(|entry| authors.contains(entry.id));

    AuditResult {
        acknowledged,
        unacknowledged,
        skipped_reactions: authors.failures.len(),
    }
}

/// Maximum length of an embed field value.
pub const FIELD_VALUE_LIMIT: usize = 1024;

/// Room kept free for the "...and N more" line
const OVERFLOW_NOTE_RESERVE: usize = 32;

/// Formats entries as one mention per line, or `"None"` when empty.
///
/// When the list would exceed `limit` bytes, the remaining entries are
/// summarised as a final "...and N more" line.
#[must_use]
pub fn format_mention_list(entries: &[AudienceEntry], limit: usize) -> String {
    if entries.is_empty() {
        return "None".to_string();
    }

    let budget = limit.saturating_sub(OVERFLOW_NOTE_RESERVE);
    let mut text = String::new();

    for (shown, entry) in entries.iter().enumerate() {
        let mention = entry.mention();
        let is_last = shown + 1 == entries.len();
        let needed = text.len() + usize::from(!text.is_empty()) + mention.len();

        if needed > budget && !(is_last && needed <= limit) {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&format!("...and {} more", entries.len() - shown));
            break;
        }

        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&mention);
    }

    text
}
