//! Reminder delivery for users who have not acknowledged a message.
//!
//! Delivery is best effort: one direct message per user, sent sequentially,
//! never retried. Failures are collected in the [`DeliveryReport`] instead of
//! aborting the run.

use crate::core::{
    audit::{AudienceEntry, TargetMessage},
    platform::ChatPlatform,
};
use poise::serenity_prelude::UserId;
use tracing::{info, instrument, warn};

/// Number of characters of the original message shown in a reminder.
pub const PREVIEW_LENGTH: usize = 100;

/// A reminder that could not be delivered.
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    /// The user who did not receive the reminder
    pub user: AudienceEntry,
    /// Why delivery failed (usually closed DMs)
    pub reason: String,
}

/// Aggregate result of a reminder run.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    /// Users who received the reminder, in delivery order
    pub delivered: Vec<UserId>,
    /// Users the reminder could not be delivered to
    pub failed: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    /// Number of reminders delivered
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.delivered.len()
    }

    /// Number of reminders that failed
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of delivery attempts
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.sent_count() + self.failed_count()
    }
}

/// Shortens `content` to [`PREVIEW_LENGTH`] characters, appending `...` when cut.
#[must_use]
pub fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_LENGTH).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Builds the direct message sent to each unacknowledged user.
#[must_use]
pub fn reminder_text(message: &TargetMessage) -> String {
    format!(
        "**📝 Unread message reminder**\n\
         Have you read the message below yet?\n\
         Once you have, please react to it in the channel!\n\n\
         📍 Message\n{}\n\n\
         ⏰ Posted: <t:{}:f>\n\n\
         💬 Content\n{}",
        message.link(),
        message.created_at.timestamp(),
        preview(&message.content)
    )
}

/// Sends a reminder to every user in `recipients`, one at a time.
///
/// A failed delivery is logged and recorded; the remaining users are still
/// attempted.
#[instrument(skip_all, fields(message_id = %message.id, recipients = recipients.len()))]
pub async fn notify<P>(
    platform: &P,
    message: &TargetMessage,
    recipients: &[AudienceEntry],
) -> DeliveryReport
where
    P: ChatPlatform + ?Sized,
{
    let content = reminder_text(message);
    let mut report = DeliveryReport::default();

    for recipient in recipients {
        match platform.send_direct_message(recipient.id, &content).await {
            Ok(()) => report.delivered.push(recipient.id),
            Err(e) => {
                warn!(
                    "Failed to send reminder to {} ({}), DMs may be disabled: {}",
                    recipient.handle, recipient.id, e
                );
                report.failed.push(DeliveryFailure {
                    user: recipient.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Reminders sent: {}, failed: {}",
        report.sent_count(),
        report.failed_count()
    );
    report
}
