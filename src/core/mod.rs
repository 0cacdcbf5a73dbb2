//! Core business logic - framework-agnostic audit, reminder and scheduling operations.
//!
//! Nothing in here talks to the gateway directly. Discord access goes through
//! [`platform::ChatPlatform`] and the scheduling sheets through
//! [`schedule::ScheduleClient`].

/// Read-receipt audit: audience resolution, reaction collection, partition
pub mod audit;
/// Greeting phrases
pub mod greeting;
/// Chat platform abstraction used by the auditor
pub mod platform;
/// Reminder delivery to unacknowledged users
pub mod reminder;
/// Scheduling webhook client and formatting
pub mod schedule;
