//! Liveness endpoint and the periodic job that pings it.
//!
//! Hosting platforms that idle inactive processes keep the bot alive as long as
//! something requests the endpoint; the monitor does that on a cron schedule.

/// Cron job pinging the health endpoint
pub mod monitor;
/// HTTP server answering health checks
pub mod server;
