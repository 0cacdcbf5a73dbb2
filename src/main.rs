#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use receipt_buddy::{
    bot::{self, BotData},
    config::{AppConfig, MemberDirectory},
    core::schedule::ScheduleClient,
    errors::Result,
    health,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file first so RUST_LOG can come from it
    let dotenv_result = dotenv(); // Non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    match dotenv_result {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => info!("No .env file loaded: {}", e),
    }

    // 3. Load configuration
    let config = AppConfig::from_env()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    let members = MemberDirectory::load(&config.members_path)
        .inspect_err(|e| error!("Failed to load member directory: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Health endpoint
    let listener = health::server::bind(config.port).await?;
    tokio::spawn(async move {
        if let Err(e) = health::server::serve(listener).await {
            error!("Health server stopped: {}", e);
        }
    });

    // 5. Periodic health check
    let _monitor = health::monitor::start(&config)
        .await
        .inspect_err(|e| error!("Failed to start health check job: {}", e))?;

    // 6. Run the bot
    let schedule = config
        .schedule_webhook_url
        .as_deref()
        .map(|url| ScheduleClient::new(reqwest::Client::new(), url));
    if schedule.is_none() {
        warn!("SCHEDULE_WEBHOOK_URL is not set, /schedule will report an error");
    }

    bot::run_bot(&config, BotData::new(schedule, members)).await
}
