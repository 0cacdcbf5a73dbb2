//! Periodic health check job.

use crate::{config::AppConfig, errors::Result};
use reqwest::StatusCode;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Requests `url` once and returns the response status.
pub async fn ping(http: &reqwest::Client, url: &str) -> Result<StatusCode> {
    let response = http.get(url).send().await?;
    Ok(response.status())
}

/// Pings `url` and logs the outcome. Returns whether the endpoint answered
/// with a success status.
pub async fn check_once(http: &reqwest::Client, url: &str) -> bool {
    match ping(http, url).await {
        Ok(status) if status.is_success() => {
            info!("Health check succeeded: {} ({})", url, status);
            true
        }
        Ok(status) => {
            warn!("Health check failed: {} ({})", url, status);
            false
        }
        Err(e) => {
            error!("Health check error for {}: {}", url, e);
            false
        }
    }
}

/// Starts the health check job.
///
/// The job runs on `config.health_check_cron` and pings
/// `config.health_check_url`. The returned scheduler keeps running in the
/// background.
pub async fn start(config: &AppConfig) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let http = reqwest::Client::new();
    let url = config.health_check_url.clone();

    let job = Job::new_async(config.health_check_cron.as_str(), move |_uuid, _lock| {
        let http = http.clone();
        let url = url.clone();

        Box::pin(async move {
            check_once(&http, &url).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!(
        "Health check scheduled ({}) for {}",
        config.health_check_cron, config.health_check_url
    );

    Ok(scheduler)
}
