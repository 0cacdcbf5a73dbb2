//! HTTP server answering health checks.

use crate::errors::Result;
use axum::{Json, Router, routing::get};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Body returned by `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Always `"ok"` while the process is serving
    pub status: String,
    /// Human-readable summary
    pub message: String,
    /// Crate version
    pub version: String,
    /// RFC 3339 time the response was produced
    pub timestamp: String,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        message: "Discord bot is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Routes served by the health server.
pub fn router() -> Router {
    Router::new().route("/", get(health))
}

/// Binds the health server on all interfaces at `port`.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    info!("Health server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Serves health checks until the process exits.
pub async fn serve(listener: TcpListener) -> Result<()> {
    axum::serve(listener, router()).await?;
    Ok(())
}
