//! Scheduling webhook client and result formatting.
//!
//! The scheduling sheets live behind a single HTTP endpoint. Every call is a
//! POST with a JSON body tagged by `action`; every response carries a
//! `success` flag and either an action-specific payload or a `message`
//! describing the failure. Calls are never retried and failure messages are
//! passed through unchanged.

use crate::{
    config::MemberDirectory,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Write;
use tracing::{debug, instrument};

/// Maximum length of the tally text placed in an embed description.
pub const TALLY_TEXT_LIMIT: usize = 4000;

/// Requests understood by the scheduling webhook.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ScheduleRequest {
    /// Create a new scheduling sheet for an event
    Create {
        /// Event title
        #[serde(rename = "eventName")]
        event_name: String,
    },
    /// List respondents who still have blank answers
    Check {
        /// Sheet to inspect
        #[serde(rename = "sheetUrl")]
        sheet_url: String,
    },
    /// Tally the answers per candidate date
    Finish {
        /// Sheet to tally
        #[serde(rename = "sheetUrl")]
        sheet_url: String,
    },
}

/// Payload of a successful `create`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreatedSheet {
    /// URL of the new sheet
    pub url: String,
}

/// Payload of a successful `check`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PendingRespondents {
    /// Names of respondents with missing answers
    pub names: Vec<String>,
}

/// Answers for one candidate date.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DateTally {
    /// Candidate date as written in the sheet
    pub date: String,
    /// Respondents who answered ◯ (available)
    #[serde(rename = "o", default)]
    pub available: Vec<String>,
    /// Respondents who answered △ (maybe)
    #[serde(rename = "tri", default)]
    pub tentative: Vec<String>,
}

/// Payload of a successful `finish`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Tally {
    /// One entry per candidate date
    pub data: Vec<DateTally>,
}

/// Envelope shared by every webhook response
#[derive(Debug, Deserialize)]
struct Status {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the scheduling webhook.
///
/// Built once at startup and shared by every `/schedule` invocation.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ScheduleClient {
    /// Creates a client that posts to `endpoint`.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Creates a scheduling sheet for `event_name`.
    pub async fn create(&self, event_name: &str) -> Result<CreatedSheet> {
        self.call(&ScheduleRequest::Create {
            event_name: event_name.to_string(),
        })
        .await
    }

    /// Lists respondents with missing answers on `sheet_url`.
    pub async fn check(&self, sheet_url: &str) -> Result<PendingRespondents> {
        self.call(&ScheduleRequest::Check {
            sheet_url: sheet_url.to_string(),
        })
        .await
    }

    /// Tallies the answers on `sheet_url`.
    pub async fn finish(&self, sheet_url: &str) -> Result<Tally> {
        self.call(&ScheduleRequest::Finish {
            sheet_url: sheet_url.to_string(),
        })
        .await
    }

    /// Posts `request` and decodes the payload of a successful response.
    ///
    /// # Errors
    /// Returns [`Error::Upstream`] with the webhook's message when `success` is
    /// false, [`Error::Http`] on transport failure and [`Error::Json`] when the
    /// payload has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn call<T: DeserializeOwned>(&self, request: &ScheduleRequest) -> Result<T> {
        let body: serde_json::Value = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?
            .json()
            .await?;
        debug!("Webhook response: {}", body);

        let status = Status::deserialize(&body)?;
        if !status.success {
            return Err(Error::Upstream {
                message: status
                    .message
                    .unwrap_or_else(|| "The scheduling service reported a failure".to_string()),
            });
        }

        Ok(T::deserialize(body)?)
    }
}

/// Converts pending respondent names to mentions where the directory knows them.
#[must_use]
pub fn pending_mentions(names: &[String], directory: &MemberDirectory) -> Vec<String> {
    names
        .iter()
        .map(|name| directory.mention_or_name(name))
        .collect()
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

/// Formats the tally of every date that has at least one ◯ or △ answer.
///
/// The text is cut to [`TALLY_TEXT_LIMIT`] characters with a note when longer,
/// and replaced by a notice when no date qualifies.
pub fn format_tally(days: &[DateTally]) -> Result<String> {
    let mut text = String::new();

    for day in days
        .iter()
        .filter(|d| !d.available.is_empty() || !d.tentative.is_empty())
    {
        writeln!(&mut text, "**{}**", day.date)?;
        writeln!(
            &mut text,
            "⭕ **{}**: {}",
            day.available.len(),
            join_or_none(&day.available)
        )?;
        if !day.tentative.is_empty() {
            writeln!(
                &mut text,
                "🤔 **{}**: {}",
                day.tentative.len(),
                join_or_none(&day.tentative)
            )?;
        }
        writeln!(&mut text, "----------------")?;
    }

    if text.is_empty() {
        return Ok("No candidate date has any ◯ or △ answers yet.".to_string());
    }

    if text.chars().count() > TALLY_TEXT_LIMIT {
        let mut cut: String = text.chars().take(TALLY_TEXT_LIMIT).collect();
        cut.push_str("...\n(truncated, too long to display)");
        return Ok(cut);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::{Json, Router, routing::post};
    use serde_json::{Value, json};

    async fn start_mock(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_request_bodies() {
        assert_eq!(
            serde_json::to_value(ScheduleRequest::Create {
                event_name: "Spring camp".to_string()
            })
            .unwrap(),
            json!({"action": "create", "eventName": "Spring camp"})
        );
        assert_eq!(
            serde_json::to_value(ScheduleRequest::Check {
                sheet_url: "https://sheet".to_string()
            })
            .unwrap(),
            json!({"action": "check", "sheetUrl": "https://sheet"})
        );
        assert_eq!(
            serde_json::to_value(ScheduleRequest::Finish {
                sheet_url: "https://sheet".to_string()
            })
            .unwrap(),
            json!({"action": "finish", "sheetUrl": "https://sheet"})
        );
    }

    #[tokio::test]
    async fn test_create_returns_sheet_url() {
        let app = Router::new().route(
            "/exec",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["action"], "create");
                assert_eq!(body["eventName"], "Spring camp");
                Json(json!({"success": true, "url": "https://docs.example.com/sheet/1"}))
            }),
        );
        let base = start_mock(app).await;
        let client = ScheduleClient::new(reqwest::Client::new(), format!("{base}/exec"));

        let sheet = client.create("Spring camp").await.unwrap();
        assert_eq!(sheet.url, "https://docs.example.com/sheet/1");
    }

    #[tokio::test]
    async fn test_check_failure_message_surfaced() {
        let app = Router::new().route(
            "/exec",
            post(|| async { Json(json!({"success": false, "message": "sheet not found"})) }),
        );
        let base = start_mock(app).await;
        let client = ScheduleClient::new(reqwest::Client::new(), format!("{base}/exec"));

        let err = client.check("https://missing").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
        assert!(err.to_string().contains("sheet not found"));
    }

    #[tokio::test]
    async fn test_check_returns_pending_names() {
        let app = Router::new().route(
            "/exec",
            post(|| async { Json(json!({"success": true, "names": ["Nao", "Guest"]})) }),
        );
        let base = start_mock(app).await;
        let client = ScheduleClient::new(reqwest::Client::new(), format!("{base}/exec"));

        let pending = client.check("https://sheet").await.unwrap();
        assert_eq!(pending.names, names(&["Nao", "Guest"]));
    }

    #[tokio::test]
    async fn test_finish_parses_tally() {
        let app = Router::new().route(
            "/exec",
            post(|| async {
                Json(json!({
                    "success": true,
                    "data": [
                        {"date": "4/1", "o": ["Nao", "Sana"], "tri": []},
                        {"date": "4/2", "o": [], "tri": ["Rio"]}
                    ]
                }))
            }),
        );
        let base = start_mock(app).await;
        let client = ScheduleClient::new(reqwest::Client::new(), format!("{base}/exec"));

        let tally = client.finish("https://sheet").await.unwrap();
        assert_eq!(tally.data.len(), 2);
        assert_eq!(tally.data[0].available, names(&["Nao", "Sana"]));
        assert_eq!(tally.data[1].tentative, names(&["Rio"]));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_json_error() {
        let app = Router::new().route(
            "/exec",
            post(|| async { Json(json!({"success": true})) }),
        );
        let base = start_mock(app).await;
        let client = ScheduleClient::new(reqwest::Client::new(), format!("{base}/exec"));

        let err = client.create("Event").await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let client = ScheduleClient::new(reqwest::Client::new(), "http://127.0.0.1:1/exec");
        let err = client.check("https://sheet").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn test_pending_mentions_uses_directory() {
        let directory = MemberDirectory::new([("Nao", 42_u64)]);
        let mentions = pending_mentions(&names(&["Nao", "Guest"]), &directory);
        assert_eq!(mentions, names(&["<@42>", "Guest"]));
    }

    #[test]
    fn test_format_tally_skips_empty_dates() {
        let days = vec![
            DateTally {
                date: "4/1".to_string(),
                available: names(&["Nao", "Sana"]),
                tentative: names(&["Rio"]),
            },
            DateTally {
                date: "4/2".to_string(),
                available: vec![],
                tentative: vec![],
            },
            DateTally {
                date: "4/3".to_string(),
                available: vec![],
                tentative: names(&["Ai"]),
            },
        ];

        let text = format_tally(&days).unwrap();

        assert_eq!(
            text,
            "**4/1**\n⭕ **2**: Nao, Sana\n🤔 **1**: Rio\n----------------\n\
             **4/3**\n⭕ **0**: None\n🤔 **1**: Ai\n----------------\n"
        );
    }

    #[test]
    fn test_format_tally_empty() {
        let text = format_tally(&[]).unwrap();
        assert_eq!(text, "No candidate date has any ◯ or △ answers yet.");
    }

    #[test]
    fn test_format_tally_truncates() {
        let days: Vec<DateTally> = (0..200)
            .map(|i| DateTally {
                date: format!("Day {i}"),
                available: names(&["Nao", "Sana", "Rio", "Ai", "Yuiko"]),
                tentative: vec![],
            })
            .collect();

        let text = format_tally(&days).unwrap();

        assert!(text.ends_with("...\n(truncated, too long to display)"));
        assert!(text.starts_with("**Day 0**"));
        assert_eq!(
            text.chars().count(),
            TALLY_TEXT_LIMIT + "...\n(truncated, too long to display)".chars().count()
        );
    }
}
