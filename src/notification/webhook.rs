//! A publisher that delivers notifications to an HTTP endpoint.
//!
//! Each request is POSTed as JSON. The backend is expected to answer with a
//! 2xx status; anything else is a failed publish.

use crate::core::{NotificationRequest, Publisher};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::task;
use tracing::{error, instrument};

/// A client for POSTing notifications to a webhook URL.
pub struct HttpPublisher {
    url: String,
    auth_token: Option<String>,
    timeout: Duration,
}

impl HttpPublisher {
    /// Creates a new `HttpPublisher`.
    pub fn new(url: String, auth_token: Option<String>, timeout: Duration) -> Self {
        Self {
            url,
            auth_token,
            timeout,
        }
    }

    /// Builds the JSON envelope sent to the backend.
    fn payload(request: &NotificationRequest) -> anyhow::Result<Value> {
        let mut payload = serde_json::to_value(request)?;
        payload["published_at"] = json!(Utc::now().to_rfc3339());
        Ok(payload)
    }

    /// Sends the request in a blocking manner.
    fn send_request(
        client: reqwest::blocking::Client,
        url: &str,
        auth_token: Option<&str>,
        payload: &Value,
    ) -> anyhow::Result<()> {
        let mut builder = client.post(url).json(payload);
        if let Some(token) = auth_token {
            builder = builder.bearer_auth(token);
        }

        match builder.send() {
            Ok(res) => {
                if res.status().is_success() {
                    Ok(())
                } else {
                    let status = res.status();
                    let text = res.text().unwrap_or_default();
                    error!(
                        status = %status,
                        body = %text,
                        "Backend rejected notification"
                    );
                    anyhow::bail!(
                        "Backend rejected notification: status {}, body: {}",
                        status,
                        text
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "HTTP request to backend failed");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(destination = %request.destination))]
    async fn publish(&self, request: &NotificationRequest) -> anyhow::Result<()> {
        let payload = Self::payload(request)?;
        let url = self.url.clone();
        let auth_token = self.auth_token.clone();
        let timeout = self.timeout;

        let result = task::spawn_blocking(move || {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()?;
            Self::send_request(client, &url, auth_token.as_deref(), &payload)
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "HTTP publish task failed");
                Err(e.into())
            }
        }
    }
}
