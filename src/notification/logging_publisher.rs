//! A publisher that only logs what it would have sent.
//!
//! Useful for dry runs and for validating the notification pipeline without
//! a messaging backend.

use crate::core::{NotificationRequest, Publisher};
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct LoggingPublisher;

impl LoggingPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Publisher for LoggingPublisher {
    fn name(&self) -> &str {
        "log"
    }

    async fn publish(&self, request: &NotificationRequest) -> anyhow::Result<()> {
        info!(
            destination = %request.destination,
            subject = %request.subject,
            body_bytes = request.body.len(),
            attributes = request.attributes.as_ref().map_or(0, |a| a.len()),
            "Notification published to log"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_publisher_always_succeeds() {
        let request = NotificationRequest {
            destination: "topic".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            attributes: None,
        };
        assert!(LoggingPublisher::new().publish(&request).await.is_ok());
    }
}
