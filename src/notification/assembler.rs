//! Assembly of publish requests and delivery through a `Publisher`.

use crate::attributes::parse_attributes;
use crate::core::{Codec, Event, NotificationRequest, Publisher};
use crate::notification::{resolver, NotificationError};
use crate::truncate::{trim, trim_to_bytes};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Subject limit of the messaging backend, in bytes and in characters.
pub const MAX_SUBJECT_BYTES: usize = 100;
/// Message limit of the messaging backend, in bytes.
pub const MAX_BODY_BYTES: usize = 32768;

/// Turns resolved fields into `NotificationRequest`s and publishes them.
pub struct NotificationAssembler {
    publisher: Arc<dyn Publisher>,
}

impl NotificationAssembler {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    /// Builds a request, trimming subject and body to the backend limits.
    ///
    /// Fails with `MissingDestination` when `destination` is absent or empty.
    /// Attributes that resolve to nothing leave the request without an
    /// attributes block at all.
    pub fn assemble(
        destination: Option<&str>,
        subject: &str,
        body: &str,
        attributes_json: Option<&str>,
    ) -> Result<NotificationRequest, NotificationError> {
        let destination = require_destination(destination)?;

        Ok(NotificationRequest {
            destination: destination.to_string(),
            subject: trim(subject, MAX_SUBJECT_BYTES, Some(MAX_SUBJECT_BYTES)).to_string(),
            body: trim_to_bytes(body, MAX_BODY_BYTES).to_string(),
            attributes: parse_attributes(attributes_json),
        })
    }

    /// Hands a request to the publisher. Failures are reported, not retried.
    #[instrument(skip_all, fields(destination = %request.destination, publisher = self.publisher.name()))]
    pub async fn publish(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        let start = Instant::now();
        let result = self.publisher.publish(&request).await;
        metrics::histogram!("publish_duration_seconds").record(start.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                debug!("Notification published.");
                metrics::counter!("notifications_published_total").increment(1);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to publish notification");
                Err(NotificationError::Dispatch {
                    publisher: self.publisher.name().to_string(),
                    destination: request.destination,
                    source: e,
                })
            }
        }
    }

    /// Resolves, assembles and publishes the notification for one event.
    pub async fn notify(
        &self,
        event: &Event,
        default_destination: Option<&str>,
        codec: &dyn Codec,
    ) -> Result<(), NotificationError> {
        let fields = resolver::resolve(event, default_destination);
        // Checked before rendering so a codec is never run for an event that cannot be sent.
        require_destination(fields.destination.as_deref())?;
        let body = fields
            .message
            .render(codec)
            .map_err(NotificationError::Encoding)?;
        let request = Self::assemble(
            fields.destination.as_deref(),
            &fields.subject,
            &body,
            fields.attributes_json.as_deref(),
        )?;
        self.publish(request).await
    }
}

fn require_destination(destination: Option<&str>) -> Result<&str, NotificationError> {
    destination
        .filter(|destination| !destination.is_empty())
        .ok_or(NotificationError::MissingDestination)
}

/// Ties an assembler to the long-lived settings every event shares.
pub struct Notifier {
    assembler: NotificationAssembler,
    default_destination: Option<String>,
    codec: Box<dyn Codec>,
}

impl Notifier {
    pub fn new(
        assembler: NotificationAssembler,
        default_destination: Option<String>,
        codec: Box<dyn Codec>,
    ) -> Self {
        Self {
            assembler,
            default_destination,
            codec,
        }
    }

    pub fn assembler(&self) -> &NotificationAssembler {
        &self.assembler
    }

    /// Publishes the notification for `event`, counting failures by reason.
    pub async fn handle(&self, event: &Event) -> Result<(), NotificationError> {
        let result = self
            .assembler
            .notify(event, self.default_destination.as_deref(), self.codec.as_ref())
            .await;
        if let Err(e) = &result {
            metrics::counter!("notifications_failed_total", "reason" => e.reason()).increment(1);
            if matches!(e, NotificationError::MissingDestination) {
                info!("Dropping event without a destination.");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::core::AttributeValue;
    use crate::notification::test_utils::RecordingPublisher;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        Event::try_from(value).unwrap()
    }

    #[test]
    fn test_assemble_requires_destination() {
        assert!(matches!(
            NotificationAssembler::assemble(None, "s", "b", None),
            Err(NotificationError::MissingDestination)
        ));
        assert!(matches!(
            NotificationAssembler::assemble(Some(""), "s", "b", None),
            Err(NotificationError::MissingDestination)
        ));
    }

    #[test]
    fn test_assemble_trims_body_to_exact_limit() {
        let body = "a".repeat(40_000);
        let request = NotificationAssembler::assemble(Some("topic"), "s", &body, None).unwrap();
        assert_eq!(request.body.len(), MAX_BODY_BYTES);
    }

    #[test]
    fn test_assemble_trims_multibyte_subject_on_char_boundary() {
        // 60 two-byte characters is 120 bytes; only 50 fit.
        let subject = "é".repeat(60);
        let request = NotificationAssembler::assemble(Some("topic"), &subject, "b", None).unwrap();
        assert_eq!(request.subject, "é".repeat(50));
    }

    #[test]
    fn test_assemble_keeps_short_fields_unchanged() {
        let request =
            NotificationAssembler::assemble(Some("topic"), "subject", "body", None).unwrap();
        assert_eq!(request.destination, "topic");
        assert_eq!(request.subject, "subject");
        assert_eq!(request.body, "body");
        assert_eq!(request.attributes, None);
    }

    #[test]
    fn test_assemble_omits_attributes_for_malformed_json() {
        let request =
            NotificationAssembler::assemble(Some("topic"), "s", "b", Some("{broken")).unwrap();
        assert_eq!(request.attributes, None);
    }

    #[test]
    fn test_assemble_attaches_parsed_attributes() {
        let request = NotificationAssembler::assemble(
            Some("topic"),
            "s",
            "b",
            Some(r#"{"channel": "x", "severity": 5}"#),
        )
        .unwrap();
        let attributes = request.attributes.unwrap();
        assert_eq!(
            attributes.get("channel"),
            Some(&AttributeValue::String("x".to_string()))
        );
        assert_eq!(
            attributes.get("severity"),
            Some(&AttributeValue::Number(5.into()))
        );
    }

    #[tokio::test]
    async fn test_notify_publishes_resolved_request() {
        // Arrange
        let publisher = RecordingPublisher::new();
        let assembler = NotificationAssembler::new(Arc::new(publisher.clone()));
        let event = event(json!({
            "sns": "topic-a",
            "sns_subject": "disk full",
            "sns_message": "disk / is 99% full",
            "sns_message_attribute": "{\"severity\": 5}"
        }));

        // Act
        let result = assembler.notify(&event, Some("default"), &JsonCodec).await;

        // Assert
        assert!(result.is_ok());
        let sent = publisher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, "topic-a");
        assert_eq!(sent[0].subject, "disk full");
        assert_eq!(sent[0].body, "disk / is 99% full");
        assert!(sent[0].attributes.as_ref().unwrap().contains_key("severity"));
    }

    #[tokio::test]
    async fn test_notify_without_destination_does_not_call_publisher() {
        // Arrange
        let publisher = RecordingPublisher::new();
        let assembler = NotificationAssembler::new(Arc::new(publisher.clone()));

        // Act
        let result = assembler
            .notify(&event(json!({ "message": "x" })), None, &JsonCodec)
            .await;

        // Assert
        assert!(matches!(result, Err(NotificationError::MissingDestination)));
        assert_eq!(publisher.call_count(), 0);
    }

    struct FailingCodec;

    impl Codec for FailingCodec {
        fn encode(&self, _value: &serde_json::Value) -> anyhow::Result<String> {
            anyhow::bail!("codec unavailable")
        }
    }

    #[tokio::test]
    async fn test_missing_destination_is_reported_before_encoding() {
        // Arrange
        let publisher = RecordingPublisher::new();
        let assembler = NotificationAssembler::new(Arc::new(publisher.clone()));

        // Act
        let result = assembler
            .notify(&event(json!({ "message": "x" })), None, &FailingCodec)
            .await;

        // Assert
        assert!(matches!(result, Err(NotificationError::MissingDestination)));
        assert_eq!(publisher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_codec_failure_with_destination_is_an_encoding_error() {
        let publisher = RecordingPublisher::new();
        let assembler = NotificationAssembler::new(Arc::new(publisher.clone()));

        let result = assembler
            .notify(&event(json!({ "message": "x" })), Some("topic"), &FailingCodec)
            .await;

        assert!(matches!(result, Err(NotificationError::Encoding(_))));
        assert_eq!(publisher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces_as_dispatch_error() {
        // Arrange
        let publisher = RecordingPublisher::new();
        publisher.fail_next("backend unavailable");
        let assembler = NotificationAssembler::new(Arc::new(publisher.clone()));
        let request = NotificationAssembler::assemble(Some("topic"), "s", "b", None).unwrap();

        // Act
        let result = assembler.publish(request).await;

        // Assert
        match result {
            Err(NotificationError::Dispatch {
                publisher: name,
                destination,
                source,
            }) => {
                assert_eq!(name, "recording");
                assert_eq!(destination, "topic");
                assert_eq!(source.to_string(), "backend unavailable");
            }
            other => panic!("expected dispatch error, got {:?}", other),
        }
        // Exactly one attempt; no retry.
        assert_eq!(publisher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_notifier_uses_default_destination_and_codec() {
        // Arrange
        let publisher = RecordingPublisher::new();
        let notifier = Notifier::new(
            NotificationAssembler::new(Arc::new(publisher.clone())),
            Some("default-topic".to_string()),
            Box::new(JsonCodec),
        );

        // Act
        notifier
            .handle(&event(json!({ "host": "web-1", "message": "up" })))
            .await
            .unwrap();

        // Assert
        let sent = publisher.sent();
        assert_eq!(sent[0].destination, "default-topic");
        assert_eq!(sent[0].subject, "web-1");
        assert_eq!(sent[0].body, r#"{"host":"web-1","message":"up"}"#);
    }
}
