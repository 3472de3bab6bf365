//! Extraction of notification fields from an event.
//!
//! Recognized event fields, all optional:
//! * `sns` - destination override
//! * `sns_subject` - subject
//! * `sns_message` - body
//! * `sns_message_attribute` - attribute JSON
//! * `host` - subject fallback

use crate::core::{Codec, Event};
use anyhow::Result;
use serde_json::Value;

pub const DESTINATION_FIELD: &str = "sns";
pub const SUBJECT_FIELD: &str = "sns_subject";
pub const MESSAGE_FIELD: &str = "sns_message";
pub const ATTRIBUTES_FIELD: &str = "sns_message_attribute";
pub const HOST_FIELD: &str = "host";

/// Subject used when the event offers neither a subject nor a host.
pub const NO_SUBJECT: &str = "NO SUBJECT";

/// Where the notification body comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageSource {
    /// Text taken from the event as-is; the codec is bypassed.
    RawText(String),
    /// A value that still has to go through the codec.
    Encode(Value),
}

impl MessageSource {
    /// Produces the final body text.
    pub fn render(self, codec: &dyn Codec) -> Result<String> {
        match self {
            MessageSource::RawText(text) => Ok(text),
            MessageSource::Encode(value) => codec.encode(&value),
        }
    }
}

/// The raw notification fields pulled out of one event.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFields {
    /// `None` if neither the event nor the configuration names a destination.
    pub destination: Option<String>,
    pub subject: String,
    pub message: MessageSource,
    pub attributes_json: Option<String>,
}

/// Resolves the notification fields of `event`, falling back to
/// `default_destination` when the event does not name one.
pub fn resolve(event: &Event, default_destination: Option<&str>) -> ResolvedFields {
    ResolvedFields {
        destination: resolve_destination(event, default_destination),
        subject: resolve_subject(event),
        message: resolve_message(event),
        attributes_json: resolve_attributes_json(event),
    }
}

fn resolve_destination(event: &Event, default_destination: Option<&str>) -> Option<String> {
    event
        .get_str(DESTINATION_FIELD)
        .filter(|destination| !destination.is_empty())
        .or(default_destination)
        .map(str::to_string)
}

fn resolve_subject(event: &Event) -> String {
    event
        .get(SUBJECT_FIELD)
        .or_else(|| event.get(HOST_FIELD))
        .map(text_or_json)
        .unwrap_or_else(|| NO_SUBJECT.to_string())
}

fn resolve_message(event: &Event) -> MessageSource {
    match event.get(MESSAGE_FIELD) {
        Some(Value::String(text)) => MessageSource::RawText(text.clone()),
        Some(value) => MessageSource::Encode(value.clone()),
        None => MessageSource::Encode(event.to_value()),
    }
}

fn resolve_attributes_json(event: &Event) -> Option<String> {
    event.get(ATTRIBUTES_FIELD).map(text_or_json)
}

fn text_or_json(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
