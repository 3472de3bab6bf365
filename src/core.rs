//! Core domain types and service traits for snsout
//!
//! This module defines the event and notification data structures and the
//! trait contracts for the two external capabilities the pipeline depends on:
//! the `Publisher` that delivers a notification and the `Codec` that turns an
//! arbitrary value into body text.

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// An inbound application event: a loosely-structured record of named fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    /// Creates an event from an already-parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Returns the value of a field, treating an explicit JSON `null` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    /// Returns the field value only if it is text.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Returns the whole event as a JSON value, for encoding by a codec.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

impl TryFrom<Value> for Event {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => anyhow::bail!("event must be a JSON object, got {}", json_kind(&other)),
        }
    }
}

/// A single typed attribute value attached to a notification.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Free text.
    String(String),
    /// A number, keeping whether it was written as an integer or a float.
    Number(Number),
    /// An ordered list of text values.
    StringArray(Vec<String>),
}

impl AttributeValue {
    /// The backend data type name for this value.
    pub fn data_type(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "String",
            AttributeValue::Number(_) => "Number",
            AttributeValue::StringArray(_) => "String.Array",
        }
    }

    /// The value rendered the way the backend expects it in `StringValue`.
    pub fn string_value(&self) -> String {
        match self {
            AttributeValue::String(text) => text.clone(),
            AttributeValue::Number(number) => number.to_string(),
            AttributeValue::StringArray(items) => Value::from(items.clone()).to_string(),
        }
    }

    /// Converts the value into its wire representation.
    pub fn to_wire(&self) -> WireAttribute {
        WireAttribute {
            data_type: self.data_type(),
            string_value: self.string_value(),
        }
    }
}

/// The wire form of an attribute, as sent to the messaging backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireAttribute {
    pub data_type: &'static str,
    pub string_value: String,
}

/// An insertion-ordered map from attribute name to typed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    entries: IndexMap<String, AttributeValue>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value. An existing name keeps its position and takes the new value.
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// The attribute names in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl Serialize for AttributeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, &value.to_wire())?;
        }
        map.end()
    }
}

/// A fully-shaped notification, ready to hand to a `Publisher`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRequest {
    /// The topic the notification is published to. Never empty.
    pub destination: String,
    /// Short title, trimmed to the backend subject limit.
    pub subject: String,
    /// Main payload, trimmed to the backend message limit.
    pub body: String,
    /// Typed attributes. `None` means the attributes block is omitted entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeMap>,
}

// =============================================================================
// Service Traits
// =============================================================================

/// Delivers notifications to a messaging backend.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// A unique, descriptive name for the publisher (e.g., "log", "http").
    /// Used for logging and metrics.
    fn name(&self) -> &str;

    /// Publishes a single notification.
    ///
    /// # Returns
    /// * `Ok(())` if the backend accepted the notification
    /// * `Err` if delivery failed; the caller does not retry
    async fn publish(&self, request: &NotificationRequest) -> Result<()>;
}

/// Converts an arbitrary value into final body text.
pub trait Codec: Send + Sync {
    fn encode(&self, value: &Value) -> Result<String>;
}

/// A short human-readable name for the shape of a JSON value.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_treats_null_as_absent() {
        let event = Event::try_from(json!({ "host": null, "sns": "topic" })).unwrap();
        assert!(event.get("host").is_none());
        assert_eq!(event.get_str("sns"), Some("topic"));
    }

    #[test]
    fn test_event_rejects_non_object() {
        assert!(Event::try_from(json!(["a"])).is_err());
    }

    #[test]
    fn test_attribute_map_preserves_insertion_order_and_replaces_in_place() {
        let mut map = AttributeMap::new();
        map.insert("b", AttributeValue::String("1".into()));
        map.insert("a", AttributeValue::String("2".into()));
        map.insert("b", AttributeValue::String("3".into()));

        assert_eq!(map.keys(), vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&AttributeValue::String("3".into())));
    }

    #[test]
    fn test_attribute_map_handles_many_keys_in_order() {
        let mut map = AttributeMap::new();
        for i in 0..10_000 {
            map.insert(format!("key{}", i), AttributeValue::Number(i.into()));
        }

        assert_eq!(map.len(), 10_000);
        assert_eq!(map.keys()[9_999], "key9999");
        assert_eq!(map.get("key42"), Some(&AttributeValue::Number(42.into())));
        let serialized = serde_json::to_value(&map).unwrap();
        let first = serialized.as_object().unwrap().keys().next().cloned();
        assert_eq!(first.as_deref(), Some("key0"));
    }

    #[test]
    fn test_request_serializes_wire_attributes() {
        let mut attributes = AttributeMap::new();
        attributes.insert("severity", AttributeValue::Number(5.into()));
        attributes.insert(
            "tags",
            AttributeValue::StringArray(vec!["a".into(), "b".into()]),
        );
        let request = NotificationRequest {
            destination: "topic".into(),
            subject: "s".into(),
            body: "b".into(),
            attributes: Some(attributes),
        };

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value["attributes"],
            json!({
                "severity": { "DataType": "Number", "StringValue": "5" },
                "tags": { "DataType": "String.Array", "StringValue": "[\"a\",\"b\"]" }
            })
        );
    }

    #[test]
    fn test_request_omits_absent_attributes() {
        let request = NotificationRequest {
            destination: "topic".into(),
            subject: "s".into(),
            body: "b".into(),
            attributes: None,
        };

        let value = serde_json::to_value(&request).unwrap();

        assert!(value.get("attributes").is_none());
    }

    #[test]
    fn test_float_number_keeps_its_kind() {
        let value = AttributeValue::Number(Number::from_f64(1.5).unwrap());
        assert_eq!(value.string_value(), "1.5");
        assert_eq!(value.data_type(), "Number");
    }
}
