//! Parsing of notification attributes into the typed wire schema.
//!
//! Attributes arrive as a flat JSON object. Each value is classified once, at
//! this boundary, into an `AttributeValue`; anything outside the supported
//! shapes (text, number, array of text) is dropped key by key so one bad value
//! never costs the rest of the map.

use crate::core::{json_kind, AttributeMap, AttributeValue};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AttributeError {
    #[error("attribute JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("attribute JSON must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("attribute '{key}' is an array with a non-string element")]
    NonStringArrayElement { key: String },

    #[error("attribute '{key}' has unsupported type {kind}")]
    UnsupportedType { key: String, kind: &'static str },
}

/// Parses attribute JSON into a typed map.
///
/// Returns `None` (no attributes block at all) when the input is absent, empty,
/// malformed or not a JSON object. A parse failure is logged, never raised.
/// `Some` with an empty map means the object was valid but had no usable keys.
pub fn parse_attributes(json: Option<&str>) -> Option<AttributeMap> {
    let json = json.filter(|text| !text.is_empty())?;
    match try_parse_attributes(json) {
        Ok(attributes) => Some(attributes),
        Err(e) => {
            warn!(error = %e, "Ignoring notification attributes");
            metrics::counter!("attribute_parse_failures_total").increment(1);
            None
        }
    }
}

/// Parses attribute JSON, reporting why the whole block was rejected.
///
/// Unsupported values inside a valid object are dropped, not reported as errors.
pub fn try_parse_attributes(json: &str) -> Result<AttributeMap, AttributeError> {
    let fields = match serde_json::from_str::<Value>(json)? {
        Value::Object(fields) => fields,
        other => return Err(AttributeError::NotAnObject(json_kind(&other))),
    };

    let mut attributes = AttributeMap::new();
    for (key, value) in fields {
        match classify(&key, value) {
            Ok(attribute) => attributes.insert(key, attribute),
            Err(e @ AttributeError::NonStringArrayElement { .. }) => {
                warn!(error = %e, "Dropping notification attribute");
                metrics::counter!("attributes_dropped_total").increment(1);
            }
            Err(e) => {
                debug!(error = %e, "Dropping notification attribute");
                metrics::counter!("attributes_dropped_total").increment(1);
            }
        }
    }
    Ok(attributes)
}

fn classify(key: &str, value: Value) -> Result<AttributeValue, AttributeError> {
    match value {
        Value::String(text) => Ok(AttributeValue::String(text)),
        Value::Number(number) => Ok(AttributeValue::Number(number)),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => Ok(text),
                _ => Err(AttributeError::NonStringArrayElement {
                    key: key.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AttributeValue::StringArray),
        other => Err(AttributeError::UnsupportedType {
            key: key.to_string(),
            kind: json_kind(&other),
        }),
    }
}
