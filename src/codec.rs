//! Codecs that render event values into notification body text.

use crate::core::Codec;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which codec the service uses for bodies that are not already text.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecKind {
    #[default]
    Json,
    Plain,
}

impl CodecKind {
    pub fn build(self) -> Box<dyn Codec> {
        match self {
            CodecKind::Json => Box::new(JsonCodec),
            CodecKind::Plain => Box::new(PlainCodec),
        }
    }
}

/// Encodes any value as compact JSON.
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }
}

/// Passes text through verbatim and encodes everything else as compact JSON.
pub struct PlainCodec;

impl Codec for PlainCodec {
    fn encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(text) => Ok(text.clone()),
            other => Ok(serde_json::to_string(other)?),
        }
    }
}
