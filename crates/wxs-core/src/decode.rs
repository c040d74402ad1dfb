//! Record decoding
//!
//! Payloads are parsed into a generic JSON tree rather than a fixed schema
//! because the provider's response shape evolves independently of us.

use serde_json::{Map, Value};

use crate::{PipelineError, PipelineResult};

/// Key of the marker object standing in for an empty payload
pub const EMPTY_MARKER_KEY: &str = "MessageError";

/// Value of the marker object standing in for an empty payload
pub const EMPTY_MARKER_MESSAGE: &str = "data is empty.";

/// A decoded stream payload
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    /// Top-level JSON object
    Tree(Map<String, Value>),
    /// Blank payload or JSON `null`; carries no metric fields
    Empty,
}

impl DecodedPayload {
    pub fn is_empty(&self) -> bool {
        matches!(self, DecodedPayload::Empty)
    }

    /// The object tree, if any
    pub fn tree(&self) -> Option<&Map<String, Value>> {
        match self {
            DecodedPayload::Tree(map) => Some(map),
            DecodedPayload::Empty => None,
        }
    }

    /// JSON form used for archival; an empty payload becomes the marker
    /// object `{"MessageError": "data is empty."}`.
    pub fn to_json(&self) -> Value {
        match self {
            DecodedPayload::Tree(map) => Value::Object(map.clone()),
            DecodedPayload::Empty => {
                let mut marker = Map::new();
                marker.insert(
                    EMPTY_MARKER_KEY.to_string(),
                    Value::String(EMPTY_MARKER_MESSAGE.to_string()),
                );
                Value::Object(marker)
            }
        }
    }
}

/// Decode raw stream bytes as UTF-8 JSON text.
///
/// Blank input and `null` decode to [`DecodedPayload::Empty`]. Invalid
/// UTF-8, invalid JSON, and non-object top-level values are
/// [`PipelineError::MalformedPayload`].
pub fn decode(raw: &[u8]) -> PipelineResult<DecodedPayload> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| PipelineError::MalformedPayload(format!("invalid UTF-8: {}", e)))?;

    if text.trim().is_empty() {
        return Ok(DecodedPayload::Empty);
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| PipelineError::MalformedPayload(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(DecodedPayload::Tree(map)),
        Value::Null => Ok(DecodedPayload::Empty),
        other => Err(PipelineError::MalformedPayload(format!(
            "expected a JSON object, found {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
