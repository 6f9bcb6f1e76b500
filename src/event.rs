//! Events handed to the agent by the host

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::core::{WriterError, WriterResult};

/// Keys an event may carry its own line protocol statements under, in order
/// of preference
pub const PAYLOAD_KEYS: [&str; 2] = ["payload", "influx_payload"];

/// An opaque key/value record from the upstream pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub payload: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(payload: Map<String, Value>) -> Self {
        Self {
            payload,
            created_at: Utc::now(),
        }
    }

    /// Build an event from a JSON value, which must be an object
    pub fn from_value(value: Value) -> WriterResult<Self> {
        match value {
            Value::Object(payload) => Ok(Self::new(payload)),
            other => Err(WriterError::config(format!(
                "event must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Parse one line of JSON into an event
    pub fn from_json_line(line: &str) -> WriterResult<Self> {
        Self::from_value(serde_json::from_str(line)?)
    }

    /// Line protocol statements carried by the event itself
    ///
    /// The first recognized key whose array yields at least one string wins.
    /// Non-string elements are skipped.
    pub fn payload_lines(&self) -> Vec<String> {
        PAYLOAD_KEYS
            .iter()
            .filter_map(|key| Some((*key, self.payload.get(*key)?.as_array()?)))
            .map(|(key, items)| string_lines(key, items))
            .find(|lines| !lines.is_empty())
            .unwrap_or_default()
    }
}

fn string_lines(key: &str, items: &[Value]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::String(line) => Some(line.clone()),
            other => {
                warn!(
                    "Skipping non-string {} entry {} ({})",
                    key,
                    index,
                    json_type_name(other)
                );
                None
            }
        })
        .collect()
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
