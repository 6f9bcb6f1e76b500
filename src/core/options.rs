//! Agent options as supplied by the host
//!
//! Values that the host may hand over in arbitrary shapes (payload, receive
//! period, debug flag) are kept as raw JSON so validation can report a wrong
//! shape instead of rejecting the whole document at deserialization time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::template;

/// Options for the write agent, mirroring the documented option keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAgentOptions")]
pub struct AgentOptions {
    /// Connection URL of the database, e.g. `http://influx:8086`
    pub url: String,
    /// Database name
    pub db: String,
    /// Line protocol statements, one request each
    pub payload: Value,
    /// Days without a received event before the host considers the agent idle
    pub expected_receive_period_in_days: Value,
    /// Boolean-like flag enabling agent log output of endpoint, lines and statuses
    pub debug: Value,
}

/// Options document as written by the host
///
/// `influx_payload` is the older name of `payload`; both may appear.
#[derive(Deserialize)]
struct RawAgentOptions {
    #[serde(default)]
    url: String,
    #[serde(default)]
    db: String,
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    influx_payload: Option<Value>,
    #[serde(default)]
    expected_receive_period_in_days: Value,
    #[serde(default)]
    debug: Value,
}

impl From<RawAgentOptions> for AgentOptions {
    fn from(raw: RawAgentOptions) -> Self {
        // `payload` wins when set, the same precedence events use
        let payload = match (raw.payload, raw.influx_payload) {
            (Some(payload), _) if is_present(&payload) => payload,
            (_, Some(legacy)) => legacy,
            (Some(payload), None) => payload,
            (None, None) => default_payload(),
        };

        Self {
            url: raw.url,
            db: raw.db,
            payload,
            expected_receive_period_in_days: raw.expected_receive_period_in_days,
            debug: raw.debug,
        }
    }
}

fn default_payload() -> Value {
    Value::Array(Vec::new())
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            db: String::new(),
            payload: default_payload(),
            expected_receive_period_in_days: json!("1"),
            debug: json!("false"),
        }
    }
}

/// Options after template rendering against a single event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolatedOptions {
    pub url: String,
    pub db: String,
    pub payload: Vec<String>,
    pub debug: bool,
}

impl AgentOptions {
    /// Parse options from a JSON document
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Render every option against the fields of one event
    ///
    /// Non-string payload entries are dropped here; validation has already
    /// rejected them for a configured agent.
    pub fn interpolate(&self, fields: &Map<String, Value>) -> InterpolatedOptions {
        let payload = match template::interpolate_value(&self.payload, fields) {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(line) => Some(line),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let debug = boolify(&template::interpolate_value(&self.debug, fields)) == Some(true);

        InterpolatedOptions {
            url: template::render(&self.url, fields),
            db: template::render(&self.db, fields),
            payload,
            debug,
        }
    }

    /// Receive period as a positive day count, if one is configured
    pub fn expected_receive_period_days(&self) -> Option<u64> {
        let days = match &self.expected_receive_period_in_days {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 1.0).map(|f| f as u64)),
            Value::String(s) => leading_integer(s).and_then(|n| u64::try_from(n).ok()),
            _ => None,
        };
        days.filter(|days| *days > 0)
    }

    /// Receive period as a duration
    pub fn expected_receive_period(&self) -> Option<chrono::Duration> {
        self.expected_receive_period_days()
            .and_then(|days| i64::try_from(days).ok())
            .and_then(chrono::Duration::try_days)
    }
}

/// Interpret a boolean-like option value
///
/// Only `true`/`false` and their string forms qualify; everything else is
/// `None`.
pub fn boolify(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

/// Whether an option value counts as set
///
/// Null, `false`, whitespace-only strings, empty arrays and empty objects are
/// all absent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Integer prefix of a string, `0` when there are no leading digits
///
/// Leading whitespace and a single sign are accepted, anything after the
/// digits is ignored (`"2days"` is 2). Returns `None` only on overflow.
pub fn leading_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());

    if end == 0 {
        return Some(0);
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
