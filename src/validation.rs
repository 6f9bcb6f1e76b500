//! Option validation
//!
//! Runs once when the agent is configured. Every violated rule is recorded so
//! the operator sees all problems in one pass.

use serde_json::{Map, Value};

use crate::core::options::{AgentOptions, boolify, is_present};
use crate::core::ValidationErrors;
use crate::template;

pub const URL_REQUIRED: &str = "url is required";
pub const URL_SCHEME: &str = "url must be http(s)";
pub const DB_REQUIRED: &str = "db is required";
pub const PAYLOAD_NOT_ARRAY: &str = "payload must be an array";
pub const PAYLOAD_NOT_STRINGS: &str = "payload may only contain strings";
pub const RECEIVE_PERIOD_REQUIRED: &str = "Please provide 'expected_receive_period_in_days' to indicate how many days can pass without an update before this Agent is considered to not be working";
pub const DEBUG_INVALID: &str = "debug contains invalid value";

/// Check the shape and presence of every option
pub fn validate_options(options: &AgentOptions) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if options.url.trim().is_empty() {
        errors.add(URL_REQUIRED);
    }
    if !has_http_scheme(&template::render(&options.url, &Map::new())) {
        errors.add(URL_SCHEME);
    }

    if options.db.trim().is_empty() {
        errors.add(DB_REQUIRED);
    }

    if is_present(&options.payload) {
        match &options.payload {
            Value::Array(items) => {
                if !items.iter().all(Value::is_string) {
                    errors.add(PAYLOAD_NOT_STRINGS);
                }
            }
            _ => errors.add(PAYLOAD_NOT_ARRAY),
        }
    }

    if !is_present(&options.expected_receive_period_in_days)
        || options.expected_receive_period_days().is_none()
    {
        errors.add(RECEIVE_PERIOD_REQUIRED);
    }

    if is_present(&options.debug) && boolify(&options.debug).is_none() {
        errors.add(DEBUG_INVALID);
    }

    errors.into_result()
}

/// `http://` or `https://` followed by at least one character
fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .filter_map(|scheme| url.strip_prefix(scheme))
        .any(|rest| !rest.is_empty())
}
