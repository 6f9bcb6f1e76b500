//! Loading agent options from the environment or an options file
//!
//! Option values are never taken from command line flags. A JSON file using
//! the documented option keys is preferred; otherwise the environment is read.

use crate::core::{AgentOptions, WriterError, WriterResult};
use serde_json::Value;
use std::env;
use std::path::Path;
use tracing::info;

pub const URL_VAR: &str = "INFLUXDB_URL";
pub const DB_VAR: &str = "INFLUXDB_DB";
pub const PAYLOAD_VAR: &str = "INFLUXDB_PAYLOAD";
pub const RECEIVE_PERIOD_VAR: &str = "INFLUXDB_EXPECTED_RECEIVE_PERIOD_IN_DAYS";
pub const DEBUG_VAR: &str = "INFLUXDB_DEBUG";

/// Loads agent options from environment variables
///
/// # Environment Variables
///
/// - `INFLUXDB_URL`: connection URL of the database
/// - `INFLUXDB_DB`: database name
/// - `INFLUXDB_PAYLOAD`: JSON array of line protocol statements, or one
///   statement per line (optional)
/// - `INFLUXDB_EXPECTED_RECEIVE_PERIOD_IN_DAYS`: defaults to "1"
/// - `INFLUXDB_DEBUG`: defaults to "false"
///
/// Missing values are left blank here; validation reports them together.
pub fn load_options_from_env() -> AgentOptions {
    options_from_lookup(|key| env::var(key).ok())
}

/// Builds options from any key lookup, `load_options_from_env` passes the
/// process environment
pub fn options_from_lookup<F>(lookup: F) -> AgentOptions
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = AgentOptions::default();

    let url = lookup(URL_VAR).unwrap_or_default();
    let db = lookup(DB_VAR).unwrap_or_default();
    info!("InfluxDB URL from env: {:?}", url);
    info!("InfluxDB database from env: {:?}", db);

    let payload = lookup(PAYLOAD_VAR)
        .map(|raw| parse_payload(&raw))
        .unwrap_or(defaults.payload);

    let expected_receive_period_in_days = lookup(RECEIVE_PERIOD_VAR)
        .map(Value::String)
        .unwrap_or(defaults.expected_receive_period_in_days);
    let debug = lookup(DEBUG_VAR)
        .map(Value::String)
        .unwrap_or(defaults.debug);

    AgentOptions {
        url,
        db,
        payload,
        expected_receive_period_in_days,
        debug,
    }
}

/// A JSON array is taken as-is, anything else is split into non-blank lines
fn parse_payload(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Array(_)) => value,
        _ => Value::Array(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| Value::String(line.to_string()))
                .collect(),
        ),
    }
}

/// Loads agent options from a JSON file
pub fn load_options_from_file(path: &Path) -> WriterResult<AgentOptions> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        WriterError::config(format!("Cannot read options file {}: {}", path.display(), e))
    })?;
    info!("Options loaded from {}", path.display());
    Ok(AgentOptions::from_json_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_options_from_empty_environment_use_defaults() {
        let options = options_from_lookup(lookup_from(&[]));
        assert_eq!(options, AgentOptions::default());
    }

    #[test]
    fn test_options_from_environment() {
        let options = options_from_lookup(lookup_from(&[
            (URL_VAR, "http://influx:8086"),
            (DB_VAR, "mydb"),
            (PAYLOAD_VAR, r#"["cpu,host=a value=1"]"#),
            (RECEIVE_PERIOD_VAR, "2"),
            (DEBUG_VAR, "true"),
        ]));

        assert_eq!(options.url, "http://influx:8086");
        assert_eq!(options.db, "mydb");
        assert_eq!(options.payload, json!(["cpu,host=a value=1"]));
        assert_eq!(options.expected_receive_period_in_days, json!("2"));
        assert_eq!(options.debug, json!("true"));
    }

    #[test]
    fn test_payload_as_lines() {
        let options = options_from_lookup(lookup_from(&[(
            PAYLOAD_VAR,
            "m1 v=1\n\n  m2 v=2  \n",
        )]));
        assert_eq!(options.payload, json!(["m1 v=1", "m2 v=2"]));
    }

    #[test]
    fn test_payload_json_non_array_treated_as_line() {
        let options = options_from_lookup(lookup_from(&[(PAYLOAD_VAR, "\"m v=1\"")]));
        assert_eq!(options.payload, json!(["\"m v=1\""]));
    }

    #[test]
    fn test_load_options_from_file() {
        let path = std::env::temp_dir().join(format!(
            "write_influxdb_options_{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(
            &path,
            r#"{"url": "https://influx", "db": "metrics", "influx_payload": ["m v=1"], "debug": true}"#,
        )
        .unwrap();

        let options = load_options_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(options.url, "https://influx");
        assert_eq!(options.payload, json!(["m v=1"]));
        assert_eq!(options.debug, json!(true));
        assert_eq!(options.expected_receive_period_in_days, Value::Null);
    }

    #[test]
    fn test_load_options_with_both_payload_keys() {
        let path = std::env::temp_dir().join(format!(
            "write_influxdb_options_{}.json",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(
            &path,
            r#"{"url": "http://influx:8086", "db": "d", "payload": [], "influx_payload": ["m v=1"], "expected_receive_period_in_days": "1"}"#,
        )
        .unwrap();

        let options = load_options_from_file(&path);
        std::fs::remove_file(&path).unwrap();

        let options = options.unwrap();
        assert_eq!(options.payload, json!(["m v=1"]));
        assert!(crate::validation::validate_options(&options).is_ok());
    }

    #[test]
    fn test_load_options_from_missing_file() {
        let err = load_options_from_file(Path::new("/nonexistent/options.json")).unwrap_err();
        assert!(matches!(err, WriterError::Configuration { .. }));
    }
}
