//! `{{ path }}` interpolation of option strings against event fields
//!
//! Only variable lookups are supported. Paths are dotted (`a.b`) with array
//! indexes written either as `a[0]` or `a.0`. Undefined variables render as
//! the empty string.

use serde_json::{Map, Value};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Render a template string against the fields of an event
pub fn render(template: &str, fields: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };

        out.push_str(&rest[..start]);
        if let Some(value) = lookup(fields, after_open[..end].trim()) {
            push_value(&mut out, value);
        }
        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

/// Render every string inside `value`, recursing into arrays and objects
pub fn interpolate_value(value: &Value, fields: &Map<String, Value>) -> Value {
    match value {
        Value::String(s) => Value::String(render(s, fields)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_value(item, fields))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_value(v, fields)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Resolve a dotted path such as `sensor.readings[0].value`
pub fn lookup<'a>(fields: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path_segments(path)?.into_iter();
    let mut current = fields.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

fn path_segments(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for part in path.split('.') {
        let (head, mut indexes) = match part.find('[') {
            Some(i) => (&part[..i], &part[i..]),
            None => (part, ""),
        };
        if !head.is_empty() {
            segments.push(head);
        }
        while let Some(stripped) = indexes.strip_prefix('[') {
            let close = stripped.find(']')?;
            segments.push(stripped[..close].trim());
            indexes = &stripped[close + 1..];
        }
        if !indexes.is_empty() {
            return None;
        }
    }

    if segments.is_empty() { None } else { Some(segments) }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        composite => out.push_str(&composite.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_plain_text_untouched() {
        let f = fields(json!({}));
        assert_eq!(render("cpu,host=a value=1", &f), "cpu,host=a value=1");
    }

    #[test]
    fn test_render_substitutes_top_level_fields() {
        let f = fields(json!({"host": "server01", "load": 0.64, "up": true}));
        assert_eq!(
            render("cpu,host={{host}} load={{ load }},up={{ up }}", &f),
            "cpu,host=server01 load=0.64,up=true"
        );
    }

    #[test]
    fn test_render_undefined_is_empty() {
        let f = fields(json!({"a": null}));
        assert_eq!(render("x={{ missing }}|{{ a }}", &f), "x=|");
    }

    #[test]
    fn test_render_nested_paths_and_indexes() {
        let f = fields(json!({
            "sensor": {"name": "t1", "readings": [{"v": 10}, {"v": 11}]}
        }));
        assert_eq!(render("{{ sensor.name }}", &f), "t1");
        assert_eq!(render("{{ sensor.readings[1].v }}", &f), "11");
        assert_eq!(render("{{ sensor.readings.0.v }}", &f), "10");
        assert_eq!(render("{{ sensor.readings[5].v }}", &f), "");
    }

    #[test]
    fn test_render_composite_values_as_json() {
        let f = fields(json!({"tags": ["a", "b"]}));
        assert_eq!(render("{{ tags }}", &f), r#"["a","b"]"#);
    }

    #[test]
    fn test_render_unclosed_braces_left_verbatim() {
        let f = fields(json!({"a": "1"}));
        assert_eq!(render("{{ a }} and {{ b", &f), "1 and {{ b");
    }

    #[test]
    fn test_interpolate_value_recurses() {
        let f = fields(json!({"m": "mem"}));
        let rendered = interpolate_value(&json!(["{{ m }} v=1", 5, {"k": "{{ m }}"}]), &f);
        assert_eq!(rendered, json!(["mem v=1", 5, {"k": "mem"}]));
    }

    #[test]
    fn test_lookup_rejects_malformed_paths() {
        let f = fields(json!({"a": [1]}));
        assert!(lookup(&f, "").is_none());
        assert!(lookup(&f, "a[0").is_none());
        assert_eq!(lookup(&f, "a[0]"), Some(&json!(1)));
    }
}
