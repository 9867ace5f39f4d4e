//! Pulls a JSON object out of free-form model output.
//!
//! Models wrap their JSON in prose, markdown fences or trailing chatter. The
//! extractor takes the widest `{ ... }` span (first `{` to last `}`) and tries
//! to parse it. Failure is an expected outcome and is reported as `None`.
//! Fields are then read leniently: a missing, null or mistyped field is empty.

use serde_json::Value;

pub fn extract_json(text: &str) -> Option<Value> {
    let span = object_span(text)?;
    match serde_json::from_str::<Value>(span) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Discarding malformed JSON span: {}", e);
            None
        }
    }
}

/// Parses the first complete JSON object in `text` and ignores whatever
/// follows it, including further braces.
pub fn extract_first_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
    match values.next()? {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Discarding malformed leading JSON object: {}", e);
            None
        }
    }
}

/// String field of an object. Missing, null or non-string values read as empty.
pub fn text_field(value: &Value, key: &str) -> String {
    value.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// List of strings from an array or a comma-separated string. Anything else
/// reads as empty and non-string array entries are skipped.
pub fn text_list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
