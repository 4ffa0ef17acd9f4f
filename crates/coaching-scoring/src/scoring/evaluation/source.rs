use serde_json::Value;
use tracing::debug;

use super::super::domain::{ScoringConfig, UserProfile, ValueSource};

/// Resolve the raw values an item is scored on, in the order they were provided.
pub(crate) fn candidate_values(
    config: &ScoringConfig,
    submitted: &[String],
    profile: Option<&UserProfile>,
) -> Vec<String> {
    match config.value_source() {
        ValueSource::Submitted => submitted
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect(),
        ValueSource::UserField => {
            let mut values = Vec::new();
            if let Some(field) = profile_field(config, profile) {
                flatten(field, &mut values);
            }
            values
        }
        ValueSource::JsonField => {
            let mut values = Vec::new();
            let Some(field) = profile_field(config, profile) else {
                return values;
            };

            let document = match field {
                Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
                    Ok(document) => document,
                    Err(err) => {
                        debug!(item_id = %config.item_id, error = %err, "profile JSON field does not parse");
                        return values;
                    }
                },
                other => other.clone(),
            };

            let pattern = config.extract_pattern.as_deref().unwrap_or_default();
            for node in extract(&document, pattern) {
                flatten(node, &mut values);
            }
            values
        }
    }
}

fn profile_field<'p>(config: &ScoringConfig, profile: Option<&'p UserProfile>) -> Option<&'p Value> {
    let key = config.source_field.as_deref()?.trim();
    profile?.field(key)
}

/// Walk a dot path such as `$.certs[0].name`; a named segment over an array fans out.
pub(crate) fn extract<'v>(root: &'v Value, pattern: &str) -> Vec<&'v Value> {
    let path = pattern
        .trim()
        .trim_start_matches('$')
        .replace('[', ".")
        .replace(']', "");

    let mut current = vec![root];
    for segment in path.split('.').filter(|segment| !segment.is_empty()) {
        let mut next = Vec::new();
        for node in current {
            match node {
                Value::Object(map) => next.extend(map.get(segment)),
                Value::Array(items) => match segment.parse::<usize>() {
                    Ok(index) => next.extend(items.get(index)),
                    Err(_) => next.extend(items.iter().filter_map(|item| item.get(segment))),
                },
                _ => {}
            }
        }
        current = next;
    }
    current
}

fn flatten(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null | Value::Object(_) => {}
        Value::Bool(flag) => out.push(flag.to_string()),
        Value::Number(number) => out.push(number.to_string()),
        Value::String(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten(item, out);
            }
        }
    }
}
