use crate::config::LoggerConfig;
use crate::level::LogLevel;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat string-keyed label mapping attached to a log stream.
pub type LabelSet = BTreeMap<String, String>;

/// Merge all label sources into one [`LabelSet`].
///
/// Later sources win on key conflicts, in this fixed order:
///
/// 1. `level` label
/// 2. labels derived from the configured context properties
/// 3. configured default labels
/// 4. request-derived labels
/// 5. call-site labels
///
/// Call-site labels overriding request-derived values is deliberate:
/// it lets callers correct or suppress auto-extracted fields. Inputs
/// are never mutated; the result is a fresh map.
pub fn compose(
    config: &LoggerConfig,
    level: LogLevel,
    request_labels: &LabelSet,
    call_labels: Option<&LabelSet>,
) -> LabelSet {
    let mut labels = LabelSet::new();
    labels.insert("level".to_string(), level.as_str().to_string());

    for (key, value) in &config.context {
        if let Some(text) = scalar_to_label(value) {
            labels.insert(key.clone(), text);
        }
    }

    labels.extend(config.default_labels.clone());
    labels.extend(request_labels.clone());

    if let Some(call) = call_labels {
        labels.extend(call.clone());
    }

    labels
}

/// Context properties are an arbitrary JSON bag (geo/network metadata
/// and the like); only top-level scalars make useful stream labels.
fn scalar_to_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
