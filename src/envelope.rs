use crate::config::LoggerConfig;
use crate::labels::LabelSet;
use crate::level::LogLevel;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Loki push payload: one stream with one timestamped value.
///
/// Exactly one [`WireEnvelope`] exists per accepted log entry; retries
/// resend it byte-for-byte and never re-encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEnvelope {
    pub streams: Vec<LogStream>,
}

/// A single stream entry inside the push payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStream {
    /// Final composed label set, all string-valued.
    pub stream: LabelSet,
    /// `[unix_epoch_nanoseconds_as_string, json_encoded_message]` pairs;
    /// always exactly one for envelopes built by this crate.
    pub values: Vec<[String; 2]>,
}

/// Build the push envelope for one entry.
///
/// When a custom formatter is configured, delegate to it entirely and
/// trust its output verbatim. Otherwise produce the canonical
/// single-stream, single-value shape. The timestamp is captured here,
/// once, so retries carry the original emission instant.
pub fn encode(
    config: &LoggerConfig,
    level: LogLevel,
    message: &Value,
    labels: &LabelSet,
) -> WireEnvelope {
    if let Some(format) = &config.format {
        return format(level, message, labels);
    }

    let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let line = serde_json::to_string(message).unwrap_or_else(|_| "{}".to_string());

    WireEnvelope {
        streams: vec![LogStream {
            stream: labels.clone(),
            values: vec![[timestamp.to_string(), line]],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerOptions;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn resolve(options: LoggerOptions) -> LoggerConfig {
        LoggerConfig::resolve(options, &BTreeMap::<String, String>::new())
    }

    #[test]
    fn canonical_envelope_serializes_to_the_wire_shape() {
        let config = resolve(LoggerOptions::default());
        let labels = LabelSet::from([("level".to_string(), "info".to_string())]);
        let envelope = encode(&config, LogLevel::Info, &json!({ "test": "message" }), &labels);

        assert_eq!(envelope.streams.len(), 1);
        let stream = &envelope.streams[0];
        assert_eq!(stream.stream, labels);
        assert_eq!(stream.values.len(), 1);
        assert_eq!(stream.values[0][1], r#"{"test":"message"}"#);
        // nanosecond epoch of some instant after 2020
        let timestamp: i64 = stream.values[0][0].parse().unwrap();
        assert!(timestamp > 1_577_836_800 * 1_000_000_000);

        let body = serde_json::to_string(&envelope).unwrap();
        assert!(body.starts_with(r#"{"streams":[{"stream":{"level":"info"},"values":[["#));
    }

    #[test]
    fn custom_formatter_is_trusted_verbatim() {
        let options = LoggerOptions {
            format: Some(Arc::new(|level, message, _labels| WireEnvelope {
                streams: vec![LogStream {
                    stream: LabelSet::from([("custom".to_string(), level.to_string())]),
                    values: vec![["0".to_string(), message.to_string()]],
                }],
            })),
            ..LoggerOptions::default()
        };
        let config = resolve(options);

        let envelope = encode(&config, LogLevel::Warn, &json!({"x": 1}), &LabelSet::new());

        assert_eq!(
            envelope.streams[0].stream.get("custom"),
            Some(&"warn".to_string())
        );
        assert_eq!(envelope.streams[0].values[0][0], "0");
    }
}
