use serde_json::{json, Value};

/// Log payload as accepted at the call site: either plain text or an
/// already-structured JSON object.
#[derive(Debug, Clone)]
pub enum LogMessage {
    Text(String),
    Structured(Value),
}

impl LogMessage {
    /// Coerce the payload into its canonical object shape.
    ///
    /// Plain text becomes `{"message": <text>}`; structured payloads
    /// pass through unchanged (no deep clone, the pipeline never
    /// mutates them).
    pub fn normalize(self) -> Value {
        match self {
            LogMessage::Text(s) => json!({ "message": s }),
            LogMessage::Structured(v) => v,
        }
    }
}

impl From<&str> for LogMessage {
    fn from(s: &str) -> Self {
        LogMessage::Text(s.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(s: String) -> Self {
        LogMessage::Text(s)
    }
}

impl From<Value> for LogMessage {
    fn from(v: Value) -> Self {
        LogMessage::Structured(v)
    }
}
