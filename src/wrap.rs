use crate::level::LogLevel;
use crate::logger::{CallOptions, Logger};
use chrono::Utc;
use serde_json::json;
use std::future::Future;

impl Logger {
    /// Time an operation and log a one-line summary of it through the
    /// normal pipeline.
    ///
    /// On success an info entry `{function_name, duration_ms}` is
    /// emitted and the result is returned unchanged. On failure an
    /// error entry additionally carrying `error` is emitted and the
    /// original error is returned unchanged; the wrapper observes the
    /// outcome, it never alters or swallows it.
    ///
    /// Durations come from the same wall clock as envelope timestamps.
    pub async fn wrap<F, Fut, T, E>(&self, name: &str, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start = Utc::now();
        let outcome = operation().await;
        let duration_ms = (Utc::now() - start).num_milliseconds();

        match &outcome {
            Ok(_) => {
                self.log(
                    LogLevel::Info,
                    json!({ "function_name": name, "duration_ms": duration_ms }),
                    CallOptions::default(),
                )
                .await;
            }
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    json!({
                        "function_name": name,
                        "duration_ms": duration_ms,
                        "error": err.to_string(),
                    }),
                    CallOptions::default(),
                )
                .await;
            }
        }

        outcome
    }
}
