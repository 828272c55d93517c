use crate::env::{EnvResolver, LOKI_HOST_ENV, LOKI_TOKEN_ENV, LOKI_URL_ENV, LOKI_USER_ENV};
use crate::envelope::WireEnvelope;
use crate::error::ShipError;
use crate::labels::LabelSet;
use crate::level::LogLevel;
use crate::request::RequestLike;
use crate::scheduler::DeferredExecutor;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Callback invoked with the final error and the envelope that could
/// not be delivered once the retry budget is spent.
pub type FailureCallback = dyn Fn(&ShipError, &WireEnvelope) + Send + Sync;

/// Caller-supplied replacement for the canonical envelope encoder. Its
/// output is trusted verbatim; the library performs no validation.
pub type Formatter = dyn Fn(LogLevel, &Value, &LabelSet) -> WireEnvelope + Send + Sync;

/// Destination for delivery failures that survived all retries.
///
/// Selected once at configuration time: a configured `on_send_error`
/// callback becomes [`FailureSink::Callback`], otherwise errors go to
/// local diagnostic output.
#[derive(Clone)]
pub enum FailureSink {
    Callback(Arc<FailureCallback>),
    Diagnostic,
}

impl FailureSink {
    /// Hand the terminal error to the sink. Absorbs everything; nothing
    /// propagates back into the log call.
    pub(crate) fn notify(&self, err: &ShipError, envelope: &WireEnvelope) {
        match self {
            FailureSink::Callback(callback) => callback(err, envelope),
            FailureSink::Diagnostic => {
                let body =
                    serde_json::to_string(envelope).unwrap_or_else(|_| "{}".to_string());
                eprintln!("loki push failed: {}; envelope: {}", err, body);
            }
        }
    }
}

impl std::fmt::Debug for FailureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureSink::Callback(_) => f.write_str("FailureSink::Callback"),
            FailureSink::Diagnostic => f.write_str("FailureSink::Diagnostic"),
        }
    }
}

/// Caller-facing configuration surface. Every field is optional in
/// spirit; `Default` gives a logger that resolves credentials from the
/// environment, filters nothing and never retries.
///
/// **Fields**
/// - `host`, `user`, `token`: Loki endpoint credentials. When `None`
///   they are resolved from `LOKI_HOST`/`LOKI_URL`, `LOKI_USER` and
///   `LOKI_TOKEN` at construction time.
/// - `default_labels`: labels attached to every entry.
/// - `min_level`: entries below this level are dropped before any work.
/// - `retries`: additional delivery attempts after the first failure.
/// - `on_send_error`: failure callback; replaces the diagnostic output.
/// - `format`: custom envelope encoder, trusted verbatim.
/// - `silent`: suppress network delivery entirely, local echo only.
/// - `context`: arbitrary JSON bag (geo/network metadata); top-level
///   scalars become labels.
/// - `deferred`: default deferred-execution capability for dispatch.
/// - `request`: default request-like object for label extraction.
#[derive(Clone, Default)]
pub struct LoggerOptions {
    pub host: Option<String>,
    pub user: Option<String>,
    pub token: Option<String>,
    pub default_labels: LabelSet,
    pub min_level: LogLevel,
    pub retries: u32,
    pub on_send_error: Option<Arc<FailureCallback>>,
    pub format: Option<Arc<Formatter>>,
    pub silent: bool,
    pub context: BTreeMap<String, Value>,
    pub deferred: Option<Arc<dyn DeferredExecutor>>,
    pub request: Option<Arc<dyn RequestLike>>,
}

/// Immutable-after-construction logger configuration.
///
/// Built exactly once per logger via [`LoggerConfig::resolve`];
/// per-call overrides never mutate it, which is what makes concurrent
/// calls on one logger instance safe without locking.
#[derive(Clone)]
pub struct LoggerConfig {
    pub host: String,
    pub user: String,
    pub token: String,
    pub default_labels: LabelSet,
    pub min_level: LogLevel,
    pub retries: u32,
    pub failure_sink: FailureSink,
    pub format: Option<Arc<Formatter>>,
    pub silent: bool,
    pub context: BTreeMap<String, Value>,
    pub deferred: Option<Arc<dyn DeferredExecutor>>,
    pub request: Option<Arc<dyn RequestLike>>,
}

impl LoggerConfig {
    /// Resolve options against the given environment.
    ///
    /// Explicit fields always win; the environment is only consulted
    /// for credentials that were left unset. Missing credentials stay
    /// empty here and surface as a configuration error at delivery
    /// time.
    pub fn resolve(options: LoggerOptions, env: &dyn EnvResolver) -> Self {
        let host = normalize_host(
            &options
                .host
                .or_else(|| env.get(LOKI_HOST_ENV))
                .or_else(|| env.get(LOKI_URL_ENV))
                .unwrap_or_default(),
        );
        let user = options
            .user
            .or_else(|| env.get(LOKI_USER_ENV))
            .unwrap_or_default();
        let token = options
            .token
            .or_else(|| env.get(LOKI_TOKEN_ENV))
            .unwrap_or_default();

        let failure_sink = match options.on_send_error {
            Some(callback) => FailureSink::Callback(callback),
            None => FailureSink::Diagnostic,
        };

        LoggerConfig {
            host,
            user,
            token,
            default_labels: options.default_labels,
            min_level: options.min_level,
            retries: options.retries,
            failure_sink,
            format: options.format,
            silent: options.silent,
            context: options.context,
            deferred: options.deferred,
            request: options.request,
        }
    }

    /// Full push endpoint URL. The host was normalized at resolve
    /// time, so this is pure formatting.
    pub fn push_url(&self) -> String {
        format!("https://{}/loki/api/v1/push", self.host)
    }

    /// Verify that all credentials are present before any network call.
    pub(crate) fn check_credentials(&self) -> Result<(), ShipError> {
        if self.host.is_empty() {
            return Err(ShipError::MissingCredential("host"));
        }
        if self.user.is_empty() {
            return Err(ShipError::MissingCredential("user"));
        }
        if self.token.is_empty() {
            return Err(ShipError::MissingCredential("token"));
        }
        Ok(())
    }
}

/// A scheme prefix and trailing slashes on the configured host are
/// tolerated and dropped here, before the emptiness check, so a
/// degenerate value like `"https://"` still surfaces as a missing-host
/// configuration error.
fn normalize_host(raw: &str) -> String {
    raw.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

impl std::fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("default_labels", &self.default_labels)
            .field("min_level", &self.min_level)
            .field("retries", &self.retries)
            .field("failure_sink", &self.failure_sink)
            .field("silent", &self.silent)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
