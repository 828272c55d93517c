//! Environment variable names used by this crate for convenient
//! configuration from edge runtimes and microservices.
//!
//! Ambient process state is only ever read through the [`EnvResolver`]
//! seam, so the core pipeline stays testable without environment
//! mutation.

/// Loki host, e.g. `logs-prod-eu-west-0.grafana.net`.
pub const LOKI_HOST_ENV: &str = "LOKI_HOST";

/// Alternative name for the Loki host, checked when `LOKI_HOST` is unset.
pub const LOKI_URL_ENV: &str = "LOKI_URL";

/// Basic-auth user (Grafana Cloud instance id).
pub const LOKI_USER_ENV: &str = "LOKI_USER";

/// Basic-auth token (Grafana Cloud API key).
pub const LOKI_TOKEN_ENV: &str = "LOKI_TOKEN";

/// Source of named configuration variables.
///
/// Implemented by [`ProcessEnv`] for real deployments and by in-memory
/// maps in tests.
pub trait EnvResolver {
    /// Look up a variable, `None` when unset or unreadable.
    fn get(&self, key: &str) -> Option<String>;
}

/// Resolver backed by the real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvResolver for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvResolver for std::collections::BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        std::collections::BTreeMap::get(self, key).cloned()
    }
}
