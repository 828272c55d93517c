use crate::config::{LoggerConfig, LoggerOptions};
use crate::delivery::DeliveryEngine;
use crate::env::{EnvResolver, ProcessEnv};
use crate::envelope;
use crate::labels::{self, LabelSet};
use crate::level::LogLevel;
use crate::message::LogMessage;
use crate::request::{self, RequestLike};
use crate::scheduler::DeferredExecutor;
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;

/// Destination for the local echo of each accepted entry.
///
/// Stdout by default; substituted in tests and by hosts that want the
/// echo somewhere other than the console.
pub trait EchoWriter: Send + Sync {
    fn write_line(&self, line: &str);
}

struct StdoutEcho;

impl EchoWriter for StdoutEcho {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

/// Per-call overrides. All optional; `Default` means "use whatever the
/// configuration says". None of these mutate the configuration.
#[derive(Default)]
pub struct CallOptions<'a> {
    /// Call-site labels; win over every other label source.
    pub labels: Option<&'a LabelSet>,
    /// Deferred-execution capability for this call only; wins over the
    /// configured default.
    pub deferred: Option<Arc<dyn DeferredExecutor>>,
    /// Request to derive labels from; wins over the configured default.
    pub request: Option<&'a dyn RequestLike>,
}

/// Best-effort Loki push logger.
///
/// Cheap to clone (shared configuration and transport). Each log call
/// builds its own envelope and carries no cross-call state, so
/// concurrent calls on one instance need no locking.
///
/// A log call never fails: delivery errors are retried, then absorbed
/// and routed to the failure sink. The only way a call blocks is when
/// no deferred-execution capability is in play, in which case it awaits
/// delivery to completion.
#[derive(Clone)]
pub struct Logger {
    config: Arc<LoggerConfig>,
    transport: Arc<dyn Transport>,
    echo: Arc<dyn EchoWriter>,
}

impl Logger {
    /// Build a logger, resolving unset credentials from the process
    /// environment (`LOKI_HOST`/`LOKI_URL`, `LOKI_USER`, `LOKI_TOKEN`).
    pub fn new(options: LoggerOptions) -> Self {
        Self::with_env(options, &ProcessEnv)
    }

    /// Build a logger against an injected environment resolver.
    pub fn with_env(options: LoggerOptions, env: &dyn EnvResolver) -> Self {
        Self::with_transport(options, env, Arc::new(HttpTransport::new()))
    }

    /// Build a logger with a custom transport (shared HTTP client,
    /// test double).
    pub fn with_transport(
        options: LoggerOptions,
        env: &dyn EnvResolver,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let config = Arc::new(LoggerConfig::resolve(options, env));
        Self {
            config,
            transport,
            echo: Arc::new(StdoutEcho),
        }
    }

    /// Replace the stdout echo destination.
    pub fn with_echo(mut self, echo: Arc<dyn EchoWriter>) -> Self {
        self.echo = echo;
        self
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub async fn debug(&self, message: impl Into<LogMessage>) {
        self.log(LogLevel::Debug, message, CallOptions::default()).await;
    }

    pub async fn info(&self, message: impl Into<LogMessage>) {
        self.log(LogLevel::Info, message, CallOptions::default()).await;
    }

    pub async fn warn(&self, message: impl Into<LogMessage>) {
        self.log(LogLevel::Warn, message, CallOptions::default()).await;
    }

    pub async fn error(&self, message: impl Into<LogMessage>) {
        self.log(LogLevel::Error, message, CallOptions::default()).await;
    }

    /// Single shared entry point behind the per-level methods.
    ///
    /// Pipeline: level filter → normalization → local echo → label
    /// composition → envelope encoding → delivery, where delivery is
    /// either awaited here or handed to the effective deferred
    /// executor. Returns without error in every case.
    pub async fn log(
        &self,
        level: LogLevel,
        message: impl Into<LogMessage>,
        call: CallOptions<'_>,
    ) {
        if level < self.config.min_level {
            return;
        }

        let normalized = message.into().normalize();

        // Local echo fires exactly once per accepted call, silent or not.
        let line = serde_json::to_string(&normalized).unwrap_or_else(|_| "{}".to_string());
        self.echo.write_line(&line);

        if self.config.silent {
            return;
        }

        let request_labels = match call.request {
            Some(req) => request::extract(Some(req)),
            None => request::extract(self.config.request.as_deref()),
        };
        let stream_labels = labels::compose(&self.config, level, &request_labels, call.labels);
        let envelope = envelope::encode(&self.config, level, &normalized, &stream_labels);

        let engine = DeliveryEngine::new(Arc::clone(&self.config), Arc::clone(&self.transport));
        let delivery = async move { engine.deliver(envelope).await };

        let executor = call.deferred.or_else(|| self.config.deferred.clone());
        match executor {
            Some(executor) => executor.schedule_background(Box::pin(delivery)),
            None => delivery.await,
        }
    }
}
