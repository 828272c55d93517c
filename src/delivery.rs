use crate::config::LoggerConfig;
use crate::envelope::WireEnvelope;
use crate::error::ShipError;
use crate::transport::Transport;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Performs the push with bounded retry and routes terminal failures to
/// the configured failure sink.
///
/// One engine instance handles exactly one envelope; it owns clones of
/// the shared configuration and transport so the whole delivery can be
/// moved onto a deferred executor.
pub struct DeliveryEngine {
    config: Arc<LoggerConfig>,
    transport: Arc<dyn Transport>,
}

impl DeliveryEngine {
    pub fn new(config: Arc<LoggerConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Deliver the envelope, absorbing every failure.
    ///
    /// Attempts run strictly sequentially: one initial try plus
    /// `retries` more, with exponential backoff (100ms base, doubled
    /// each time, uncapped and without jitter) between attempts. The
    /// body is serialized once up front; retries resend it verbatim.
    ///
    /// Missing credentials fail each attempt before any network call,
    /// through the same retry path as transport errors. After the
    /// budget is spent the last error and the envelope go to the
    /// failure sink; nothing ever propagates to the caller.
    pub async fn deliver(&self, envelope: WireEnvelope) {
        let body = serde_json::to_string(&envelope).unwrap_or_else(|_| "{}".to_string());

        let mut backoff = Duration::from_millis(100);
        let mut attempts_left = self.config.retries;

        let outcome = loop {
            match self.attempt(&body).await {
                Ok(()) => break Ok(()),
                Err(_) if attempts_left > 0 => {
                    attempts_left -= 1;
                    sleep(backoff).await;
                    backoff *= 2;
                }
                Err(err) => break Err(err),
            }
        };

        if let Err(err) = outcome {
            self.config.failure_sink.notify(&err, &envelope);
        }
    }

    async fn attempt(&self, body: &str) -> Result<(), ShipError> {
        self.config.check_credentials()?;
        self.transport
            .push(
                &self.config.push_url(),
                &self.config.user,
                &self.config.token,
                body.to_string(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggerConfig, LoggerOptions};
    use crate::envelope::LogStream;
    use crate::labels::LabelSet;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct ScriptedTransport {
        /// Outcomes per attempt; once exhausted, further attempts succeed.
        outcomes: Mutex<Vec<Result<(), ShipError>>>,
        calls: AtomicU32,
        seen_bodies: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<Result<(), ShipError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                calls: AtomicU32::new(0),
                seen_bodies: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn push(
            &self,
            _url: &str,
            _user: &str,
            _token: &str,
            body: String,
        ) -> Result<(), ShipError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_bodies.lock().unwrap().push(body);
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                Ok(())
            } else {
                outcomes.remove(0)
            }
        }
    }

    fn config_with(options: LoggerOptions) -> Arc<LoggerConfig> {
        Arc::new(LoggerConfig::resolve(
            options,
            &BTreeMap::<String, String>::new(),
        ))
    }

    fn creds(retries: u32) -> LoggerOptions {
        LoggerOptions {
            host: Some("h".to_string()),
            user: Some("u".to_string()),
            token: Some("t".to_string()),
            retries,
            ..LoggerOptions::default()
        }
    }

    fn envelope() -> WireEnvelope {
        WireEnvelope {
            streams: vec![LogStream {
                stream: LabelSet::from([("level".to_string(), "info".to_string())]),
                values: vec![["1".to_string(), "{}".to_string()]],
            }],
        }
    }

    fn failing(n: usize) -> Vec<Result<(), ShipError>> {
        (0..n)
            .map(|_| Err(ShipError::Transport("boom".to_string())))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn all_attempts_failing_makes_n_plus_one_calls_and_one_hook_call() {
        let hook_calls = Arc::new(AtomicU32::new(0));
        let hook_calls_cb = Arc::clone(&hook_calls);

        let mut options = creds(2);
        options.on_send_error = Some(Arc::new(move |_err, _envelope| {
            hook_calls_cb.fetch_add(1, Ordering::SeqCst);
        }));

        let transport = Arc::new(ScriptedTransport::new(failing(3)));
        let engine = DeliveryEngine::new(config_with(options), Arc::clone(&transport) as _);
        engine.deliver(envelope()).await;

        assert_eq!(transport.calls(), 3);
        assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_attempt_k_stops_retrying_and_skips_the_hook() {
        let hook_calls = Arc::new(AtomicU32::new(0));
        let hook_calls_cb = Arc::clone(&hook_calls);

        let mut options = creds(5);
        options.on_send_error = Some(Arc::new(move |_err, _envelope| {
            hook_calls_cb.fetch_add(1, Ordering::SeqCst);
        }));

        let transport = Arc::new(ScriptedTransport::new(failing(2)));
        let engine = DeliveryEngine::new(config_with(options), Arc::clone(&transport) as _);
        engine.deliver(envelope()).await;

        assert_eq!(transport.calls(), 3);
        assert_eq!(hook_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_from_100ms_between_attempts() {
        let transport = Arc::new(ScriptedTransport::new(failing(3)));
        let engine = DeliveryEngine::new(config_with(creds(2)), Arc::clone(&transport) as _);

        let start = Instant::now();
        engine.deliver(envelope()).await;

        // 100ms before attempt 2, 200ms before attempt 3
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn zero_retries_means_a_single_attempt() {
        let transport = Arc::new(ScriptedTransport::new(failing(1)));
        let engine = DeliveryEngine::new(config_with(creds(0)), Arc::clone(&transport) as _);
        engine.deliver(envelope()).await;

        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_resend_the_identical_body() {
        let transport = Arc::new(ScriptedTransport::new(failing(2)));
        let engine = DeliveryEngine::new(config_with(creds(2)), Arc::clone(&transport) as _);
        engine.deliver(envelope()).await;

        let bodies = transport.seen_bodies.lock().unwrap();
        assert_eq!(bodies.len(), 3);
        assert!(bodies.iter().all(|b| b == &bodies[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_credentials_fail_before_any_network_call() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);

        let mut options = LoggerOptions::default();
        options.retries = 1;
        options.on_send_error = Some(Arc::new(move |err, _envelope| {
            seen_cb.lock().unwrap().push(err.to_string());
        }));

        let transport = Arc::new(ScriptedTransport::new(Vec::new()));
        let engine = DeliveryEngine::new(config_with(options), Arc::clone(&transport) as _);
        engine.deliver(envelope()).await;

        assert_eq!(transport.calls(), 0);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("missing Loki credential"));
    }

    #[tokio::test]
    async fn hook_receives_the_undelivered_envelope() {
        let captured = Arc::new(Mutex::new(None));
        let captured_cb = Arc::clone(&captured);

        let mut options = creds(0);
        options.on_send_error = Some(Arc::new(move |_err, envelope| {
            *captured_cb.lock().unwrap() = Some(envelope.clone());
        }));

        let transport = Arc::new(ScriptedTransport::new(failing(1)));
        let engine = DeliveryEngine::new(config_with(options), Arc::clone(&transport) as _);
        let sent = envelope();
        engine.deliver(sent.clone()).await;

        assert_eq!(captured.lock().unwrap().as_ref(), Some(&sent));
    }
}
