use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use loki_shipper::config::LoggerOptions;
use loki_shipper::labels::LabelSet;
use loki_shipper::logger::Logger;
use loki_shipper::scheduler::TokioSpawner;

#[tokio::main]
async fn main() {
    // Credentials fall back to LOKI_HOST / LOKI_USER / LOKI_TOKEN when
    // not set explicitly.
    let options = LoggerOptions {
        default_labels: LabelSet::from([
            ("app".to_string(), "edge-demo".to_string()),
            ("env".to_string(), "dev".to_string()),
        ]),
        retries: 2,
        context: BTreeMap::from([("colo".to_string(), json!("AMS"))]),
        // Fire-and-forget delivery; a real edge runtime would plug its
        // own keep-alive capability in here.
        deferred: Some(Arc::new(TokioSpawner)),
        ..LoggerOptions::default()
    };
    let logger = Logger::new(options);

    logger.info("handler started").await;

    let checkout: Result<u64, String> = logger
        .wrap("checkout", || async {
            sleep(Duration::from_millis(25)).await;
            Ok(1234)
        })
        .await;
    logger.info(json!({ "order_id": checkout.unwrap() })).await;

    // Give the spawned deliveries a moment to drain before exiting.
    sleep(Duration::from_secs(1)).await;
}
