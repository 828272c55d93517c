use crate::error::ShipError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Black-box HTTP push capability used by the delivery engine.
///
/// The engine only cares about success or failure; everything about
/// connections, TLS and timeouts belongs to the implementation. Tests
/// substitute counting fakes for this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` with Basic auth.
    ///
    /// **Returns**
    /// - `Ok(())` when the endpoint answered with a success status.
    /// - `Err(ShipError::Transport(..))` when the request itself failed.
    /// - `Err(ShipError::Status(..))` on a non-success status, carrying
    ///   the status text as detail.
    async fn push(&self, url: &str, user: &str, token: &str, body: String)
        -> Result<(), ShipError>;
}

/// Production [`Transport`] over a shared `reqwest` client.
///
/// No internal timeout is applied; delivery is bounded only by what the
/// client itself enforces. Pass a pre-configured client through
/// [`HttpTransport::with_client`] to change that.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Reuse an existing client (connection pool, custom timeouts).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn push(
        &self,
        url: &str,
        user: &str,
        token: &str,
        body: String,
    ) -> Result<(), ShipError> {
        let resp = self
            .client
            .post(url)
            .basic_auth(user, Some(token))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ShipError::Status(resp.status().to_string()))
        }
    }
}
