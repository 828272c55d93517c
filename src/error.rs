/// Failures detected while shipping a log entry.
///
/// None of these ever propagate out of a log call; the delivery engine
/// absorbs them after the retry budget is spent and routes them to the
/// configured failure sink.
#[derive(thiserror::Error, Debug)]
pub enum ShipError {
    /// Host, user or token resolved to empty at delivery time.
    #[error("missing Loki credential: {0}")]
    MissingCredential(&'static str),

    /// The HTTP request itself failed (DNS, TLS, connection reset, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// Loki answered with a non-success status; the status text is kept
    /// as the error detail.
    #[error("push rejected with status {0}")]
    Status(String),
}

impl From<reqwest::Error> for ShipError {
    fn from(err: reqwest::Error) -> Self {
        ShipError::Transport(err.to_string())
    }
}
