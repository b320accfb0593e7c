// Client trait for the remote telemetry endpoint
use crate::domain::reading::Reading;
use async_trait::async_trait;
use thiserror::Error;

/// Fetch failure taxonomy. Both variants are handled identically by the
/// coordinator: no retry within the cycle, prior data is preserved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Endpoint unreachable, timed out, or answered with an error status.
    #[error("telemetry endpoint unreachable: {0}")]
    Network(String),
    /// Response body was malformed or missing the expected readings array.
    /// A body without `readings` is a failure, never an empty-but-valid series.
    #[error("malformed telemetry response: {0}")]
    Protocol(String),
}

#[async_trait]
pub trait TelemetryClient: Send + Sync {
    /// Retrieve all readings for one region over the last `window_hours`.
    async fn fetch(&self, region_id: &str, window_hours: u32) -> Result<Vec<Reading>, FetchError>;
}
