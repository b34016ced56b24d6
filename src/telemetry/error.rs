use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a 3-entry summary, found {0} entries")]
    NotSummary(usize),
    #[error("no telemetry entries")]
    Empty,
}
