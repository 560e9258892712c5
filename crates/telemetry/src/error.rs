//! Error types for the report collector.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while queueing or sending reports.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to serialize a report payload
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The sink rejected a payload
    #[error("Transport error: {0}")]
    Transport(String),

    /// The sink did not finish within the configured timeout
    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    /// Queue is at capacity
    #[error("Report queue is full")]
    QueueFull,

    /// Transport is in offline mode
    #[error("Transport is offline")]
    Offline,
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::Offline;
        assert_eq!(err.to_string(), "Transport is offline");

        let err = TelemetryError::Transport("503 from collector".to_string());
        assert_eq!(err.to_string(), "Transport error: 503 from collector");

        let err = TelemetryError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Send timed out after 5s");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: TelemetryError = json_err.into();
        assert!(matches!(err, TelemetryError::Serialization(_)));
    }
}
