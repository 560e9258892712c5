//! Error types for timeline operations.

use thiserror::Error;

/// Errors raised by a [`TimingService`](crate::TimingService).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    /// A measure referenced a mark that is not on the timeline
    #[error("The mark '{name}' does not exist")]
    MarkNotFound {
        /// Name of the missing mark
        name: String,
    },
}

/// Result type for timeline operations.
pub type TimingResult<T> = Result<T, TimingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TimingError::MarkNotFound {
            name: "app_start".to_string(),
        };
        assert_eq!(err.to_string(), "The mark 'app_start' does not exist");
    }
}
