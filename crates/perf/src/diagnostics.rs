//! Local diagnostics for measurements that could not be recorded
//!
//! Diagnostics are for developers watching the process. They never reach
//! telemetry collectors.

use crate::error::TimingError;
use std::sync::Mutex;

/// Receives failures the reporter swallows.
pub trait DiagnosticSink {
    /// Called once for each measure that could not be recorded.
    fn measure_failed(&self, measure_name: &str, error: &TimingError);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str, &TimingError),
{
    fn measure_failed(&self, measure_name: &str, error: &TimingError) {
        self(measure_name, error)
    }
}

/// Logs failures as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn measure_failed(&self, measure_name: &str, error: &TimingError) {
        tracing::error!(
            target: "perf::report",
            measure = measure_name,
            error = %error,
            "Unable to measure {}",
            measure_name
        );
    }
}

/// A diagnostic captured by [`RecordingDiagnostics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the measure that failed
    pub measure_name: String,
    /// Human-readable failure description
    pub message: String,
}

/// Keeps failures in memory so callers can inspect them.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    records: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard recorded diagnostics.
    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn measure_failed(&self, measure_name: &str, error: &TimingError) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Diagnostic {
                measure_name: measure_name.to_string(),
                message: format!("Unable to measure {}: {}", measure_name, error),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn missing(name: &str) -> TimingError {
        TimingError::MarkNotFound {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_recording_diagnostics() {
        let sink = RecordingDiagnostics::new();
        assert!(sink.is_empty());

        sink.measure_failed("total", &missing("start"));

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].measure_name, "total");
        assert_eq!(
            records[0].message,
            "Unable to measure total: The mark 'start' does not exist"
        );

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let calls = Cell::new(0);
        let sink = |name: &str, _error: &TimingError| {
            assert_eq!(name, "load");
            calls.set(calls.get() + 1);
        };

        sink.measure_failed("load", &missing("load_start"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_tracing_diagnostics_without_subscriber() {
        // No subscriber installed; must not panic.
        TracingDiagnostics.measure_failed("total", &missing("start"));
    }
}
