//! Collects report-flagged timeline entries and hands them to the transport.

use perf::TimelineSource;

use crate::error::TelemetryResult;
use crate::event::ReportedEntry;
use crate::session::TelemetrySession;
use crate::transport::{ReportSink, TelemetryTransport, TransportConfig};

/// Configuration for the report collector.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Application version stamped on every payload
    pub app_version: String,
    /// Transport configuration
    pub transport: TransportConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            app_version: "0.0.0".to_string(),
            transport: TransportConfig::default(),
        }
    }
}

impl CollectorConfig {
    /// Create a new collector config with the specified version.
    pub fn new(app_version: &str) -> Self {
        Self {
            app_version: app_version.to_string(),
            ..Default::default()
        }
    }

    /// Set transport configuration.
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

/// Reads a timeline incrementally and forwards entries flagged for reporting.
///
/// Each entry is considered once: the collector remembers the last sequence
/// number it has seen and only reads newer entries on the next pass.
///
/// # Example
///
/// ```rust
/// use perf::{PerformanceTimeline, PerfReporter};
/// use telemetry::{CollectorConfig, MemorySink, ReportCollector};
///
/// let timeline = PerformanceTimeline::new();
/// let reporter = PerfReporter::new(&timeline);
/// reporter.mark_and_report("boot");
///
/// let mut collector = ReportCollector::new(CollectorConfig::new("1.0.0"), MemorySink::new());
/// assert_eq!(collector.collect(&timeline), 1);
/// ```
#[derive(Debug)]
pub struct ReportCollector<S> {
    session: TelemetrySession,
    transport: TelemetryTransport<S>,
    cursor: Option<u64>,
    entries_collected: u64,
    entries_skipped: u64,
    entries_removed: u64,
    entries_dropped: u64,
}

impl<S: ReportSink> ReportCollector<S> {
    /// Create a collector sending to `sink`.
    pub fn new(config: CollectorConfig, sink: S) -> Self {
        Self::with_session(TelemetrySession::new(&config.app_version), config.transport, sink)
    }

    /// Create a collector for an existing session.
    pub fn with_session(session: TelemetrySession, transport: TransportConfig, sink: S) -> Self {
        Self {
            session,
            transport: TelemetryTransport::with_config(sink, transport),
            cursor: None,
            entries_collected: 0,
            entries_skipped: 0,
            entries_removed: 0,
            entries_dropped: 0,
        }
    }

    /// Read new entries from `source` and queue those flagged for reporting.
    ///
    /// Returns the number of entries queued by this pass.
    pub fn collect(&mut self, source: &impl TimelineSource) -> usize {
        let entries = source.entries_after(self.cursor);
        let Some(last) = entries.last() else {
            return 0;
        };

        // Sequence numbers are dense, so every gap is an entry that was
        // evicted or cleared before this pass could read it.
        let mut removed = 0;
        let mut previous = self.cursor;
        for entry in &entries {
            let expected = previous.map_or(0, |p| p + 1);
            removed += entry.sequence().saturating_sub(expected);
            previous = Some(entry.sequence());
        }
        if removed > 0 {
            self.entries_removed += removed;
            tracing::warn!(
                target: "telemetry::collector",
                removed = removed,
                "timeline entries removed before collection"
            );
        }
        self.cursor = Some(last.sequence());

        let mut queued = 0;
        let mut dropped = 0;
        for entry in &entries {
            if !entry.is_reported() {
                self.entries_skipped += 1;
                continue;
            }

            if self.transport.queue(ReportedEntry::from_entry(entry)).is_ok() {
                queued += 1;
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            self.entries_dropped += dropped;
            tracing::warn!(
                target: "telemetry::collector",
                dropped = dropped,
                "report queue full, entries dropped"
            );
        }

        self.entries_collected += queued as u64;
        queued
    }

    /// Collect from `source` and flush if a full batch is waiting.
    pub async fn collect_and_flush(&mut self, source: &impl TimelineSource) -> TelemetryResult<usize> {
        self.collect(source);
        if self.transport.should_flush() {
            self.flush().await
        } else {
            Ok(0)
        }
    }

    /// Send all queued entries.
    pub async fn flush(&mut self) -> TelemetryResult<usize> {
        self.transport.flush(&self.session).await
    }

    /// Check if a full batch is waiting.
    pub fn should_flush(&self) -> bool {
        self.transport.should_flush()
    }

    /// Set offline mode.
    pub fn set_offline(&mut self, offline: bool) {
        self.transport.set_offline(offline);
    }

    /// Check if the collector is in offline mode.
    pub fn is_offline(&self) -> bool {
        self.transport.is_offline()
    }

    /// Get the current session.
    pub fn session(&self) -> &TelemetrySession {
        &self.session
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &TelemetryTransport<S> {
        &self.transport
    }

    /// Sequence number of the last entry read.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Get total number of entries queued for reporting.
    pub fn entries_collected(&self) -> u64 {
        self.entries_collected
    }

    /// Get total number of entries ignored because they were not flagged.
    pub fn entries_skipped(&self) -> u64 {
        self.entries_skipped
    }

    /// Get total number of entries removed from the timeline (evicted or
    /// cleared) before being read.
    pub fn entries_removed(&self) -> u64 {
        self.entries_removed
    }

    /// Get total number of flagged entries lost to a full queue.
    pub fn entries_dropped(&self) -> u64 {
        self.entries_dropped
    }

    /// Get number of entries waiting to be sent.
    pub fn entries_queued(&self) -> usize {
        self.transport.queued_count()
    }
}
