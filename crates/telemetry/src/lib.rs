//! Performance Report Collection
//!
//! This crate forwards performance timeline entries to an upload sink. It
//! supports:
//!
//! - Incremental collection of entries flagged for reporting
//! - Batched transport with offline mode and send timeouts
//! - Per-process reporting sessions
//!
//! Entries that are not flagged (`detail.report == false`) never leave the
//! process.
//!
//! # Example
//!
//! ```rust
//! use perf::{PerformanceTimeline, PerfReporter};
//! use telemetry::{CollectorConfig, MemorySink, ReportCollector};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let timeline = PerformanceTimeline::new();
//! let reporter = PerfReporter::new(&timeline);
//! reporter.mark_and_report("request_start");
//! reporter.mark_and_report("request_end");
//! reporter.measure_and_report("request", "request_start", "request_end", false);
//!
//! let sink = MemorySink::new();
//! let mut collector = ReportCollector::new(CollectorConfig::new("1.0.0"), sink.clone());
//! collector.collect(&timeline);
//! collector.flush().await.unwrap();
//!
//! assert_eq!(sink.entry_count(), 3);
//! # });
//! ```
//!
//! # Modules
//!
//! - [`collector`] - Incremental timeline reader
//! - [`event`] - Upload records and payloads
//! - [`transport`] - Batching, sinks and flushing
//! - [`session`] - Session identity
//! - [`error`] - Error types

pub mod collector;
pub mod error;
pub mod event;
pub mod session;
pub mod transport;

pub use collector::{CollectorConfig, ReportCollector};
pub use error::{TelemetryError, TelemetryResult};
pub use event::{ReportPayload, ReportedEntry};
pub use session::{get_platform, TelemetrySession};
pub use transport::{MemorySink, NullSink, ReportSink, TelemetryTransport, TransportConfig};
