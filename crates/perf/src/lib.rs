//! Performance Marks and Measures
//!
//! This crate records named instants ("marks") and named durations between
//! two marks ("measures") on a performance timeline, tagging them for
//! telemetry reporting:
//! - An injectable [`TimingService`] with an in-memory [`PerformanceTimeline`]
//! - Swappable clocks for real and deterministic timing
//! - [`PerfReporter`], which flags every entry for reporting and turns missing
//!   marks into `None` plus an optional local diagnostic
//!
//! Entries are collected and sent upstream by a separate collector reading
//! the timeline through [`TimelineSource`].
//!
//! # Example
//!
//! ```rust
//! use perf::{mark_and_report, measure_and_report};
//!
//! mark_and_report("startup_begin");
//! // ... startup work ...
//! mark_and_report("startup_end");
//!
//! let measure = measure_and_report("startup", "startup_begin", "startup_end", false);
//! assert!(measure.is_some());
//! ```

mod clock;
mod diagnostics;
mod entry;
mod error;
mod reporter;
mod timeline;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use diagnostics::{Diagnostic, DiagnosticSink, RecordingDiagnostics, TracingDiagnostics};
pub use entry::{EntryDetail, EntryType, Mark, Measure, TimelineEntry};
pub use error::{TimingError, TimingResult};
pub use reporter::{mark_and_report, measure_and_report, PerfReporter};
pub use timeline::{global_timeline, PerformanceTimeline, TimelineConfig, TimelineSource, TimingService};
