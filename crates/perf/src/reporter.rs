//! Mark and measure helpers that tag entries for telemetry reporting

use crate::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::entry::{EntryDetail, Mark, Measure};
use crate::timeline::{global_timeline, PerformanceTimeline, TimingService};

/// Records marks and measures flagged for upstream reporting.
///
/// Every entry produced through a reporter carries `report: true`. Failed
/// measures are turned into `None` and, unless the caller expects them,
/// passed to the diagnostic sink.
///
/// # Example
///
/// ```rust
/// use perf::{PerformanceTimeline, PerfReporter};
///
/// let reporter = PerfReporter::new(PerformanceTimeline::new());
/// reporter.mark_and_report("render_start");
/// reporter.mark_and_report("render_end");
///
/// let measure = reporter.measure_and_report("render", "render_start", "render_end", false);
/// assert!(measure.is_some());
///
/// // Missing marks are expected here, so nothing is logged.
/// assert!(reporter.measure_and_report("optional", "absent", "render_end", true).is_none());
/// ```
#[derive(Debug)]
pub struct PerfReporter<T, D = TracingDiagnostics> {
    timing: T,
    diagnostics: D,
}

impl<T: TimingService> PerfReporter<T, TracingDiagnostics> {
    /// Create a reporter that logs failures through `tracing`.
    pub fn new(timing: T) -> Self {
        Self::with_diagnostics(timing, TracingDiagnostics)
    }
}

impl<T: TimingService, D: DiagnosticSink> PerfReporter<T, D> {
    /// Create a reporter with a custom diagnostic sink.
    pub fn with_diagnostics(timing: T, diagnostics: D) -> Self {
        Self {
            timing,
            diagnostics,
        }
    }

    /// The underlying timing service.
    pub fn timing(&self) -> &T {
        &self.timing
    }

    /// The diagnostic sink failures are sent to.
    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Record a mark at the current time and flag it for reporting.
    pub fn mark_and_report(&self, name: &str) -> Mark {
        self.timing.mark(name, EntryDetail::reported())
    }

    /// Measure between two marks and flag the result for reporting.
    ///
    /// Returns `None` if either mark does not exist. Pass `can_fail = false`
    /// for the usual case, where a missing mark is a bug and is sent to the
    /// diagnostic sink. Pass `true` when the marks only exist on some code
    /// paths; the failure is then silent.
    pub fn measure_and_report(
        &self,
        measure_name: &str,
        start_mark: &str,
        end_mark: &str,
        can_fail: bool,
    ) -> Option<Measure> {
        match self
            .timing
            .measure(measure_name, start_mark, end_mark, EntryDetail::reported())
        {
            Ok(measure) => Some(measure),
            Err(e) => {
                if !can_fail {
                    self.diagnostics.measure_failed(measure_name, &e);
                }
                None
            }
        }
    }
}

fn global_reporter() -> PerfReporter<&'static PerformanceTimeline> {
    PerfReporter::new(global_timeline())
}

/// Record a reported mark on the global timeline.
pub fn mark_and_report(name: &str) -> Mark {
    global_reporter().mark_and_report(name)
}

/// Record a reported measure on the global timeline.
///
/// See [`PerfReporter::measure_and_report`] for the meaning of `can_fail`.
pub fn measure_and_report(
    measure_name: &str,
    start_mark: &str,
    end_mark: &str,
    can_fail: bool,
) -> Option<Measure> {
    global_reporter().measure_and_report(measure_name, start_mark, end_mark, can_fail)
}
