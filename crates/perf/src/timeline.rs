//! Performance timeline: the shared buffer of marks and measures

use crate::clock::{Clock, MonotonicClock};
use crate::entry::{EntryDetail, EntryType, Mark, Measure, TimelineEntry};
use crate::error::{TimingError, TimingResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Global timeline instance
static GLOBAL_TIMELINE: OnceLock<PerformanceTimeline> = OnceLock::new();

/// Get the global timeline instance.
///
/// This is the process-wide buffer that code without an injected
/// [`TimingService`] records into.
pub fn global_timeline() -> &'static PerformanceTimeline {
    GLOBAL_TIMELINE.get_or_init(PerformanceTimeline::new)
}

/// The capability to record marks and measures.
///
/// Implemented by [`PerformanceTimeline`]; substitute another implementation
/// to redirect or fake timing entirely.
pub trait TimingService {
    /// Record an instant at the current time under `name`.
    fn mark(&self, name: &str, detail: EntryDetail) -> Mark;

    /// Record the duration between the latest marks named `start_mark` and `end_mark`.
    ///
    /// Fails with [`TimingError::MarkNotFound`] if either mark is absent; the
    /// start mark is checked first.
    fn measure(
        &self,
        name: &str,
        start_mark: &str,
        end_mark: &str,
        detail: EntryDetail,
    ) -> TimingResult<Measure>;
}

impl<T: TimingService + ?Sized> TimingService for &T {
    fn mark(&self, name: &str, detail: EntryDetail) -> Mark {
        (**self).mark(name, detail)
    }

    fn measure(
        &self,
        name: &str,
        start_mark: &str,
        end_mark: &str,
        detail: EntryDetail,
    ) -> TimingResult<Measure> {
        (**self).measure(name, start_mark, end_mark, detail)
    }
}

impl<T: TimingService + ?Sized> TimingService for Arc<T> {
    fn mark(&self, name: &str, detail: EntryDetail) -> Mark {
        (**self).mark(name, detail)
    }

    fn measure(
        &self,
        name: &str,
        start_mark: &str,
        end_mark: &str,
        detail: EntryDetail,
    ) -> TimingResult<Measure> {
        (**self).measure(name, start_mark, end_mark, detail)
    }
}

/// Read access to recorded entries, used by collectors.
pub trait TimelineSource {
    /// Entries with a sequence number greater than `sequence`, oldest first.
    ///
    /// `None` returns every entry still buffered.
    fn entries_after(&self, sequence: Option<u64>) -> Vec<TimelineEntry>;
}

impl<T: TimelineSource + ?Sized> TimelineSource for &T {
    fn entries_after(&self, sequence: Option<u64>) -> Vec<TimelineEntry> {
        (**self).entries_after(sequence)
    }
}

impl<T: TimelineSource + ?Sized> TimelineSource for Arc<T> {
    fn entries_after(&self, sequence: Option<u64>) -> Vec<TimelineEntry> {
        (**self).entries_after(sequence)
    }
}

/// Configuration for a [`PerformanceTimeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineConfig {
    /// Maximum entries retained; the oldest entry is evicted beyond this
    pub max_entries: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}

impl TimelineConfig {
    /// Set the retention limit. Zero is treated as one.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }
}

#[derive(Debug, Default)]
struct TimelineBuffer {
    entries: VecDeque<TimelineEntry>,
    next_sequence: u64,
}

impl TimelineBuffer {
    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn latest_mark(&self, name: &str) -> Option<&Mark> {
        self.entries
            .iter()
            .rev()
            .filter_map(TimelineEntry::as_mark)
            .find(|mark| mark.name() == name)
    }

    fn push(&mut self, entry: TimelineEntry, max_entries: usize) {
        while self.entries.len() >= max_entries {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::trace!(
                    target: "perf::timeline",
                    name = evicted.name(),
                    sequence = evicted.sequence(),
                    "entry evicted"
                );
            }
        }
        self.entries.push_back(entry);
    }

    fn remove(&mut self, entry_type: EntryType, name: Option<&str>) {
        self.entries.retain(|entry| {
            entry.entry_type() != entry_type || name.is_some_and(|n| entry.name() != n)
        });
    }
}

/// In-memory, append-only buffer of marks and measures.
///
/// Entries are never modified after insertion. Marks may share a name; a
/// measure always resolves the most recent mark of each name. When the
/// buffer is full the oldest entry is evicted.
///
/// # Example
///
/// ```rust
/// use perf::{EntryDetail, PerformanceTimeline, TimingService};
///
/// let timeline = PerformanceTimeline::new();
/// timeline.mark("load_start", EntryDetail::reported());
/// timeline.mark("load_end", EntryDetail::reported());
///
/// let measure = timeline
///     .measure("load", "load_start", "load_end", EntryDetail::reported())
///     .unwrap();
/// assert!(measure.duration() >= 0.0);
/// ```
#[derive(Debug)]
pub struct PerformanceTimeline<C: Clock = MonotonicClock> {
    clock: C,
    config: TimelineConfig,
    buffer: Mutex<TimelineBuffer>,
}

impl PerformanceTimeline<MonotonicClock> {
    /// Create a timeline with a monotonic clock starting now.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }

    /// Create a timeline with a monotonic clock and custom configuration.
    pub fn with_config(config: TimelineConfig) -> Self {
        Self::with_clock_and_config(MonotonicClock::new(), config)
    }
}

impl Default for PerformanceTimeline<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PerformanceTimeline<C> {
    /// Create a timeline driven by the given clock.
    pub fn with_clock(clock: C) -> Self {
        Self::with_clock_and_config(clock, TimelineConfig::default())
    }

    /// Create a timeline with both a custom clock and configuration.
    pub fn with_clock_and_config(clock: C, config: TimelineConfig) -> Self {
        let config = TimelineConfig {
            max_entries: config.max_entries.max(1),
        };
        Self {
            clock,
            config,
            buffer: Mutex::new(TimelineBuffer::default()),
        }
    }

    /// The clock timestamps are read from.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The active configuration.
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    fn buffer(&self) -> MutexGuard<'_, TimelineBuffer> {
        // Entries are only ever appended or removed whole, so a poisoned
        // buffer is still consistent.
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All buffered entries, oldest first.
    pub fn entries(&self) -> Vec<TimelineEntry> {
        self.buffer().entries.iter().cloned().collect()
    }

    /// Entries with the given name, optionally restricted to one type.
    pub fn entries_by_name(&self, name: &str, entry_type: Option<EntryType>) -> Vec<TimelineEntry> {
        self.buffer()
            .entries
            .iter()
            .filter(|e| e.name() == name)
            .filter(|e| entry_type.map_or(true, |t| e.entry_type() == t))
            .cloned()
            .collect()
    }

    /// Entries of the given type.
    pub fn entries_by_type(&self, entry_type: EntryType) -> Vec<TimelineEntry> {
        self.buffer()
            .entries
            .iter()
            .filter(|e| e.entry_type() == entry_type)
            .cloned()
            .collect()
    }

    /// Number of buffered entries.
    pub fn len(&self) -> usize {
        self.buffer().entries.len()
    }

    /// Check if the timeline holds no entries.
    pub fn is_empty(&self) -> bool {
        self.buffer().entries.is_empty()
    }

    /// Remove marks with the given name, or all marks when `name` is `None`.
    pub fn clear_marks(&self, name: Option<&str>) {
        self.buffer().remove(EntryType::Mark, name);
    }

    /// Remove measures with the given name, or all measures when `name` is `None`.
    pub fn clear_measures(&self, name: Option<&str>) {
        self.buffer().remove(EntryType::Measure, name);
    }
}

impl<C: Clock> TimingService for PerformanceTimeline<C> {
    fn mark(&self, name: &str, detail: EntryDetail) -> Mark {
        let mut buffer = self.buffer();
        let sequence = buffer.next_sequence();
        let mark = Mark::new(sequence, name, self.clock.now_ms(), detail);

        tracing::trace!(
            target: "perf::timeline",
            name = name,
            start_time = mark.start_time(),
            report = detail.report,
            "mark recorded"
        );

        buffer.push(mark.clone().into(), self.config.max_entries);
        mark
    }

    fn measure(
        &self,
        name: &str,
        start_mark: &str,
        end_mark: &str,
        detail: EntryDetail,
    ) -> TimingResult<Measure> {
        let mut buffer = self.buffer();

        let start = buffer
            .latest_mark(start_mark)
            .cloned()
            .ok_or_else(|| TimingError::MarkNotFound {
                name: start_mark.to_string(),
            })?;
        let end = buffer
            .latest_mark(end_mark)
            .cloned()
            .ok_or_else(|| TimingError::MarkNotFound {
                name: end_mark.to_string(),
            })?;

        let sequence = buffer.next_sequence();
        let measure = Measure::between(sequence, name, &start, &end, detail);

        tracing::trace!(
            target: "perf::timeline",
            name = name,
            duration_ms = measure.duration(),
            report = detail.report,
            "measure recorded"
        );

        buffer.push(measure.clone().into(), self.config.max_entries);
        Ok(measure)
    }
}

impl<C: Clock> TimelineSource for PerformanceTimeline<C> {
    fn entries_after(&self, sequence: Option<u64>) -> Vec<TimelineEntry> {
        self.buffer()
            .entries
            .iter()
            .filter(|e| sequence.map_or(true, |s| e.sequence() > s))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use proptest::prelude::*;

    fn manual_timeline() -> PerformanceTimeline<ManualClock> {
        PerformanceTimeline::with_clock(ManualClock::new())
    }

    #[test]
    fn test_mark_uses_clock_time() {
        let timeline = manual_timeline();
        timeline.clock().advance(42.0);

        let mark = timeline.mark("ready", EntryDetail::reported());
        assert_eq!(mark.name(), "ready");
        assert_eq!(mark.start_time(), 42.0);
        assert!(mark.detail().report);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_measure_between_marks() {
        let timeline = manual_timeline();
        timeline.clock().set(5.0);
        timeline.mark("start", EntryDetail::reported());
        timeline.clock().advance(20.0);
        timeline.mark("end", EntryDetail::reported());

        let measure = timeline
            .measure("total", "start", "end", EntryDetail::reported())
            .unwrap();
        assert_eq!(measure.start_time(), 5.0);
        assert_eq!(measure.duration(), 20.0);
        assert_eq!(timeline.entries_by_type(EntryType::Measure).len(), 1);
    }

    #[test]
    fn test_measure_missing_start_mark() {
        let timeline = manual_timeline();
        timeline.mark("end", EntryDetail::reported());

        let err = timeline
            .measure("total", "start", "end", EntryDetail::reported())
            .unwrap_err();
        assert_eq!(
            err,
            TimingError::MarkNotFound {
                name: "start".to_string()
            }
        );
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_measure_missing_end_mark() {
        let timeline = manual_timeline();
        timeline.mark("start", EntryDetail::reported());

        let err = timeline
            .measure("total", "start", "end", EntryDetail::reported())
            .unwrap_err();
        assert_eq!(
            err,
            TimingError::MarkNotFound {
                name: "end".to_string()
            }
        );
    }

    #[test]
    fn test_measure_reports_start_before_end() {
        let timeline = manual_timeline();
        let err = timeline
            .measure("total", "nope1", "nope2", EntryDetail::reported())
            .unwrap_err();
        assert_eq!(
            err,
            TimingError::MarkNotFound {
                name: "nope1".to_string()
            }
        );
    }

    #[test]
    fn test_measure_uses_latest_mark() {
        let timeline = manual_timeline();
        timeline.mark("frame", EntryDetail::reported());
        timeline.clock().advance(10.0);
        timeline.mark("frame", EntryDetail::reported());
        timeline.clock().advance(4.0);
        timeline.mark("paint", EntryDetail::reported());

        let measure = timeline
            .measure("frame_to_paint", "frame", "paint", EntryDetail::reported())
            .unwrap();
        assert_eq!(measure.start_time(), 10.0);
        assert_eq!(measure.duration(), 4.0);
    }

    #[test]
    fn test_duplicate_marks_are_kept() {
        let timeline = manual_timeline();
        let first = timeline.mark("x", EntryDetail::reported());
        let second = timeline.mark("x", EntryDetail::reported());

        assert_ne!(first.sequence(), second.sequence());
        assert_eq!(timeline.entries_by_name("x", Some(EntryType::Mark)).len(), 2);
    }

    #[test]
    fn test_eviction_keeps_newest() {
        let timeline = PerformanceTimeline::with_clock_and_config(
            ManualClock::new(),
            TimelineConfig::default().with_max_entries(3),
        );
        for name in ["a", "b", "c", "d", "e"] {
            timeline.mark(name, EntryDetail::reported());
        }

        let names: Vec<String> = timeline
            .entries()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "d", "e"]);
    }

    #[test]
    fn test_evicted_mark_cannot_be_measured() {
        let timeline = PerformanceTimeline::with_clock_and_config(
            ManualClock::new(),
            TimelineConfig::default().with_max_entries(2),
        );
        timeline.mark("start", EntryDetail::reported());
        timeline.mark("middle", EntryDetail::reported());
        timeline.mark("end", EntryDetail::reported());

        assert!(timeline
            .measure("total", "start", "end", EntryDetail::reported())
            .is_err());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let timeline = PerformanceTimeline::with_clock_and_config(
            ManualClock::new(),
            TimelineConfig { max_entries: 0 },
        );
        assert_eq!(timeline.config().max_entries, 1);

        timeline.mark("only", EntryDetail::reported());
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_clear_marks_by_name() {
        let timeline = manual_timeline();
        timeline.mark("a", EntryDetail::reported());
        timeline.mark("b", EntryDetail::reported());
        timeline.measure("ab", "a", "b", EntryDetail::reported()).unwrap();

        timeline.clear_marks(Some("a"));
        assert!(timeline.entries_by_name("a", None).is_empty());
        assert_eq!(timeline.len(), 2);

        timeline.clear_marks(None);
        assert!(timeline.entries_by_type(EntryType::Mark).is_empty());
        assert_eq!(timeline.entries_by_type(EntryType::Measure).len(), 1);
    }

    #[test]
    fn test_clear_measures() {
        let timeline = manual_timeline();
        timeline.mark("a", EntryDetail::reported());
        timeline.measure("m1", "a", "a", EntryDetail::reported()).unwrap();
        timeline.measure("m2", "a", "a", EntryDetail::reported()).unwrap();

        timeline.clear_measures(Some("m1"));
        assert_eq!(timeline.entries_by_type(EntryType::Measure).len(), 1);

        timeline.clear_measures(None);
        assert!(timeline.entries_by_type(EntryType::Measure).is_empty());
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_entries_after_cursor() {
        let timeline = manual_timeline();
        let first = timeline.mark("a", EntryDetail::reported());
        timeline.mark("b", EntryDetail::local());
        timeline.mark("c", EntryDetail::reported());

        assert_eq!(timeline.entries_after(None).len(), 3);

        let rest = timeline.entries_after(Some(first.sequence()));
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].name(), "b");
    }

    #[test]
    fn test_shared_through_arc() {
        let timeline = Arc::new(manual_timeline());
        let service: Arc<PerformanceTimeline<ManualClock>> = Arc::clone(&timeline);

        service.mark("shared", EntryDetail::reported());
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_global_timeline_is_singleton() {
        assert!(std::ptr::eq(global_timeline(), global_timeline()));
    }

    proptest! {
        #[test]
        fn prop_sequences_strictly_increase(names in prop::collection::vec("[a-z]{1,8}", 1..40)) {
            let timeline = manual_timeline();
            for name in &names {
                timeline.mark(name, EntryDetail::reported());
            }

            let entries = timeline.entries();
            prop_assert_eq!(entries.len(), names.len());
            for pair in entries.windows(2) {
                prop_assert!(pair[0].sequence() < pair[1].sequence());
            }
        }

        #[test]
        fn prop_measure_duration_matches_clock(gap in 0.0f64..10_000.0) {
            let timeline = manual_timeline();
            timeline.mark("start", EntryDetail::reported());
            timeline.clock().advance(gap);
            timeline.mark("end", EntryDetail::reported());

            let measure = timeline.measure("m", "start", "end", EntryDetail::reported()).unwrap();
            prop_assert!(measure.duration() >= 0.0);
            prop_assert!((measure.duration() - gap).abs() < 1e-9);
        }
    }
}
