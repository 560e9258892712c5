//! Timeline entry types: marks, measures and their report metadata

use serde::{Deserialize, Serialize};

/// Metadata attached to every timeline entry.
///
/// The `report` flag is read by telemetry collectors to decide which entries
/// are sent upstream. The timeline itself never inspects it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDetail {
    /// Whether the entry is eligible for upstream reporting
    pub report: bool,
}

impl EntryDetail {
    /// Detail for an entry that should be reported.
    #[inline]
    pub const fn reported() -> Self {
        Self { report: true }
    }

    /// Detail for an entry that stays local.
    #[inline]
    pub const fn local() -> Self {
        Self { report: false }
    }
}

/// Kind of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// A named instant
    Mark,
    /// A named duration between two marks
    Measure,
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryType::Mark => write!(f, "mark"),
            EntryType::Measure => write!(f, "measure"),
        }
    }
}

/// A named instant recorded on a timeline.
///
/// Marks are immutable once created. Two marks may share a name; they are
/// told apart by their sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    sequence: u64,
    name: String,
    start_time: f64,
    detail: EntryDetail,
}

impl Mark {
    pub(crate) fn new(sequence: u64, name: &str, start_time: f64, detail: EntryDetail) -> Self {
        Self {
            sequence,
            name: name.to_string(),
            start_time,
            detail,
        }
    }

    /// Position of this entry in its timeline's insertion order.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Name of the mark.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time of the mark in milliseconds since the timeline origin.
    #[inline]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Attached metadata.
    #[inline]
    pub fn detail(&self) -> EntryDetail {
        self.detail
    }
}

/// A named duration computed between two marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    sequence: u64,
    name: String,
    start_time: f64,
    duration: f64,
    detail: EntryDetail,
}

impl Measure {
    pub(crate) fn between(
        sequence: u64,
        name: &str,
        start: &Mark,
        end: &Mark,
        detail: EntryDetail,
    ) -> Self {
        Self {
            sequence,
            name: name.to_string(),
            start_time: start.start_time,
            duration: end.start_time - start.start_time,
            detail,
        }
    }

    /// Position of this entry in its timeline's insertion order.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Name of the measure.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time of the start mark in milliseconds since the timeline origin.
    #[inline]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Duration in milliseconds. Negative only if the end mark precedes the start mark.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Attached metadata.
    #[inline]
    pub fn detail(&self) -> EntryDetail {
        self.detail
    }
}

/// Any entry stored on a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entryType", rename_all = "snake_case")]
pub enum TimelineEntry {
    /// A recorded instant
    Mark(Mark),
    /// A recorded duration
    Measure(Measure),
}

impl TimelineEntry {
    /// Position of this entry in its timeline's insertion order.
    pub fn sequence(&self) -> u64 {
        match self {
            TimelineEntry::Mark(m) => m.sequence,
            TimelineEntry::Measure(m) => m.sequence,
        }
    }

    /// Name of the mark or measure.
    pub fn name(&self) -> &str {
        match self {
            TimelineEntry::Mark(m) => &m.name,
            TimelineEntry::Measure(m) => &m.name,
        }
    }

    /// Whether this is a mark or a measure.
    pub fn entry_type(&self) -> EntryType {
        match self {
            TimelineEntry::Mark(_) => EntryType::Mark,
            TimelineEntry::Measure(_) => EntryType::Measure,
        }
    }

    /// Milliseconds since the timeline origin.
    pub fn start_time(&self) -> f64 {
        match self {
            TimelineEntry::Mark(m) => m.start_time,
            TimelineEntry::Measure(m) => m.start_time,
        }
    }

    /// Duration in milliseconds; always zero for marks.
    pub fn duration(&self) -> f64 {
        match self {
            TimelineEntry::Mark(_) => 0.0,
            TimelineEntry::Measure(m) => m.duration,
        }
    }

    /// Attached metadata.
    pub fn detail(&self) -> EntryDetail {
        match self {
            TimelineEntry::Mark(m) => m.detail,
            TimelineEntry::Measure(m) => m.detail,
        }
    }

    /// Check whether collectors should send this entry upstream.
    pub fn is_reported(&self) -> bool {
        self.detail().report
    }

    /// The mark, if this entry is one.
    pub fn as_mark(&self) -> Option<&Mark> {
        match self {
            TimelineEntry::Mark(m) => Some(m),
            TimelineEntry::Measure(_) => None,
        }
    }
}

impl From<Mark> for TimelineEntry {
    fn from(mark: Mark) -> Self {
        TimelineEntry::Mark(mark)
    }
}

impl From<Measure> for TimelineEntry {
    fn from(measure: Measure) -> Self {
        TimelineEntry::Measure(measure)
    }
}
