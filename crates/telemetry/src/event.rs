//! Upload records built from timeline entries.

use chrono::{DateTime, Utc};
use perf::{EntryType, TimelineEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::TelemetrySession;

/// A single timeline entry prepared for upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedEntry {
    /// Unique identifier for this record
    pub event_id: String,
    /// Mark or measure name
    pub name: String,
    /// Whether this was a mark or a measure
    pub entry_type: EntryType,
    /// Milliseconds since the timeline origin
    pub start_time_ms: f64,
    /// Milliseconds between the two marks; zero for marks
    pub duration_ms: f64,
    /// Wall-clock time the entry was collected
    pub collected_at: DateTime<Utc>,
}

impl ReportedEntry {
    /// Build a record from a timeline entry.
    pub fn from_entry(entry: &TimelineEntry) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            name: entry.name().to_string(),
            entry_type: entry.entry_type(),
            start_time_ms: entry.start_time(),
            duration_ms: entry.duration(),
            collected_at: Utc::now(),
        }
    }

    /// Check if this record describes a measure.
    pub fn is_measure(&self) -> bool {
        self.entry_type == EntryType::Measure
    }
}

/// A batch of records sent to a sink in one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    /// Session the entries were collected in
    pub session_id: String,
    /// Version of the reporting application
    pub app_version: String,
    /// Operating system the application runs on
    pub platform: String,
    /// Wall-clock time the payload was built
    pub sent_at: DateTime<Utc>,
    /// Records in collection order
    pub entries: Vec<ReportedEntry>,
}

impl ReportPayload {
    /// Wrap records with the session they belong to.
    pub fn new(session: &TelemetrySession, entries: Vec<ReportedEntry>) -> Self {
        Self {
            session_id: session.session_id.clone(),
            app_version: session.app_version.clone(),
            platform: session.platform.clone(),
            sent_at: Utc::now(),
            entries,
        }
    }

    /// Number of records in the payload.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the payload carries no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the JSON body sent upstream.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
