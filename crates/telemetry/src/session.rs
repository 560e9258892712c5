//! Reporting session identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Identifies the process run that produced a set of reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySession {
    /// Unique identifier for this run
    pub session_id: String,
    /// Wall-clock time the session began
    pub started_at: DateTime<Utc>,
    /// Version of the reporting application
    pub app_version: String,
    /// Operating system the application runs on
    pub platform: String,
}

impl TelemetrySession {
    /// Start a session on the current platform.
    pub fn new(app_version: &str) -> Self {
        Self::with_platform(app_version, &get_platform())
    }

    /// Start a session with an explicit platform name.
    pub fn with_platform(app_version: &str, platform: &str) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            app_version: app_version.to_string(),
            platform: platform.to_string(),
        }
    }

    /// Wall-clock time elapsed since the session began.
    pub fn uptime(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Name of the operating system, e.g. "linux" or "macos".
pub fn get_platform() -> String {
    match std::env::consts::OS {
        "" => "unknown".to_string(),
        os => os.to_string(),
    }
}
