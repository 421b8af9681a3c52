use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SERVICE_NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Server-assigned identifier of a stored detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(pub i64);

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed detection as stored by the service.
///
/// `image_url` is relative to the service's base endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub id: ResultId,
    pub timestamp: String,
    pub count: u32,
    pub image_url: String,
}

impl DetectionResult {
    /// Timestamp formatted for display.
    ///
    /// Accepts RFC 3339 (converted to local time) and the naive ISO-8601 form
    /// the service emits. Anything else is returned verbatim.
    pub fn display_timestamp(&self) -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
        }
        NaiveDateTime::parse_from_str(&self.timestamp, SERVICE_NAIVE_FORMAT)
            .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
            .unwrap_or_else(|_| self.timestamp.clone())
    }
}

/// Result of the most recent upload. Never part of the stored history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub count: u32,
    pub image_url: String,
}

impl UploadOutcome {
    pub fn headline(&self) -> String {
        format!("Detected Persons: {}", self.count)
    }
}
