//! Suspicious-activity records and correlation query types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One suspicious-activity record as flushed to the durable log and the
/// webhook sink. The identity field carries a single representative
/// identity (the first one attempted from the address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousReport {
    pub address: String,
    pub failed_attempts: u64,
    pub identity: String,
    pub timestamp: DateTime<Utc>,
}

/// Raw append unit accepted by the activity log store: a serialized
/// structured message plus its timestamp.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Trailing time range bounding one correlation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    /// Window covering the last `seconds` up to now.
    pub fn trailing(seconds: u64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::seconds(seconds as i64),
            end,
        }
    }
}

/// One field-extracted row returned by a windowed activity query.
///
/// Fields the store could not extract survive as `None`; the correlator
/// skips such rows rather than failing the aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRow {
    pub address: Option<String>,
    pub failed_attempts: Option<u64>,
    pub identity: Option<String>,
}
