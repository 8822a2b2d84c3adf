//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `lastRun`, `nextRun`, log and note times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
