//! Timestamp helper. All record timestamps are epoch seconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as epoch seconds. Clamps to 0 for clocks before the epoch.
pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
