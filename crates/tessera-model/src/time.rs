//! Timestamp helpers
//!
//! Wire timestamps are `prost_types::Timestamp`; callers wanting a
//! calendar value convert through chrono.

use chrono::{DateTime, TimeZone, Utc};
use prost_types::Timestamp;

/// Current wall-clock time as a wire timestamp
pub fn now() -> Timestamp {
    std::time::SystemTime::now().into()
}

/// Convert a wire timestamp to a UTC datetime
///
/// Out-of-range values clamp to the epoch rather than panic.
pub fn to_datetime(ts: &Timestamp) -> DateTime<Utc> {
    Utc.timestamp_opt(ts.seconds, ts.nanos.max(0) as u32)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
}
