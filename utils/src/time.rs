//! Time formatting helpers.

use chrono::DateTime;
use notary_types::Timestamp;

/// Render a timestamp as a UTC calendar time, e.g. `2023-11-14 22:13:20 UTC`.
///
/// Values outside chrono's range fall back to raw seconds.
pub fn format_timestamp(ts: Timestamp) -> String {
    i64::try_from(ts.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
