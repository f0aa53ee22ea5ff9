//! # Time Formatting Utilities
//!
//! Compact, kubectl-style ages ("42s", "5m", "3h", "12d") and timestamp
//! rendering for execution and resource listings.

use chrono::{DateTime, TimeDelta, Utc};

/// Formats an RFC3339 timestamp as the time elapsed since then.
///
/// Empty input yields `<unknown>`; unparsable input is returned unchanged.
///
/// # Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use gcphcp_util::time_format::age_at;
///
/// let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
/// assert_eq!(age_at("2025-03-01T11:55:00Z", now), "5m");
/// assert_eq!(age_at("", now), "<unknown>");
/// ```
pub fn age_at(timestamp: &str, now: DateTime<Utc>) -> String {
    let trimmed = timestamp.trim();
    if trimmed.is_empty() {
        return "<unknown>".to_string();
    }
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => format_duration(now.signed_duration_since(parsed.with_timezone(&Utc))),
        Err(_) => trimmed.to_string(),
    }
}

/// Renders a duration using its largest whole unit. Negative durations are
/// clamped to zero.
pub fn format_duration(duration: TimeDelta) -> String {
    let duration = duration.max(TimeDelta::zero());
    if duration < TimeDelta::minutes(1) {
        format!("{}s", duration.num_seconds())
    } else if duration < TimeDelta::hours(1) {
        format!("{}m", duration.num_minutes())
    } else if duration < TimeDelta::days(1) {
        format!("{}h", duration.num_hours())
    } else {
        format!("{}d", duration.num_days())
    }
}

/// Renders an execution run time with millisecond precision, e.g. `3.512s`
/// or `2m5.001s`.
pub fn format_elapsed(duration: TimeDelta) -> String {
    let millis = duration.num_milliseconds().max(0);
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) as f64 / 1000.0;
    if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Formats a timestamp the way execution status output shows it.
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
