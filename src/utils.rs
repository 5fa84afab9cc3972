//! Civil-zone clock helpers.
//!
//! Every `fetched_at` stamp uses the fixed UTC+8 civil zone, independent of
//! the host's local timezone, so that rows written from different machines
//! sort consistently.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// The fixed UTC+8 civil zone used for all capture timestamps.
pub fn civil_zone() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

/// Current time in the civil zone.
pub fn now_civil() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&civil_zone())
}

/// Render a capture timestamp: second precision, ISO-8601 with offset.
///
/// # Examples
///
/// ```ignore
/// // 2026-01-21T08:30:00+08:00
/// let stamp = fetched_at_stamp(now_civil());
/// ```
pub fn fetched_at_stamp(now: DateTime<FixedOffset>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stamp_has_offset_and_second_precision() {
        let now = civil_zone().with_ymd_and_hms(2026, 1, 21, 8, 30, 5).unwrap();
        assert_eq!(fetched_at_stamp(now), "2026-01-21T08:30:05+08:00");
    }

    #[test]
    fn test_now_civil_is_plus_eight() {
        let now = now_civil();
        assert_eq!(now.offset().local_minus_utc(), 8 * 3600);
    }
}
