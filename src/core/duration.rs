//! Humanized elapsed-time strings for embeds
//!
//! Produces the `(2 years 3 months ago)` part of info embeds. Month and year
//! lengths use fixed civil approximations; for display purposes that is
//! plenty.

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Break the span between two instants into the three largest non-zero units.
///
/// Returns `"moments"` for sub-second (or inverted) spans.
pub fn humanize_between(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let mut secs = (to - from).num_seconds();
    if secs < 1 {
        return "moments".to_string();
    }

    let units: [(i64, &str); 6] = [
        (YEAR, "year"),
        (MONTH, "month"),
        (DAY, "day"),
        (HOUR, "hour"),
        (MINUTE, "minute"),
        (1, "second"),
    ];

    let mut parts = Vec::new();
    for (size, name) in units {
        if parts.len() == 3 {
            break;
        }
        let count = secs / size;
        if count > 0 {
            secs -= count * size;
            let plural = if count == 1 { "" } else { "s" };
            parts.push(format!("{count} {name}{plural}"));
        }
    }
    parts.join(" ")
}

/// Humanize the span between a unix timestamp and now.
pub fn humanize_since_unix(unix: i64) -> String {
    match DateTime::from_timestamp(unix, 0) {
        Some(then) => humanize_between(then, Utc::now()),
        None => "an unknown time".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(unix: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(unix, 0).unwrap()
    }

    #[test]
    fn test_moments_for_zero_span() {
        assert_eq!(humanize_between(at(1000), at(1000)), "moments");
    }

    #[test]
    fn test_moments_for_inverted_span() {
        assert_eq!(humanize_between(at(2000), at(1000)), "moments");
    }

    #[test]
    fn test_single_unit() {
        assert_eq!(humanize_between(at(0), at(MINUTE)), "1 minute");
        assert_eq!(humanize_between(at(0), at(45)), "45 seconds");
    }

    #[test]
    fn test_mixed_units_capped_at_three() {
        let span = YEAR + 2 * MONTH + 3 * DAY + 4 * HOUR;
        let text = humanize_between(at(0), at(span));
        assert_eq!(text, "1 year 2 months 3 days");
    }

    #[test]
    fn test_skips_zero_units() {
        let span = 2 * DAY + 30 * MINUTE;
        assert_eq!(humanize_between(at(0), at(span)), "2 days 30 minutes");
    }
}
