//! Timestamp formatting for pages and emails.
//!
//! Timestamps are stored in UTC. Shoppers see them in India Standard Time,
//! which is a fixed +05:30 offset with no daylight saving.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

fn ist() -> Option<FixedOffset> {
    FixedOffset::east_opt(IST_OFFSET_SECONDS)
}

/// Format a UTC timestamp as `14 Oct 2026, 03:45 PM IST`.
///
/// Falls back to the same layout labelled `UTC` if the offset cannot be built.
#[must_use]
pub fn format_ist(at: DateTime<Utc>) -> String {
    match ist() {
        Some(offset) => at
            .with_timezone(&offset)
            .format("%d %b %Y, %I:%M %p IST")
            .to_string(),
        None => at.format("%d %b %Y, %I:%M %p UTC").to_string(),
    }
}

/// Format a naive timestamp, which is taken to be UTC.
#[must_use]
pub fn format_ist_naive(at: NaiveDateTime) -> String {
    format_ist(at.and_utc())
}

/// Long form used in order emails: `October 14, 2026 at 10:15 AM` (UTC).
#[must_use]
pub fn format_order_date(at: DateTime<Utc>) -> String {
    at.format("%B %d, %Y at %I:%M %p").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_ist_shifts_by_five_thirty() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 10, 15, 0).unwrap();
        assert_eq!(format_ist(at), "14 Oct 2026, 03:45 PM IST");
    }

    #[test]
    fn test_ist_crosses_midnight() {
        let at = Utc.with_ymd_and_hms(2026, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(format_ist(at), "01 Jan 2027, 01:30 AM IST");
    }

    #[test]
    fn test_naive_is_treated_as_utc() {
        let naive = Utc
            .with_ymd_and_hms(2026, 1, 5, 0, 0, 0)
            .unwrap()
            .naive_utc();
        assert_eq!(format_ist_naive(naive), "05 Jan 2026, 05:30 AM IST");
    }

    #[test]
    fn test_order_date_long_form() {
        let at = Utc.with_ymd_and_hms(2026, 10, 4, 9, 5, 0).unwrap();
        assert_eq!(format_order_date(at), "October 04, 2026 at 09:05 AM");
    }
}
