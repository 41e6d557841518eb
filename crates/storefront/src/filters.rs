//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use fashion_store_core::{format_inr, format_ist};

/// Formats an amount in rupees with Indian digit grouping.
///
/// Values that are not numbers are rendered unchanged.
///
/// Usage in templates: `{{ order.total_amount|inr }}`
#[askama::filter_fn]
pub fn inr(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw
        .trim()
        .parse::<Decimal>()
        .map_or(raw, format_inr))
}

/// Formats a UTC timestamp in India Standard Time.
///
/// Accepts the `Display` form of `DateTime<Utc>` or a bare timestamp, which is
/// taken to be UTC. Anything else is rendered unchanged.
///
/// Usage in templates: `{{ order.created_at|ist_datetime }}`
#[askama::filter_fn]
pub fn ist_datetime(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(parse_utc(&raw).map_or(raw, format_ist))
}

fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(at.with_timezone(&Utc));
    }
    let naive = trimmed.strip_suffix(" UTC").unwrap_or(trimmed);
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|at| at.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_utc_accepts_display_form() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 10, 15, 0).unwrap();
        assert_eq!(parse_utc(&at.to_string()), Some(at));
        assert_eq!(parse_utc(&at.naive_utc().to_string()), Some(at));
        assert_eq!(parse_utc("2026-10-14T10:15:00+00:00"), Some(at));
        assert_eq!(parse_utc("yesterday"), None);
    }
}
