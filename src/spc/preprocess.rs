//! Input cleaning: drop incomplete records, parse dates, and sort by time.
//!
//! Cleaning never fails. Records without a date, or without a usable value,
//! are silently dropped; a value of exactly zero is kept. Date strings that
//! cannot be parsed are not rejected. They become `None` timestamps and sort
//! after every parseable instant, keeping their relative input order.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::chart::{DataPoint, RawPoint};

/// Naive date-time layouts accepted after RFC 3339, read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Date-only layout accepted last, read as UTC midnight.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date string into a UTC instant.
///
/// Accepts RFC 3339 timestamps (any offset), naive date-times, and plain
/// `YYYY-MM-DD` dates. Naive inputs are interpreted as UTC.
///
/// # Examples
///
/// ```
/// use u_xmr::spc::parse_timestamp;
///
/// let day = parse_timestamp("2024-01-01").expect("plain date");
/// let rfc = parse_timestamp("2024-01-01T00:00:00Z").expect("rfc 3339");
/// assert_eq!(day, rfc);
/// assert!(parse_timestamp("next tuesday").is_none());
/// ```
pub fn parse_timestamp(x: &str) -> Option<DateTime<Utc>> {
    let x = x.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(x) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(x, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(x, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Clean a raw series into data points stably sorted by timestamp.
///
/// A record is dropped when its `x` is missing or blank, or when its value is
/// missing or not finite. Every surviving point starts as
/// [`Status::Normal`](super::Status::Normal).
///
/// # Complexity
///
/// Time: O(n log n), Space: O(n)
pub fn clean_series(raw: &[RawPoint]) -> Vec<DataPoint> {
    let mut points: Vec<DataPoint> = raw
        .iter()
        .filter_map(|record| {
            let x = match record.x.as_deref() {
                Some(x) if !x.trim().is_empty() => x,
                _ => {
                    tracing::trace!(order = record.order, "dropping record without a date");
                    return None;
                }
            };
            let value = match record.value {
                Some(v) if v.is_finite() => v,
                _ => {
                    tracing::trace!(order = record.order, "dropping record without a value");
                    return None;
                }
            };
            let timestamp = parse_timestamp(x);
            if timestamp.is_none() {
                tracing::trace!(order = record.order, x, "unparseable date kept as invalid instant");
            }
            Some(DataPoint::new(record.order, timestamp, value))
        })
        .collect();

    // `sort_by` is stable: equal instants keep their input order.
    points.sort_by(|a, b| compare_instants(a.timestamp, b.timestamp));
    points
}

fn compare_instants(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
