//! Core XMR chart types.
//!
//! Defines the building blocks shared by every stage of the engine: the raw
//! input record, the annotated data point with its signal [`Status`], and the
//! [`LimitSet`] computed once per series.
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation: The Key to Managing Chaos*, 2nd ed.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signal status of a point on an XMR chart.
///
/// The integer codes are a stable wire contract: renderers colour-code
/// points by these exact values, so variants must never be renumbered.
///
/// The final status of a point is the last rule that flagged it, not the
/// most severe one. Rules run in the order the variants are declared, which
/// is why [`Status::OutsideLimit`] wins in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Status {
    /// No signal.
    #[default]
    Normal = 0,
    /// Part of a run of eight consecutive points on one side of the mean.
    RunOfEight = 1,
    /// Part of a window of four where at least three sit beyond a quarter marker.
    FourNearLimit = 2,
    /// Beyond a natural process limit (or the upper range limit for movements).
    OutsideLimit = 3,
}

impl Status {
    /// Wire code of this status.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns `true` for every status other than [`Status::Normal`].
    pub fn is_signal(self) -> bool {
        self != Status::Normal
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for Status {
    type Error = UnknownStatus;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Status::Normal),
            1 => Ok(Status::RunOfEight),
            2 => Ok(Status::FourNearLimit),
            3 => Ok(Status::OutsideLimit),
            other => Err(UnknownStatus(other)),
        }
    }
}

/// A status code outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStatus(pub u8);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status code {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

/// A raw input record, as supplied by a data-entry layer.
///
/// Both `x` and `value` may be missing; such rows are dropped during
/// cleaning rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    /// Original input position, used for stable tie-breaking.
    pub order: i64,
    /// Date string, e.g. `2024-01-01` or an RFC 3339 timestamp.
    #[serde(default)]
    pub x: Option<String>,
    /// Measured value.
    #[serde(default)]
    pub value: Option<f64>,
}

impl RawPoint {
    /// Convenience constructor for a complete record.
    pub fn new(order: i64, x: impl Into<String>, value: f64) -> Self {
        Self {
            order,
            x: Some(x.into()),
            value: Some(value),
        }
    }
}

/// A cleaned, annotated point on either the value or the movement chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Original input position of the record (for movements, of the later record).
    pub order: i64,
    /// Parsed instant, or `None` when the date string could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    /// Measured value (or absolute difference, for movements).
    pub value: f64,
    /// Signal status assigned by exception detection.
    pub status: Status,
}

impl DataPoint {
    /// Create a point with [`Status::Normal`].
    pub fn new(order: i64, timestamp: Option<DateTime<Utc>>, value: f64) -> Self {
        Self {
            order,
            timestamp,
            value,
            status: Status::Normal,
        }
    }
}

/// Limits computed from one series.
///
/// Every numeric field is computed from unrounded intermediates and rounded
/// to the configured precision only when stored here.
///
/// # Invariants
///
/// - `lower_natural_limit <= lower_quarter_marker <= mean`
/// - `mean <= upper_quarter_marker <= upper_natural_limit`
/// - `upper_range_limit >= 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSet {
    /// Timestamp of the first point of the series.
    pub period_start: Option<DateTime<Utc>>,
    /// Timestamp of the last point of the series.
    pub period_end: Option<DateTime<Utc>>,
    /// Centre line of the value chart.
    pub mean: f64,
    /// Centre line of the moving-range chart.
    pub mean_movement: f64,
    /// Upper natural process limit (UNPL).
    pub upper_natural_limit: f64,
    /// Lower natural process limit (LNPL).
    pub lower_natural_limit: f64,
    /// Upper range limit (URL) of the moving-range chart.
    pub upper_range_limit: f64,
    /// Midpoint between the mean and the LNPL.
    pub lower_quarter_marker: f64,
    /// Midpoint between the mean and the UNPL.
    pub upper_quarter_marker: f64,
}

impl LimitSet {
    /// Whether `value` lies within the natural process limits (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_natural_limit && value <= self.upper_natural_limit
    }
}

/// Round `value` to `places` decimal places, half away from zero.
///
/// Re-rounding an already rounded value returns it unchanged. Values too
/// large to scale by `10^places` are already more precise than `places`
/// decimals can express and are returned as is.
pub fn round_to(value: f64, places: u32) -> f64 {
    let exponent = i32::try_from(places).unwrap_or(i32::MAX);
    let factor = 10_f64.powi(exponent);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_stable() {
        assert_eq!(Status::Normal.code(), 0);
        assert_eq!(Status::RunOfEight.code(), 1);
        assert_eq!(Status::FourNearLimit.code(), 2);
        assert_eq!(Status::OutsideLimit.code(), 3);
    }

    #[test]
    fn test_status_try_from() {
        assert_eq!(Status::try_from(3), Ok(Status::OutsideLimit));
        assert_eq!(Status::try_from(4), Err(UnknownStatus(4)));
    }

    #[test]
    fn test_status_serializes_as_integer() {
        let json = serde_json::to_string(&Status::FourNearLimit).expect("serialize");
        assert_eq!(json, "2");
        let back: Status = serde_json::from_str("1").expect("deserialize");
        assert_eq!(back, Status::RunOfEight);
        assert!(serde_json::from_str::<Status>("9").is_err());
    }

    #[test]
    fn test_status_is_signal() {
        assert!(!Status::Normal.is_signal());
        assert!(Status::RunOfEight.is_signal());
        assert!(Status::OutsideLimit.is_signal());
    }

    #[test]
    fn test_raw_point_missing_fields_deserialize() {
        let raw: RawPoint = serde_json::from_str(r#"{"order": 3}"#).expect("deserialize");
        assert_eq!(raw.order, 3);
        assert!(raw.x.is_none());
        assert!(raw.value.is_none());
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        assert!((round_to(2.345_f64 + 1e-12, 2) - 2.35).abs() < f64::EPSILON);
        assert!((round_to(-0.125, 2) - (-0.13)).abs() < f64::EPSILON);
        assert!((round_to(0.125, 2) - 0.13).abs() < f64::EPSILON);
        assert!((round_to(10.0, 2) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_to_idempotent() {
        for &v in &[1.23, -4.56, 0.0, 1234.5, 0.01] {
            let once = round_to(v, 2);
            assert_eq!(round_to(once, 2), once);
        }
    }

    #[test]
    fn test_round_to_huge_values_unchanged() {
        assert_eq!(round_to(1e307, 2), 1e307);
        assert_eq!(round_to(-f64::MAX, 2), -f64::MAX);
        assert_eq!(round_to(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_round_to_huge_precision_unchanged() {
        assert_eq!(round_to(1.5, u32::MAX), 1.5);
        assert_eq!(round_to(0.125, 400), 0.125);
        assert_eq!(round_to(0.0, u32::MAX), 0.0);
    }

    #[test]
    fn test_limit_set_contains_is_inclusive() {
        let limits = LimitSet {
            period_start: None,
            period_end: None,
            mean: 25.0,
            mean_movement: 1.0,
            upper_natural_limit: 27.66,
            lower_natural_limit: 22.34,
            upper_range_limit: 3.27,
            lower_quarter_marker: 23.67,
            upper_quarter_marker: 26.33,
        };
        assert!(limits.contains(27.66));
        assert!(limits.contains(22.34));
        assert!(!limits.contains(27.67));
    }

    #[test]
    fn test_limit_set_field_names() {
        let limits = LimitSet {
            period_start: None,
            period_end: None,
            mean: 1.0,
            mean_movement: 0.0,
            upper_natural_limit: 1.0,
            lower_natural_limit: 1.0,
            upper_range_limit: 0.0,
            lower_quarter_marker: 1.0,
            upper_quarter_marker: 1.0,
        };
        let json = serde_json::to_value(&limits).expect("serialize");
        assert!(json.get("upperNaturalLimit").is_some());
        assert!(json.get("meanMovement").is_some());
        assert!(json.get("periodStart").is_some());
    }
}
