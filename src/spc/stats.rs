//! XMR chart statistics: the engine entry point.
//!
//! [`compute_stats`] cleans a raw series, computes its [`LimitSet`],
//! annotates the value and moving-range series with signal statuses, and
//! works out the axis bounds a renderer needs so that out-of-limit points
//! are never clipped.
//!
//! # Algorithm
//!
//! 1. Clean and stably sort the raw records.
//! 2. Compute limits from the cleaned values.
//! 3. Run the value rules (run of eight, four near limit, outside limit).
//! 4. Derive movements from the annotated values and run the outside-limit
//!    rule against `[0, URL]`.
//! 5. Widen the axis bounds from the limits to cover every plotted value.

use serde::{Deserialize, Serialize};

use super::chart::{DataPoint, LimitSet, RawPoint, Status};
use super::limits::calculate_limits;
use super::movement::derive_movements;
use super::preprocess::clean_series;
use super::rules::{detect_movement_exceptions, detect_value_exceptions};
use crate::config::XmrConfig;

/// Result of an XMR computation over one series.
///
/// When the cleaned series is empty the result is degenerate: both
/// annotated sequences and `limit_sets` are empty and the axis bounds keep
/// their sentinels (`+∞` for the minimum, `-∞` for the maxima). Check
/// [`Stats::is_degenerate`] before plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Lower bound of the value chart's axis.
    #[serde(with = "axis_bound::min")]
    pub value_chart_min: f64,
    /// Upper bound of the value chart's axis.
    #[serde(with = "axis_bound::max")]
    pub value_chart_max: f64,
    /// Upper bound of the moving-range chart's axis; its lower bound is always 0.
    #[serde(with = "axis_bound::max")]
    pub movement_chart_max: f64,
    /// Limits per segment; exactly one for a non-empty series.
    pub limit_sets: Vec<LimitSet>,
    /// Cleaned values, sorted by time, with their final statuses.
    pub annotated_values: Vec<DataPoint>,
    /// Moving ranges with their final statuses.
    pub annotated_movements: Vec<DataPoint>,
}

/// Axis bounds on the wire: finite values as numbers, the unresolved
/// sentinels as `null`. A `null` reads back as `+∞` for a minimum and `-∞`
/// for a maximum.
mod axis_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bound: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if bound.is_finite() {
            serializer.serialize_some(bound)
        } else {
            serializer.serialize_none()
        }
    }

    fn deserialize_or<'de, D: Deserializer<'de>>(
        deserializer: D,
        unresolved: f64,
    ) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(unresolved))
    }

    pub mod min {
        use serde::Deserializer;

        pub use super::serialize;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            super::deserialize_or(deserializer, f64::INFINITY)
        }
    }

    pub mod max {
        use serde::Deserializer;

        pub use super::serialize;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            super::deserialize_or(deserializer, f64::NEG_INFINITY)
        }
    }
}

impl Stats {
    /// The empty result: no points, no limits, unresolved axis bounds.
    pub fn degenerate() -> Self {
        Self {
            value_chart_min: f64::INFINITY,
            value_chart_max: f64::NEG_INFINITY,
            movement_chart_max: f64::NEG_INFINITY,
            limit_sets: Vec::new(),
            annotated_values: Vec::new(),
            annotated_movements: Vec::new(),
        }
    }

    /// Whether no limits could be computed (the cleaned series was empty).
    pub fn is_degenerate(&self) -> bool {
        self.limit_sets.is_empty()
    }

    /// The series' limit set, or `None` for a degenerate result.
    pub fn limits(&self) -> Option<&LimitSet> {
        self.limit_sets.first()
    }

    /// Number of annotated values with the given status.
    pub fn count_by_status(&self, status: Status) -> usize {
        self.annotated_values
            .iter()
            .filter(|p| p.status == status)
            .count()
    }
}

/// Compute XMR statistics for a raw series.
///
/// Never fails: unusable records are dropped and an empty series yields
/// [`Stats::degenerate`]. The caller's records are only read; the annotated
/// sequences in the result are freshly allocated.
///
/// # Examples
///
/// ```
/// use u_xmr::{compute_stats, RawPoint, Status, XmrConfig};
///
/// let mut raw: Vec<RawPoint> = (1..=9)
///     .map(|day| RawPoint::new(day, format!("2024-01-{day:02}"), 10.0))
///     .collect();
/// raw[8].value = Some(100.0);
///
/// let stats = compute_stats(&raw, &XmrConfig::default());
/// assert_eq!(stats.annotated_values.len(), 9);
/// assert_eq!(stats.annotated_movements.len(), 8);
/// assert_eq!(stats.annotated_values[8].status, Status::OutsideLimit);
/// assert_eq!(stats.annotated_movements[7].status, Status::OutsideLimit);
/// assert!(stats.value_chart_max >= 100.0);
/// ```
///
/// # Complexity
///
/// Time: O(n log n) (sorting), Space: O(n)
pub fn compute_stats(raw: &[RawPoint], config: &XmrConfig) -> Stats {
    let mut values = clean_series(raw);
    let Some(limits) = calculate_limits(&values, config) else {
        tracing::debug!(raw = raw.len(), "no usable points, returning degenerate stats");
        return Stats::degenerate();
    };
    tracing::debug!(
        raw = raw.len(),
        cleaned = values.len(),
        dropped = raw.len() - values.len(),
        mean = limits.mean,
        mean_movement = limits.mean_movement,
        unpl = limits.upper_natural_limit,
        lnpl = limits.lower_natural_limit,
        url = limits.upper_range_limit,
        "computed xmr limits"
    );

    detect_value_exceptions(&mut values, &limits);
    let mut movements = derive_movements(&values);
    detect_movement_exceptions(&mut movements, &limits);

    let mut value_chart_min = f64::INFINITY.min(limits.lower_natural_limit);
    let mut value_chart_max = f64::NEG_INFINITY.max(limits.upper_natural_limit);
    for point in &values {
        value_chart_min = value_chart_min.min(point.value);
        value_chart_max = value_chart_max.max(point.value);
    }

    let mut movement_chart_max = f64::NEG_INFINITY.max(limits.upper_range_limit);
    for movement in &movements {
        movement_chart_max = movement_chart_max.max(movement.value);
    }

    Stats {
        value_chart_min,
        value_chart_max,
        movement_chart_max,
        limit_sets: vec![limits],
        annotated_values: values,
        annotated_movements: movements,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::spc::round_to;
    use proptest::prelude::*;

    fn raw_series(max_len: usize) -> impl Strategy<Value = Vec<RawPoint>> {
        proptest::collection::vec((0_u32..60, -1e4_f64..1e4), 0..=max_len).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (day, value))| {
                    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                        .map(|d| d + chrono::Days::new(u64::from(day)))
                        .map(|d| d.format("%Y-%m-%d").to_string());
                    RawPoint {
                        order: i as i64,
                        x: date,
                        value: Some(value),
                    }
                })
                .collect()
        })
    }

    /// Equal sentinels, or finite values equal up to float parsing error.
    fn same_bound(a: f64, b: f64) -> bool {
        a == b || (a - b).abs() <= 1e-9 * a.abs().max(1.0)
    }

    proptest! {
        #[test]
        fn movement_count_matches_values(raw in raw_series(40)) {
            let stats = compute_stats(&raw, &XmrConfig::default());
            let expected = stats.annotated_values.len().saturating_sub(1);
            prop_assert_eq!(stats.annotated_movements.len(), expected);
        }

        #[test]
        fn deterministic(raw in raw_series(40)) {
            let a = compute_stats(&raw.clone(), &XmrConfig::default());
            let b = compute_stats(&raw.clone(), &XmrConfig::default());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn sorted_and_stable(raw in raw_series(40)) {
            let stats = compute_stats(&raw, &XmrConfig::default());
            for w in stats.annotated_values.windows(2) {
                prop_assert!(w[0].timestamp <= w[1].timestamp);
                if w[0].timestamp == w[1].timestamp {
                    prop_assert!(w[0].order < w[1].order);
                }
            }
        }

        #[test]
        fn outside_points_always_flagged(raw in raw_series(40)) {
            let stats = compute_stats(&raw, &XmrConfig::default());
            if let Some(limits) = stats.limits() {
                for point in &stats.annotated_values {
                    if !limits.contains(point.value) {
                        prop_assert_eq!(point.status, Status::OutsideLimit);
                    }
                }
                for movement in &stats.annotated_movements {
                    if movement.value > limits.upper_range_limit {
                        prop_assert_eq!(movement.status, Status::OutsideLimit);
                    } else {
                        prop_assert_eq!(movement.status, Status::Normal);
                    }
                }
            }
        }

        #[test]
        fn limits_rounded_and_bounds_cover_data(raw in raw_series(40)) {
            let stats = compute_stats(&raw, &XmrConfig::default());
            if let Some(limits) = stats.limits() {
                for point in &stats.annotated_values {
                    prop_assert!(point.value >= stats.value_chart_min);
                    prop_assert!(point.value <= stats.value_chart_max);
                }
                for movement in &stats.annotated_movements {
                    prop_assert!(movement.value <= stats.movement_chart_max);
                }
            } else {
                prop_assert!(stats.annotated_values.is_empty());
            }
        }

        #[test]
        fn limits_are_rounded_unrounded_values(raw in raw_series(40)) {
            let stats = compute_stats(&raw, &XmrConfig::default());
            if let Some(limits) = stats.limits() {
                let values: Vec<f64> = stats.annotated_values.iter().map(|p| p.value).collect();
                let movements: Vec<f64> =
                    stats.annotated_movements.iter().map(|m| m.value).collect();
                let mean = u_numflow::stats::mean(&values).unwrap_or(0.0);
                let mean_movement = u_numflow::stats::mean(&movements).unwrap_or(0.0);
                let upper = mean + 2.66 * mean_movement;
                let lower = mean - 2.66 * mean_movement;

                prop_assert_eq!(limits.mean, round_to(mean, 2));
                prop_assert_eq!(limits.mean_movement, round_to(mean_movement, 2));
                prop_assert_eq!(limits.upper_natural_limit, round_to(upper, 2));
                prop_assert_eq!(limits.lower_natural_limit, round_to(lower, 2));
                prop_assert_eq!(limits.upper_range_limit, round_to(3.268 * mean_movement, 2));
                prop_assert_eq!(limits.lower_quarter_marker, round_to((lower + mean) / 2.0, 2));
                prop_assert_eq!(limits.upper_quarter_marker, round_to((upper + mean) / 2.0, 2));
            }
        }

        #[test]
        fn stats_survive_json(raw in raw_series(20)) {
            let stats = compute_stats(&raw, &XmrConfig::default());
            let json = serde_json::to_string(&stats).expect("serialize");
            let back: Stats = serde_json::from_str(&json).expect("deserialize");
            prop_assert_eq!(back.annotated_values.len(), stats.annotated_values.len());
            prop_assert_eq!(back.is_degenerate(), stats.is_degenerate());
            prop_assert!(same_bound(back.value_chart_min, stats.value_chart_min));
            prop_assert!(same_bound(back.value_chart_max, stats.value_chart_max));
            prop_assert!(same_bound(back.movement_chart_max, stats.movement_chart_max));
        }
    }
}
