//! Signal rules for detecting exceptional variation on an XMR chart.
//!
//! Three rules are applied to the value series, always in this order:
//!
//! 1. [`RunOfEight`] — 8 consecutive points on the same side of the mean
//! 2. [`FourNearLimit`] — 3 of 4 consecutive points beyond a quarter marker
//! 3. [`OutsideLimit`] — a point beyond a natural process limit
//!
//! The moving-range series only gets [`OutsideLimit`], against `[0, URL]`.
//!
//! Every rule overwrites the status of each point it flags, whatever that
//! status was. The final status is therefore the *last* rule to flag a
//! point, not the most severe one; `OutsideLimit` only dominates because it
//! runs last.
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation*, 2nd ed., Chapter 9.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

use super::chart::{DataPoint, LimitSet, Status};

/// Rules applied to the value series, in execution order.
pub const VALUE_RULES: [&dyn SignalRule; 3] = [&RunOfEight, &FourNearLimit, &OutsideLimit];

/// Rules applied to the moving-range series, in execution order.
pub const MOVEMENT_RULES: [&dyn SignalRule; 1] = [&OutsideLimit];

/// Thresholds a series is tested against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Centre line used by the run-of-eight rule.
    pub centre: f64,
    /// Points strictly below this count towards a four-near-limit signal.
    pub lower_quarter_marker: f64,
    /// Points strictly above this count towards a four-near-limit signal.
    pub upper_quarter_marker: f64,
    /// Points strictly below this are outside the limits.
    pub lower_limit: f64,
    /// Points strictly above this are outside the limits.
    pub upper_limit: f64,
}

impl Bounds {
    /// Value-chart bounds: natural process limits and quarter markers.
    pub fn values(limits: &LimitSet) -> Self {
        Self {
            centre: limits.mean,
            lower_quarter_marker: limits.lower_quarter_marker,
            upper_quarter_marker: limits.upper_quarter_marker,
            lower_limit: limits.lower_natural_limit,
            upper_limit: limits.upper_natural_limit,
        }
    }

    /// Moving-range bounds: `[0, URL]`.
    ///
    /// The run rules are never applied to movements, so the quarter markers
    /// simply coincide with the limits.
    pub fn movements(limits: &LimitSet) -> Self {
        Self {
            centre: limits.mean_movement,
            lower_quarter_marker: 0.0,
            upper_quarter_marker: limits.upper_range_limit,
            lower_limit: 0.0,
            upper_limit: limits.upper_range_limit,
        }
    }
}

/// A rule that flags points of a series.
pub trait SignalRule {
    /// Status written onto every flagged point.
    fn status(&self) -> Status;

    /// Indices of the points this rule flags. May contain duplicates.
    ///
    /// Only point values are inspected, never their current status.
    fn flagged(&self, points: &[DataPoint], bounds: &Bounds) -> Vec<usize>;
}

/// Run of eight: 8 consecutive points above the centre, or 8 consecutive
/// points not above it (a point equal to the centre counts as not above).
///
/// Tracks sides in an 8-bit rolling mask, bit `i % 8` for point `i`. While
/// priming (indices 0..7) bits are only ever set; from index 7 on each step
/// sets or clears its bit and then tests the mask.
pub struct RunOfEight;

/// Four near limit: at least 3 of 4 consecutive points strictly beyond the
/// same quarter marker.
///
/// Keeps one counter per side over a trailing window of four. While priming
/// (indices 0..3) counters only grow; from index 3 on each step adds the
/// incoming point, tests, and then removes the point leaving the window.
pub struct FourNearLimit;

/// Outside limit: a single point strictly beyond either limit.
pub struct OutsideLimit;

const RUN_LENGTH: usize = 8;
const WINDOW: usize = 4;
const NEAR_LIMIT_COUNT: usize = 3;

impl SignalRule for RunOfEight {
    fn status(&self) -> Status {
        Status::RunOfEight
    }

    fn flagged(&self, points: &[DataPoint], bounds: &Bounds) -> Vec<usize> {
        let mut flagged = Vec::new();
        if points.len() < RUN_LENGTH {
            return flagged;
        }

        let mut mask: u8 = 0;
        for (i, point) in points.iter().enumerate() {
            let bit = 1_u8 << (i % RUN_LENGTH);
            let above = point.value > bounds.centre;
            if i < RUN_LENGTH - 1 {
                if above {
                    mask |= bit;
                }
                continue;
            }

            if above {
                mask |= bit;
            } else {
                mask &= !bit;
            }
            if mask == u8::MAX || mask == 0 {
                flagged.extend(i + 1 - RUN_LENGTH..=i);
            }
        }
        flagged
    }
}

impl SignalRule for FourNearLimit {
    fn status(&self) -> Status {
        Status::FourNearLimit
    }

    fn flagged(&self, points: &[DataPoint], bounds: &Bounds) -> Vec<usize> {
        let mut flagged = Vec::new();
        if points.len() < WINDOW {
            return flagged;
        }

        let below = |v: f64| usize::from(v < bounds.lower_quarter_marker);
        let above = |v: f64| usize::from(v > bounds.upper_quarter_marker);

        let mut below_count = 0_usize;
        let mut above_count = 0_usize;
        for (i, point) in points.iter().enumerate() {
            below_count += below(point.value);
            above_count += above(point.value);
            if i < WINDOW - 1 {
                continue;
            }

            if below_count >= NEAR_LIMIT_COUNT || above_count >= NEAR_LIMIT_COUNT {
                flagged.extend(i + 1 - WINDOW..=i);
            }

            let leaving = points[i + 1 - WINDOW].value;
            below_count -= below(leaving);
            above_count -= above(leaving);
        }
        flagged
    }
}

impl SignalRule for OutsideLimit {
    fn status(&self) -> Status {
        Status::OutsideLimit
    }

    fn flagged(&self, points: &[DataPoint], bounds: &Bounds) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.value < bounds.lower_limit || p.value > bounds.upper_limit)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Reset every point to [`Status::Normal`], then run `rules` in order, each
/// overwriting the status of the points it flags.
///
/// Mutates `points` in place; clone the series first if the original
/// statuses are still needed.
pub fn apply_rules(points: &mut [DataPoint], bounds: &Bounds, rules: &[&dyn SignalRule]) {
    for point in points.iter_mut() {
        point.status = Status::Normal;
    }
    for rule in rules {
        let status = rule.status();
        for idx in rule.flagged(points, bounds) {
            points[idx].status = status;
        }
    }
}

/// Annotate a value series with [`VALUE_RULES`] against its natural process limits.
///
/// Mutates `points` in place.
pub fn detect_value_exceptions(points: &mut [DataPoint], limits: &LimitSet) {
    apply_rules(points, &Bounds::values(limits), &VALUE_RULES);
}

/// Annotate a moving-range series with [`MOVEMENT_RULES`] against `[0, URL]`.
///
/// Mutates `movements` in place.
pub fn detect_movement_exceptions(movements: &mut [DataPoint], limits: &LimitSet) {
    apply_rules(movements, &Bounds::movements(limits), &MOVEMENT_RULES);
}
