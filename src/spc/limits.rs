//! Natural process limits for an XMR chart.
//!
//! # Formulas
//!
//! ```text
//! X̄    = mean(x)                       (or median, see Estimator)
//! mR̄   = mean(|x_i - x_{i-1}|)          0 when fewer than 2 points
//! UNPL = X̄ + E · mR̄                     E = 2.66 (median variant: 3.145)
//! LNPL = X̄ - E · mR̄
//! URL  = D · mR̄                         D = 3.268 (median variant: 3.865)
//! LQM  = (LNPL + X̄) / 2
//! UQM  = (UNPL + X̄) / 2
//! ```
//!
//! Every value is computed from unrounded intermediates and rounded only
//! when it is stored in the [`LimitSet`]. The moving-range chart has no computed
//! lower limit; its floor is always zero.
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation*, 2nd ed., Chapter 5.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use u_numflow::stats;

use super::chart::{round_to, DataPoint, LimitSet};
use super::movement::derive_movements;
use crate::config::{Estimator, XmrConfig};

/// Compute the limit set of a cleaned value series.
///
/// Returns `None` for an empty series. A single point yields a mean movement
/// of zero, so all limits collapse onto the mean.
///
/// # Examples
///
/// ```
/// use u_xmr::spc::{calculate_limits, DataPoint};
/// use u_xmr::XmrConfig;
///
/// let points: Vec<DataPoint> = [95.0, 105.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &v)| DataPoint::new(i as i64, None, v))
///     .collect();
/// let limits = calculate_limits(&points, &XmrConfig::default()).expect("non-empty");
/// assert!((limits.mean - 100.0).abs() < f64::EPSILON);
/// assert!((limits.mean_movement - 10.0).abs() < f64::EPSILON);
/// assert!((limits.upper_natural_limit - 126.6).abs() < 1e-9);
/// assert!((limits.lower_natural_limit - 73.4).abs() < 1e-9);
/// assert!((limits.upper_range_limit - 32.68).abs() < 1e-9);
/// ```
///
/// # Complexity
///
/// Time: O(n) for the mean estimator, O(n log n) for the median.
pub fn calculate_limits(points: &[DataPoint], config: &XmrConfig) -> Option<LimitSet> {
    let first = points.first()?;
    let last = points.last()?;
    let places = config.precision();

    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let movements: Vec<f64> = derive_movements(points).iter().map(|m| m.value).collect();

    let mean = centre(&values, config.estimator());
    let mean_movement = centre(&movements, config.estimator());

    let delta = config.npl_scaling() * mean_movement;
    let upper_natural_limit = mean + delta;
    let lower_natural_limit = mean - delta;
    let upper_range_limit = config.url_scaling() * mean_movement;
    let lower_quarter_marker = (lower_natural_limit + mean) / 2.0;
    let upper_quarter_marker = (upper_natural_limit + mean) / 2.0;

    Some(LimitSet {
        period_start: first.timestamp,
        period_end: last.timestamp,
        mean: round_to(mean, places),
        mean_movement: round_to(mean_movement, places),
        upper_natural_limit: round_to(upper_natural_limit, places),
        lower_natural_limit: round_to(lower_natural_limit, places),
        upper_range_limit: round_to(upper_range_limit, places),
        lower_quarter_marker: round_to(lower_quarter_marker, places),
        upper_quarter_marker: round_to(upper_quarter_marker, places),
    })
}

/// Centre of `data` under `estimator`; an empty slice has centre zero, which
/// is what a mean with its denominator floored at one gives.
fn centre(data: &[f64], estimator: Estimator) -> f64 {
    let centre = match estimator {
        Estimator::Mean => stats::mean(data),
        Estimator::Median => stats::median(data),
    };
    centre.unwrap_or(0.0)
}
