//! Moving-range derivation.

use super::chart::DataPoint;

/// Derive the moving-range series of `points`.
///
/// Movement `i` is `|v[i+1] - v[i]|` and carries the order and timestamp of
/// the later point. The result has `max(n - 1, 0)` points, all
/// [`Status::Normal`](super::Status::Normal) regardless of the source status.
///
/// # Examples
///
/// ```
/// use u_xmr::spc::{derive_movements, DataPoint};
///
/// let points: Vec<DataPoint> = [10.0, 12.0, 9.0]
///     .iter()
///     .enumerate()
///     .map(|(i, &v)| DataPoint::new(i as i64, None, v))
///     .collect();
/// let movements = derive_movements(&points);
/// assert_eq!(movements.len(), 2);
/// assert!((movements[0].value - 2.0).abs() < f64::EPSILON);
/// assert!((movements[1].value - 3.0).abs() < f64::EPSILON);
/// assert_eq!(movements[1].order, 2);
/// ```
///
/// # Complexity
///
/// Time: O(n), Space: O(n)
pub fn derive_movements(points: &[DataPoint]) -> Vec<DataPoint> {
    points
        .windows(2)
        .map(|w| DataPoint::new(w[1].order, w[1].timestamp, (w[1].value - w[0].value).abs()))
        .collect()
}
