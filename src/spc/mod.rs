//! Individuals and Moving Range (XMR) process behaviour charts.
//!
//! The engine turns an unordered series of dated measurements into two
//! annotated charts: the values themselves, and the absolute differences
//! between consecutive values (movements).
//!
//! # Pipeline
//!
//! - [`clean_series`] — drop incomplete records, parse dates, stable sort
//! - [`calculate_limits`] — mean, mean movement, natural process limits, quarter markers
//! - [`detect_value_exceptions`] — run of eight, four near limit, outside limit
//! - [`derive_movements`] — moving ranges of the annotated values
//! - [`detect_movement_exceptions`] — outside the upper range limit
//! - [`compute_stats`] — all of the above, plus chart axis bounds
//!
//! # References
//!
//! - Wheeler, D.J. (2000). *Understanding Variation: The Key to Managing Chaos*, 2nd ed.
//! - Wheeler, D.J. & Chambers, D.S. (1992). *Understanding Statistical Process Control*, 2nd ed.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

mod chart;
mod limits;
mod movement;
mod preprocess;
mod rules;
mod stats;

pub use chart::{round_to, DataPoint, LimitSet, RawPoint, Status, UnknownStatus};
pub use limits::calculate_limits;
pub use movement::derive_movements;
pub use preprocess::{clean_series, parse_timestamp};
pub use rules::{
    apply_rules, detect_movement_exceptions, detect_value_exceptions, Bounds, FourNearLimit,
    OutsideLimit, RunOfEight, SignalRule, MOVEMENT_RULES, VALUE_RULES,
};
pub use stats::{compute_stats, Stats};
