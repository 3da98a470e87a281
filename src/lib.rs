//! # u-xmr
//!
//! Individuals/Moving-Range (XMR) process behaviour chart statistics.
//!
//! Given a dated series of measurements, this crate computes the natural
//! process limits of the values and the upper range limit of their moving
//! ranges, then flags points that signal exceptional variation. The output
//! is shaped for a renderer that draws the two charts side by side and
//! colour-codes points by [`Status`].
//!
//! ## Modules
//!
//! - [`spc`] — Cleaning, limits, signal rules, and the [`compute_stats`] entry point
//! - [`config`] — Estimator choice, scaling factors, and rounding precision
//!
//! ## Example
//!
//! ```
//! use u_xmr::{compute_stats, RawPoint, Status, XmrConfig};
//!
//! let raw: Vec<RawPoint> = (1..=9)
//!     .map(|day| RawPoint::new(day, format!("2024-01-{day:02}"), 10.0))
//!     .collect();
//! let stats = compute_stats(&raw, &XmrConfig::default());
//!
//! let limits = stats.limits().expect("non-empty series");
//! assert!((limits.mean - 10.0).abs() < f64::EPSILON);
//! // Nine points, none above the mean: a run of eight.
//! assert_eq!(stats.count_by_status(Status::RunOfEight), 9);
//! ```
//!
//! ## Design Philosophy
//!
//! - **Total**: malformed rows are dropped, never reported as errors
//! - **Pure**: every call is an independent batch computation over owned data
//! - **Exact**: limits are rounded where they are produced, and rules
//!   overwrite statuses in a fixed order

pub mod config;
pub mod spc;

pub use config::{ConfigError, Estimator, XmrConfig};
pub use spc::{compute_stats, DataPoint, LimitSet, RawPoint, Stats, Status};
