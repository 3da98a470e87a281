//! Engine configuration: estimator choice, scaling factors, and precision.
//!
//! The classical XMR estimator uses the arithmetic mean of the values and of
//! the moving ranges, scaled by 2.66 (natural process limits) and 3.268
//! (upper range limit). A median-based variant swaps both estimators for
//! medians and uses the matching constants 3.145 and 3.865. It is available
//! through [`XmrConfig::median_based`] but never selected by default.
//!
//! # References
//!
//! - Wheeler, D.J. & Chambers, D.S. (1992). *Understanding Statistical Process Control*, 2nd ed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default scaling factor for the natural process limits (3 / d2, d2 = 1.128).
pub const NPL_SCALING: f64 = 2.66;

/// Default scaling factor for the upper range limit (D4 for n = 2).
pub const URL_SCALING: f64 = 3.268;

/// Natural process limit scaling for the median moving range.
pub const MEDIAN_NPL_SCALING: f64 = 3.145;

/// Upper range limit scaling for the median moving range.
pub const MEDIAN_URL_SCALING: f64 = 3.865;

/// Default number of decimal places limit values are rounded to.
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest accepted precision.
pub const MAX_PRECISION: u32 = 10;

/// Central-tendency estimator used for the centre lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Estimator {
    /// Arithmetic mean of values and of moving ranges.
    #[default]
    Mean,
    /// Median of values and of moving ranges.
    Median,
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Natural process limit scaling must be finite and positive.
    #[error("natural process limit scaling must be finite and positive, got {0}")]
    NplScaling(f64),
    /// Upper range limit scaling must be finite and positive.
    #[error("upper range limit scaling must be finite and positive, got {0}")]
    UrlScaling(f64),
    /// Precision above [`MAX_PRECISION`].
    #[error("precision must be at most 10 decimal places, got {0}")]
    Precision(u32),
}

/// Validated engine configuration.
///
/// # Examples
///
/// ```
/// use u_xmr::{Estimator, XmrConfig};
///
/// let classic = XmrConfig::default();
/// assert_eq!(classic.estimator(), Estimator::Mean);
/// assert!((classic.npl_scaling() - 2.66).abs() < f64::EPSILON);
///
/// let median = XmrConfig::median_based();
/// assert_eq!(median.estimator(), Estimator::Median);
/// assert!((median.url_scaling() - 3.865).abs() < f64::EPSILON);
///
/// assert!(XmrConfig::new(Estimator::Mean, -1.0, 3.268, 2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ConfigFields")]
pub struct XmrConfig {
    estimator: Estimator,
    npl_scaling: f64,
    url_scaling: f64,
    precision: u32,
}

impl XmrConfig {
    /// Create a configuration, validating every field.
    pub fn new(
        estimator: Estimator,
        npl_scaling: f64,
        url_scaling: f64,
        precision: u32,
    ) -> Result<Self, ConfigError> {
        if !npl_scaling.is_finite() || npl_scaling <= 0.0 {
            return Err(ConfigError::NplScaling(npl_scaling));
        }
        if !url_scaling.is_finite() || url_scaling <= 0.0 {
            return Err(ConfigError::UrlScaling(url_scaling));
        }
        if precision > MAX_PRECISION {
            return Err(ConfigError::Precision(precision));
        }
        Ok(Self {
            estimator,
            npl_scaling,
            url_scaling,
            precision,
        })
    }

    /// The median-based preset: median estimators with 3.145 / 3.865 scaling.
    pub fn median_based() -> Self {
        Self {
            estimator: Estimator::Median,
            npl_scaling: MEDIAN_NPL_SCALING,
            url_scaling: MEDIAN_URL_SCALING,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Same configuration with a different rounding precision.
    pub fn with_precision(self, precision: u32) -> Result<Self, ConfigError> {
        Self::new(self.estimator, self.npl_scaling, self.url_scaling, precision)
    }

    /// Centre-line estimator.
    pub fn estimator(&self) -> Estimator {
        self.estimator
    }

    /// Multiplier applied to the mean movement for the natural process limits.
    pub fn npl_scaling(&self) -> f64 {
        self.npl_scaling
    }

    /// Multiplier applied to the mean movement for the upper range limit.
    pub fn url_scaling(&self) -> f64 {
        self.url_scaling
    }

    /// Decimal places limit values are rounded to.
    pub fn precision(&self) -> u32 {
        self.precision
    }
}

impl Default for XmrConfig {
    fn default() -> Self {
        Self {
            estimator: Estimator::Mean,
            npl_scaling: NPL_SCALING,
            url_scaling: URL_SCALING,
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Unvalidated deserialization form; absent fields take the defaults of the
/// chosen estimator.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFields {
    #[serde(default)]
    estimator: Estimator,
    npl_scaling: Option<f64>,
    url_scaling: Option<f64>,
    precision: Option<u32>,
}

impl TryFrom<ConfigFields> for XmrConfig {
    type Error = ConfigError;

    fn try_from(fields: ConfigFields) -> Result<Self, Self::Error> {
        let preset = match fields.estimator {
            Estimator::Mean => XmrConfig::default(),
            Estimator::Median => XmrConfig::median_based(),
        };
        XmrConfig::new(
            fields.estimator,
            fields.npl_scaling.unwrap_or(preset.npl_scaling),
            fields.url_scaling.unwrap_or(preset.url_scaling),
            fields.precision.unwrap_or(preset.precision),
        )
    }
}
