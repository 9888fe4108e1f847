//! Input value types: 2x2 confusion matrices, confidence levels, and the
//! interval type shared by every calculator.
//!
//! # Examples
//!
//! ```
//! use u_diagnostics::matrix::{ConfidenceLevel, ConfusionMatrix};
//!
//! let m = ConfusionMatrix::new(85, 5, 90, 10);
//! assert_eq!(m.total(), 190);
//! assert_eq!(m.condition_positive(), 95);
//!
//! let c = ConfidenceLevel::new(0.95).unwrap();
//! assert!((c.z_critical() - 1.959964).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Error, Result};

/// Lowest accepted two-sided confidence level.
pub const MIN_CONFIDENCE: f64 = 0.80;
/// Highest accepted two-sided confidence level.
pub const MAX_CONFIDENCE: f64 = 0.99;
/// Confidence level used when none is supplied.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// A 2x2 confusion matrix of a technique against a reference method.
///
/// Counts are unsigned, so non-negativity holds by construction. A matrix
/// whose total is zero, or whose total does not fit in a `u64`, is
/// representable but every calculator rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Reference positive, technique positive.
    pub true_positive: u64,
    /// Reference negative, technique positive.
    pub false_positive: u64,
    /// Reference negative, technique negative.
    pub true_negative: u64,
    /// Reference positive, technique negative.
    pub false_negative: u64,
}

impl ConfusionMatrix {
    /// Creates a matrix from (TP, FP, TN, FN).
    pub fn new(
        true_positive: u64,
        false_positive: u64,
        true_negative: u64,
        false_negative: u64,
    ) -> Self {
        Self {
            true_positive,
            false_positive,
            true_negative,
            false_negative,
        }
    }

    /// TP + FP + TN + FN, or `None` if the sum overflows `u64`.
    ///
    /// Every marginal is bounded by the total, so when this is `Some` none
    /// of the marginal helpers below overflow either.
    pub fn checked_total(&self) -> Option<u64> {
        self.true_positive
            .checked_add(self.false_positive)?
            .checked_add(self.true_negative)?
            .checked_add(self.false_negative)
    }

    /// TP + FP + TN + FN, saturating at `u64::MAX`.
    ///
    /// Use [`checked_total`](Self::checked_total) where an overflowing
    /// matrix must be told apart from a large one.
    pub fn total(&self) -> u64 {
        self.checked_total().unwrap_or(u64::MAX)
    }

    /// Reference positives: TP + FN.
    pub fn condition_positive(&self) -> u64 {
        self.true_positive.saturating_add(self.false_negative)
    }

    /// Reference negatives: TN + FP.
    pub fn condition_negative(&self) -> u64 {
        self.true_negative.saturating_add(self.false_positive)
    }

    /// Technique positive calls: TP + FP.
    pub fn predicted_positive(&self) -> u64 {
        self.true_positive.saturating_add(self.false_positive)
    }

    /// Technique negative calls: TN + FN.
    pub fn predicted_negative(&self) -> u64 {
        self.true_negative.saturating_add(self.false_negative)
    }

    /// Fails with [`Error::Domain`] when the matrix holds no samples or its
    /// total overflows `u64`.
    pub(crate) fn require_samples(&self) -> Result<u64> {
        match self.checked_total() {
            Some(0) => Err(Error::Domain(
                "total sample count (TP + FP + TN + FN) cannot be zero".to_string(),
            )),
            Some(n) => Ok(n),
            None => Err(Error::Domain(format!(
                "total sample count (TP + FP + TN + FN) exceeds {}",
                u64::MAX
            ))),
        }
    }
}

/// Two-sided confidence level in `[0.80, 0.99]`.
///
/// Deserialization runs the same bounds check as [`ConfidenceLevel::new`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// Validates and wraps a confidence level.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if `level` is NaN or outside `[0.80, 0.99]`.
    pub fn new(level: f64) -> Result<Self> {
        if level.is_nan() || !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&level) {
            return Err(Error::validation(
                "confidence_level",
                format!("must be within [{MIN_CONFIDENCE}, {MAX_CONFIDENCE}], got {level}"),
            ));
        }
        Ok(Self(level))
    }

    /// The raw level, e.g. `0.95`.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Two-sided critical value z = Φ⁻¹(1 − α/2) with α = 1 − level.
    ///
    /// For 0.95 this is ≈ 1.959964.
    pub fn z_critical(&self) -> f64 {
        let alpha = 1.0 - self.0;
        Normal::standard().inverse_cdf(1.0 - alpha / 2.0)
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self(DEFAULT_CONFIDENCE)
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = Error;

    fn try_from(level: f64) -> Result<Self> {
        Self::new(level)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> f64 {
        level.0
    }
}

/// A closed confidence interval `[lower, upper]`.
///
/// Serialized as a two-element array. Deserialization runs the same checks
/// as [`ConfidenceInterval::try_new`].
///
/// # Invariants
///
/// - `lower <= upper`
/// - Both bounds are finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Creates an interval from bounds the caller has already ordered.
    ///
    /// Unchecked; see [`try_new`](Self::try_new).
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Creates an interval, checking the invariants.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if either bound is not finite or
    /// `lower > upper`.
    pub fn try_new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(Error::validation(
                "confidence_interval",
                format!("bounds must be finite, got [{lower}, {upper}]"),
            ));
        }
        if lower > upper {
            return Err(Error::validation(
                "confidence_interval",
                format!("lower bound exceeds upper bound: [{lower}, {upper}]"),
            ));
        }
        Ok(Self { lower, upper })
    }

    /// `[0, 0]`, the convention for undefined proportions and kappa.
    pub fn degenerate() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Zero-width interval at `value`.
    pub fn point(value: f64) -> Self {
        Self::new(value, value)
    }

    /// `upper - lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether `value` lies within the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl TryFrom<[f64; 2]> for ConfidenceInterval {
    type Error = Error;

    fn try_from([lower, upper]: [f64; 2]) -> Result<Self> {
        Self::try_new(lower, upper)
    }
}

impl From<ConfidenceInterval> for [f64; 2] {
    fn from(ci: ConfidenceInterval) -> Self {
        [ci.lower, ci.upper]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_marginals() {
        let m = ConfusionMatrix::new(85, 5, 90, 10);
        assert_eq!(m.total(), 190);
        assert_eq!(m.condition_positive(), 95);
        assert_eq!(m.condition_negative(), 95);
        assert_eq!(m.predicted_positive(), 90);
        assert_eq!(m.predicted_negative(), 100);
    }

    #[test]
    fn empty_matrix_is_domain_error() {
        let err = ConfusionMatrix::new(0, 0, 0, 0).require_samples().unwrap_err();
        assert!(matches!(err, Error::Domain(_)));
    }

    #[test]
    fn overflowing_total_is_domain_error() {
        let m = ConfusionMatrix::new(u64::MAX, 1, 0, 0);
        assert_eq!(m.checked_total(), None);
        assert!(matches!(m.require_samples(), Err(Error::Domain(_))));

        let max = i64::MAX as u64;
        let m = ConfusionMatrix::new(max, max, max, max);
        assert_eq!(m.checked_total(), None);
        assert!(m.require_samples().is_err());
    }

    #[test]
    fn largest_representable_total() {
        let m = ConfusionMatrix::new(u64::MAX - 3, 1, 1, 1);
        assert_eq!(m.checked_total(), Some(u64::MAX));
        assert_eq!(m.require_samples().expect("fits"), u64::MAX);
    }

    #[test]
    fn confidence_bounds_inclusive() {
        assert!(ConfidenceLevel::new(0.80).is_ok());
        assert!(ConfidenceLevel::new(0.99).is_ok());
        assert!(ConfidenceLevel::new(0.79).is_err());
        assert!(ConfidenceLevel::new(0.995).is_err());
        assert!(ConfidenceLevel::new(f64::NAN).is_err());
        assert!(ConfidenceLevel::new(f64::INFINITY).is_err());
    }

    #[test]
    fn confidence_default_is_95() {
        assert_eq!(ConfidenceLevel::default().value(), 0.95);
    }

    #[test]
    fn z_critical_known_values() {
        let z = |c: f64| ConfidenceLevel::new(c).expect("valid").z_critical();
        assert!((z(0.95) - 1.959_964).abs() < 1e-5, "z = {}", z(0.95));
        assert!((z(0.90) - 1.644_854).abs() < 1e-5, "z = {}", z(0.90));
        assert!((z(0.99) - 2.575_829).abs() < 1e-5, "z = {}", z(0.99));
        assert!((z(0.80) - 1.281_552).abs() < 1e-5, "z = {}", z(0.80));
    }

    #[test]
    fn confidence_deserialize_validates() {
        let ok: ConfidenceLevel = serde_json::from_str("0.9").expect("in range");
        assert_eq!(ok.value(), 0.9);
        assert!(serde_json::from_str::<ConfidenceLevel>("0.5").is_err());
        assert_eq!(serde_json::to_string(&ok).expect("serialize"), "0.9");
    }

    #[test]
    fn interval_serializes_as_pair() {
        let ci = ConfidenceInterval::new(0.25, 0.75);
        let json = serde_json::to_string(&ci).expect("serialize");
        assert_eq!(json, "[0.25,0.75]");
        let back: ConfidenceInterval = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, ci);
        assert!((back.width() - 0.5).abs() < 1e-15);
        assert!(back.contains(0.5));
        assert!(!back.contains(0.8));
    }

    #[test]
    fn interval_deserialize_checks_order() {
        assert!(serde_json::from_str::<ConfidenceInterval>("[0.9, 0.1]").is_err());
        assert!(serde_json::from_str::<ConfidenceInterval>("[0.1, 0.1]").is_ok());
        assert!(ConfidenceInterval::try_new(f64::NAN, 0.5).is_err());
        assert!(ConfidenceInterval::try_new(0.0, f64::INFINITY).is_err());
        assert!(ConfidenceInterval::try_new(-0.2, 0.4).is_ok());
    }

    #[test]
    fn degenerate_interval() {
        let ci = ConfidenceInterval::degenerate();
        assert_eq!((ci.lower, ci.upper), (0.0, 0.0));
        assert_eq!(ConfidenceInterval::point(0.3).width(), 0.0);
    }
}
