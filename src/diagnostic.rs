//! Diagnostic accuracy metrics.
//!
//! Point estimates (sensitivity, specificity, PPV, NPV, accuracy,
//! prevalence) from a 2x2 confusion matrix, with Wilson score confidence
//! intervals for the four conditional proportions.
//!
//! # Examples
//!
//! ```
//! use u_diagnostics::diagnostic::compute_diagnostic_stats;
//! use u_diagnostics::matrix::{ConfidenceLevel, ConfusionMatrix};
//!
//! let m = ConfusionMatrix::new(85, 5, 90, 10);
//! let s = compute_diagnostic_stats(&m, ConfidenceLevel::default()).unwrap();
//! assert!((s.sensitivity - 85.0 / 95.0).abs() < 1e-12);
//! assert!(s.sensitivity_ci.contains(s.sensitivity));
//! ```
//!
//! # References
//!
//! - Wilson (1927). "Probable inference, the law of succession, and
//!   statistical inference". JASA, 22, 209–212.
//! - Newcombe (1998). "Two-sided confidence intervals for the single
//!   proportion: comparison of seven methods". Statistics in Medicine, 17,
//!   857–872.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matrix::{ConfidenceInterval, ConfidenceLevel, ConfusionMatrix};

/// Diagnostic accuracy of one technique against the reference method.
///
/// All proportions lie in `[0, 1]`. A proportion whose denominator is zero
/// is reported as `0.0` with a `[0, 0]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticStats {
    /// TP / (TP + FN).
    pub sensitivity: f64,
    /// TN / (TN + FP).
    pub specificity: f64,
    /// Positive predictive value, TP / (TP + FP).
    pub ppv: f64,
    /// Negative predictive value, TN / (TN + FN).
    pub npv: f64,
    /// (TP + TN) / total.
    pub accuracy: f64,
    /// (TP + FN) / total.
    pub prevalence: f64,
    /// Wilson interval for sensitivity.
    pub sensitivity_ci: ConfidenceInterval,
    /// Wilson interval for specificity.
    pub specificity_ci: ConfidenceInterval,
    /// Wilson interval for PPV.
    pub ppv_ci: ConfidenceInterval,
    /// Wilson interval for NPV.
    pub npv_ci: ConfidenceInterval,
}

/// Computes point estimates and Wilson intervals for a confusion matrix.
///
/// # Errors
///
/// [`Error::Domain`](crate::error::Error::Domain) if the matrix total is zero
/// or overflows `u64`.
pub fn compute_diagnostic_stats(
    matrix: &ConfusionMatrix,
    confidence: ConfidenceLevel,
) -> Result<DiagnosticStats> {
    let total = matrix.require_samples()?;
    let z = confidence.z_critical();

    let tp = matrix.true_positive;
    let tn = matrix.true_negative;

    let sens = (tp, matrix.condition_positive());
    let spec = (tn, matrix.condition_negative());
    let ppv = (tp, matrix.predicted_positive());
    let npv = (tn, matrix.predicted_negative());

    Ok(DiagnosticStats {
        sensitivity: ratio(sens.0, sens.1),
        specificity: ratio(spec.0, spec.1),
        ppv: ratio(ppv.0, ppv.1),
        npv: ratio(npv.0, npv.1),
        accuracy: ratio(tp + tn, total),
        prevalence: ratio(matrix.condition_positive(), total),
        sensitivity_ci: wilson_interval(sens.0, sens.1, z),
        specificity_ci: wilson_interval(spec.0, spec.1, z),
        ppv_ci: wilson_interval(ppv.0, ppv.1, z),
        npv_ci: wilson_interval(npv.0, npv.1, z),
    })
}

/// Wilson score interval for `x` successes out of `n` trials.
///
/// # Algorithm
///
/// p = x/n, d = 1 + z²/n
///
/// centre = (p + z²/2n) / d, half = (z/d)·√(p(1−p)/n + z²/4n²)
///
/// Bounds are clamped to `[0, 1]`. `n == 0` yields `[0, 0]`.
///
/// # Examples
///
/// ```
/// use u_diagnostics::diagnostic::wilson_interval;
///
/// let ci = wilson_interval(80, 100, 1.959964);
/// assert!((ci.lower - 0.7112).abs() < 1e-3);
/// assert!((ci.upper - 0.8666).abs() < 1e-3);
/// ```
pub fn wilson_interval(x: u64, n: u64, z: f64) -> ConfidenceInterval {
    if n == 0 {
        return ConfidenceInterval::degenerate();
    }
    let nf = n as f64;
    let p = x as f64 / nf;
    let z2 = z * z;

    let denominator = 1.0 + z2 / nf;
    let centre = (p + z2 / (2.0 * nf)) / denominator;
    let half_width = (z / denominator) * (p * (1.0 - p) / nf + z2 / (4.0 * nf * nf)).sqrt();

    ConfidenceInterval::new(
        (centre - half_width).max(0.0),
        (centre + half_width).min(1.0),
    )
}

/// x / n, or 0 when n is zero.
fn ratio(x: u64, n: u64) -> f64 {
    if n == 0 {
        0.0
    } else {
        x as f64 / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn level(c: f64) -> ConfidenceLevel {
        ConfidenceLevel::new(c).expect("valid confidence")
    }

    // -----------------------------------------------------------------------
    // Point estimates
    // -----------------------------------------------------------------------

    #[test]
    fn qpcr_panel_point_estimates() {
        let m = ConfusionMatrix::new(85, 5, 90, 10);
        let s = compute_diagnostic_stats(&m, level(0.95)).expect("should compute");
        assert!((s.sensitivity - 0.894_736_842).abs() < 1e-8, "sens = {}", s.sensitivity);
        assert!((s.specificity - 0.947_368_421).abs() < 1e-8, "spec = {}", s.specificity);
        assert!((s.accuracy - 0.921_052_631).abs() < 1e-8, "acc = {}", s.accuracy);
        assert!((s.ppv - 85.0 / 90.0).abs() < 1e-12);
        assert!((s.npv - 0.9).abs() < 1e-12);
        assert!((s.prevalence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn all_negative_panel_uses_zero_convention() {
        let m = ConfusionMatrix::new(0, 0, 10, 0);
        let s = compute_diagnostic_stats(&m, level(0.95)).expect("should compute");
        assert_eq!(s.sensitivity, 0.0);
        assert_eq!(s.sensitivity_ci, ConfidenceInterval::degenerate());
        assert_eq!(s.ppv, 0.0);
        assert_eq!(s.ppv_ci, ConfidenceInterval::degenerate());
        assert_eq!(s.specificity, 1.0);
        assert_eq!(s.npv, 1.0);
        assert_eq!(s.accuracy, 1.0);
        assert_eq!(s.prevalence, 0.0);
    }

    #[test]
    fn zero_total_is_domain_error() {
        let m = ConfusionMatrix::new(0, 0, 0, 0);
        let err = compute_diagnostic_stats(&m, level(0.95)).unwrap_err();
        assert!(matches!(err, Error::Domain(_)));
    }

    #[test]
    fn overflowing_total_is_domain_error() {
        // Four counts of i64::MAX sum past u64::MAX.
        let max = i64::MAX as u64;
        let m = ConfusionMatrix::new(max, max, max, max);
        let err = compute_diagnostic_stats(&m, level(0.95)).unwrap_err();
        assert!(matches!(err, Error::Domain(_)));
    }

    #[test]
    fn huge_counts_keep_proportions() {
        let half = u64::MAX / 4;
        let m = ConfusionMatrix::new(half, half, half, half);
        let stats = compute_diagnostic_stats(&m, level(0.95)).expect("total fits");
        assert!((stats.accuracy - 0.5).abs() < 1e-12);
        assert!((stats.prevalence - 0.5).abs() < 1e-12);
    }

    // -----------------------------------------------------------------------
    // Wilson interval
    // -----------------------------------------------------------------------

    #[test]
    fn wilson_known_value() {
        // 80/100 at 95%: [0.7112, 0.8666] (Newcombe 1998, method 3)
        let ci = wilson_interval(80, 100, level(0.95).z_critical());
        assert!((ci.lower - 0.711_2).abs() < 1e-3, "lower = {}", ci.lower);
        assert!((ci.upper - 0.866_6).abs() < 1e-3, "upper = {}", ci.upper);
    }

    #[test]
    fn wilson_empty_sample() {
        assert_eq!(wilson_interval(0, 0, 1.96), ConfidenceInterval::degenerate());
    }

    #[test]
    fn wilson_extremes_stay_in_unit_interval() {
        let z = level(0.99).z_critical();
        let zero = wilson_interval(0, 5, z);
        assert!(zero.lower >= 0.0 && zero.lower < 1e-12, "lower = {}", zero.lower);
        assert!(zero.upper > 0.0 && zero.upper < 1.0);

        let all = wilson_interval(5, 5, z);
        assert!(all.upper <= 1.0 && all.upper > 1.0 - 1e-12, "upper = {}", all.upper);
        assert!(all.lower > 0.0 && all.lower < 1.0);
    }

    #[test]
    fn wilson_symmetric_in_complement() {
        let z = level(0.95).z_critical();
        let a = wilson_interval(3, 20, z);
        let b = wilson_interval(17, 20, z);
        assert!((a.lower - (1.0 - b.upper)).abs() < 1e-12);
        assert!((a.upper - (1.0 - b.lower)).abs() < 1e-12);
    }

    #[test]
    fn wider_confidence_gives_wider_interval() {
        let m = ConfusionMatrix::new(85, 5, 90, 10);
        let narrow = compute_diagnostic_stats(&m, level(0.90)).expect("should compute");
        let wide = compute_diagnostic_stats(&m, level(0.99)).expect("should compute");
        assert!(wide.sensitivity_ci.width() > narrow.sensitivity_ci.width());
        assert!(wide.specificity_ci.width() > narrow.specificity_ci.width());
        assert!(wide.ppv_ci.width() > narrow.ppv_ci.width());
        assert!(wide.npv_ci.width() > narrow.npv_ci.width());
    }
}
