//! Inter-rater agreement between a technique and the reference method.
//!
//! Cohen's kappa over the 2x2 table, its large-sample confidence interval,
//! and the Landis & Koch qualitative bands.
//!
//! # Examples
//!
//! ```
//! use u_diagnostics::agreement::{compute_agreement, KappaInterpretation};
//! use u_diagnostics::matrix::{ConfidenceLevel, ConfusionMatrix};
//!
//! let m = ConfusionMatrix::new(85, 5, 90, 10);
//! let a = compute_agreement(&m, ConfidenceLevel::default());
//! assert!((a.kappa - 0.8421).abs() < 1e-3);
//! assert_eq!(a.interpretation, KappaInterpretation::AlmostPerfect);
//! ```
//!
//! # References
//!
//! - Cohen (1960). "A coefficient of agreement for nominal scales".
//!   Educational and Psychological Measurement, 20, 37–46.
//! - Landis & Koch (1977). "The measurement of observer agreement for
//!   categorical data". Biometrics, 33, 159–174.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matrix::{ConfidenceInterval, ConfidenceLevel, ConfusionMatrix};

/// Qualitative reading of a kappa point estimate.
///
/// Bands have exclusive upper bounds and are ordered from worst to best.
///
/// | kappa | band |
/// |-------|------|
/// | < 0 | [`Poor`](Self::Poor) |
/// | [0, 0.2) | [`Slight`](Self::Slight) |
/// | [0.2, 0.4) | [`Fair`](Self::Fair) |
/// | [0.4, 0.6) | [`Moderate`](Self::Moderate) |
/// | [0.6, 0.8) | [`Substantial`](Self::Substantial) |
/// | ≥ 0.8 | [`AlmostPerfect`](Self::AlmostPerfect) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KappaInterpretation {
    #[serde(rename = "Poor agreement (below chance)")]
    Poor,
    #[serde(rename = "Slight agreement")]
    Slight,
    #[serde(rename = "Fair agreement")]
    Fair,
    #[serde(rename = "Moderate agreement")]
    Moderate,
    #[serde(rename = "Substantial agreement")]
    Substantial,
    #[serde(rename = "Almost perfect agreement")]
    AlmostPerfect,
}

impl KappaInterpretation {
    /// Maps a kappa point estimate to its band.
    pub fn from_kappa(kappa: f64) -> Self {
        if kappa < 0.0 {
            Self::Poor
        } else if kappa < 0.2 {
            Self::Slight
        } else if kappa < 0.4 {
            Self::Fair
        } else if kappa < 0.6 {
            Self::Moderate
        } else if kappa < 0.8 {
            Self::Substantial
        } else {
            Self::AlmostPerfect
        }
    }

    /// Human-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Poor => "Poor agreement (below chance)",
            Self::Slight => "Slight agreement",
            Self::Fair => "Fair agreement",
            Self::Moderate => "Moderate agreement",
            Self::Substantial => "Substantial agreement",
            Self::AlmostPerfect => "Almost perfect agreement",
        }
    }
}

impl fmt::Display for KappaInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cohen's kappa with its confidence interval.
///
/// When either the reference or the technique calls contain a single class,
/// kappa is undefined and reported as `0.0` with a `[0, 0]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgreementResult {
    /// Cohen's kappa in `[-1, 1]`.
    #[serde(rename = "cohen_kappa")]
    pub kappa: f64,
    /// Interval clamped to `[-1, 1]`.
    #[serde(rename = "cohen_kappa_ci")]
    pub kappa_ci: ConfidenceInterval,
    /// Band of the point estimate.
    pub interpretation: KappaInterpretation,
}

impl AgreementResult {
    fn new(kappa: f64, kappa_ci: ConfidenceInterval) -> Self {
        Self {
            kappa,
            kappa_ci,
            interpretation: KappaInterpretation::from_kappa(kappa),
        }
    }

    /// The "agreement undefined" result.
    pub fn undefined() -> Self {
        Self::new(0.0, ConfidenceInterval::degenerate())
    }

    /// Whether the result is the single-class convention rather than a
    /// computed estimate.
    pub fn is_undefined(&self) -> bool {
        self.kappa == 0.0 && self.kappa_ci == ConfidenceInterval::degenerate()
    }
}

/// Computes Cohen's kappa and its confidence interval.
///
/// # Algorithm
///
/// po = (TP + TN) / n
///
/// pe = [(TP + FN)(TP + FP) + (TN + FP)(TN + FN)] / n²
///
/// κ = (po − pe) / (1 − pe), se = √(po(1 − po) / (n(1 − pe)²))
///
/// CI = [max(−1, κ − z·se), min(1, κ + z·se)]
///
/// Never fails: an empty matrix, one whose total overflows `u64`, or a
/// single-class margin yields [`AgreementResult::undefined`].
pub fn compute_agreement(
    matrix: &ConfusionMatrix,
    confidence: ConfidenceLevel,
) -> AgreementResult {
    let total = match matrix.checked_total() {
        Some(0) => return AgreementResult::undefined(),
        Some(n) => n,
        None => {
            debug!("sample count overflows u64, kappa undefined");
            return AgreementResult::undefined();
        }
    };

    let ref_pos = matrix.condition_positive();
    let ref_neg = matrix.condition_negative();
    let pred_pos = matrix.predicted_positive();
    let pred_neg = matrix.predicted_negative();

    if ref_pos == 0 || ref_neg == 0 || pred_pos == 0 || pred_neg == 0 {
        debug!(
            ref_pos,
            ref_neg,
            pred_pos,
            pred_neg,
            "single-class margin, kappa undefined"
        );
        return AgreementResult::undefined();
    }

    let n = total as f64;
    let po = (matrix.true_positive as f64 + matrix.true_negative as f64) / n;
    let pe = (ref_pos as f64 * pred_pos as f64 + ref_neg as f64 * pred_neg as f64) / (n * n);
    let kappa = (po - pe) / (1.0 - pe);

    // Unreachable once both margins hold two classes, kept for rounding.
    if pe >= 1.0 {
        return AgreementResult::new(kappa, ConfidenceInterval::point(kappa));
    }

    let se = (po * (1.0 - po) / (n * (1.0 - pe).powi(2))).sqrt();
    let z = confidence.z_critical();

    AgreementResult::new(
        kappa,
        ConfidenceInterval::new((kappa - z * se).max(-1.0), (kappa + z * se).min(1.0)),
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn matrix() -> impl Strategy<Value = ConfusionMatrix> {
        (0_u64..300, 0_u64..300, 0_u64..300, 0_u64..300)
            .prop_map(|(tp, fp, tn, fn_)| ConfusionMatrix::new(tp, fp, tn, fn_))
    }

    proptest! {
        #[test]
        fn kappa_bounded(m in matrix(), c in 0.80_f64..=0.99) {
            let a = compute_agreement(&m, ConfidenceLevel::new(c).unwrap());
            prop_assert!(a.kappa.is_finite());
            prop_assert!(a.kappa >= -1.0 - 1e-12 && a.kappa <= 1.0 + 1e-12, "kappa = {}", a.kappa);
            prop_assert!(a.kappa_ci.lower <= a.kappa_ci.upper, "{:?}", a.kappa_ci);
            prop_assert!(a.kappa_ci.lower >= -1.0 && a.kappa_ci.upper <= 1.0, "{:?}", a.kappa_ci);
            prop_assert!(
                a.kappa_ci.lower <= a.kappa + 1e-12 && a.kappa <= a.kappa_ci.upper + 1e-12,
                "kappa {} outside {:?}",
                a.kappa,
                a.kappa_ci
            );
            prop_assert_eq!(a.interpretation, KappaInterpretation::from_kappa(a.kappa));
        }

        #[test]
        fn perfect_agreement_gives_one(tp in 1_u64..500, tn in 1_u64..500) {
            let m = ConfusionMatrix::new(tp, 0, tn, 0);
            let a = compute_agreement(&m, ConfidenceLevel::default());
            prop_assert_eq!(a.kappa, 1.0);
        }

        #[test]
        fn kappa_ci_widens_with_confidence(m in matrix()) {
            let narrow = compute_agreement(&m, ConfidenceLevel::new(0.90).unwrap());
            let wide = compute_agreement(&m, ConfidenceLevel::new(0.99).unwrap());
            prop_assert!(wide.kappa_ci.lower <= narrow.kappa_ci.lower);
            prop_assert!(wide.kappa_ci.upper >= narrow.kappa_ci.upper);
        }
    }
}
