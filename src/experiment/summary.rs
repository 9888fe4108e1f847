//! Cross-technique comparison.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::result::TechniqueResult;

/// Which technique leads on each headline metric, plus panel averages.
///
/// "Best" is the first technique attaining the maximum, so ties go to the
/// technique listed earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub best_sensitivity: String,
    pub best_specificity: String,
    pub best_accuracy: String,
    pub best_kappa: String,
    pub techniques_count: usize,
    /// Unweighted mean over techniques.
    pub average_sensitivity: f64,
    /// Unweighted mean over techniques.
    pub average_specificity: f64,
    /// Unweighted mean over techniques.
    pub average_accuracy: f64,
}

impl ComparisonSummary {
    /// Summarizes a non-empty slice of technique results.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_results(results: &[TechniqueResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        Some(Self {
            best_sensitivity: first_max(results, |r| r.stats.sensitivity)?,
            best_specificity: first_max(results, |r| r.stats.specificity)?,
            best_accuracy: first_max(results, |r| r.stats.accuracy)?,
            best_kappa: first_max(results, |r| r.agreement.kappa)?,
            techniques_count: results.len(),
            average_sensitivity: results.iter().map(|r| r.stats.sensitivity).mean(),
            average_specificity: results.iter().map(|r| r.stats.specificity).mean(),
            average_accuracy: results.iter().map(|r| r.stats.accuracy).mean(),
        })
    }
}

/// Name of the first result whose key is maximal.
fn first_max(
    results: &[TechniqueResult],
    key: impl Fn(&TechniqueResult) -> f64,
) -> Option<String> {
    let mut iter = results.iter();
    let first = iter.next()?;
    let (best, _) = iter.fold((first, key(first)), |(best, best_value), r| {
        let value = key(r);
        if value > best_value {
            (r, value)
        } else {
            (best, best_value)
        }
    });
    Some(best.technique_name.clone())
}
