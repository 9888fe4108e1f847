//! Computed experiment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::summary::ComparisonSummary;
use crate::agreement::AgreementResult;
use crate::diagnostic::DiagnosticStats;

/// Statistics for one technique within an experiment.
///
/// The agreement fields serialize flattened next to `stats` as
/// `cohen_kappa`, `cohen_kappa_ci` and `interpretation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueResult {
    pub technique_name: String,
    pub stats: DiagnosticStats,
    #[serde(flatten)]
    pub agreement: AgreementResult,
}

/// A fully computed experiment.
///
/// Created once by the aggregator and never modified; stores persist and
/// return it verbatim, so intervals are never recomputed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub id: Uuid,
    pub experiment_name: String,
    #[serde(default)]
    pub description: String,
    /// UTC time of successful aggregation.
    pub created_at: DateTime<Utc>,
    /// One entry per submitted technique, in submission order.
    pub techniques_results: Vec<TechniqueResult>,
    pub comparison_summary: ComparisonSummary,
}

impl ExperimentResult {
    /// Looks up a technique by name (first match).
    pub fn technique(&self, name: &str) -> Option<&TechniqueResult> {
        self.techniques_results
            .iter()
            .find(|t| t.technique_name == name)
    }
}
