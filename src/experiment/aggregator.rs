//! Experiment aggregation: per-technique statistics folded into one result.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::input::{check_technique_count, TechniqueSample, ValidatedExperiment};
use super::result::{ExperimentResult, TechniqueResult};
use super::summary::ComparisonSummary;
use crate::agreement::compute_agreement;
use crate::config::EngineConfig;
use crate::diagnostic::compute_diagnostic_stats;
use crate::error::{Error, Result};

/// Computes the full statistics of one technique.
///
/// # Errors
///
/// [`Error::Domain`] if the technique's matrix total is zero.
pub fn compute_technique(sample: &TechniqueSample) -> Result<TechniqueResult> {
    let stats = compute_diagnostic_stats(sample.matrix(), sample.confidence())?;
    let agreement = compute_agreement(sample.matrix(), sample.confidence());
    debug!(
        technique = sample.name(),
        sensitivity = stats.sensitivity,
        specificity = stats.specificity,
        kappa = agreement.kappa,
        "technique computed"
    );
    Ok(TechniqueResult {
        technique_name: sample.name().to_string(),
        stats,
        agreement,
    })
}

/// Aggregates techniques into an [`ExperimentResult`].
///
/// All-or-nothing: the first failing technique aborts the aggregation and
/// no partial result is returned. The creation timestamp is taken after
/// every technique succeeded.
///
/// # Errors
///
/// - [`Error::Validation`] if fewer than `min_count` techniques are given.
/// - [`Error::Domain`] if any technique's matrix total is zero.
///
/// # Examples
///
/// ```
/// use u_diagnostics::experiment::{aggregate, TechniqueSample};
/// use u_diagnostics::matrix::{ConfidenceLevel, ConfusionMatrix};
///
/// let c = ConfidenceLevel::default();
/// let techniques = vec![
///     TechniqueSample::new("qPCR", ConfusionMatrix::new(85, 5, 90, 10), c).unwrap(),
///     TechniqueSample::new("RPA", ConfusionMatrix::new(80, 8, 87, 15), c).unwrap(),
/// ];
/// let result = aggregate("qPCR vs RPA", "", &techniques, 2).unwrap();
/// assert_eq!(result.techniques_results.len(), 2);
/// assert_eq!(result.comparison_summary.best_accuracy, "qPCR");
/// ```
pub fn aggregate(
    name: impl Into<String>,
    description: impl Into<String>,
    techniques: &[TechniqueSample],
    min_count: usize,
) -> Result<ExperimentResult> {
    let name = name.into();
    check_technique_count(techniques.len(), min_count)?;

    let techniques_results = techniques
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            compute_technique(sample).map_err(|err| match err {
                Error::Domain(reason) => {
                    Error::Domain(format!("technique {i} ({}): {reason}", sample.name()))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()
        .inspect_err(|err| warn!(experiment = %name, error = %err, "aggregation failed"))?;

    let comparison_summary = ComparisonSummary::from_results(&techniques_results)
        .ok_or_else(|| Error::validation("techniques", "at least one technique is required"))?;

    Ok(ExperimentResult {
        id: Uuid::new_v4(),
        experiment_name: name,
        description: description.into(),
        created_at: Utc::now(),
        techniques_results,
        comparison_summary,
    })
}

/// Stateless aggregator bound to an [`EngineConfig`].
///
/// Holds no mutable state; one instance can be shared across threads or a
/// fresh one built per call.
#[derive(Debug, Clone, Default)]
pub struct ExperimentAggregator {
    config: EngineConfig,
}

impl ExperimentAggregator {
    /// Creates an aggregator after validating `config`.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] naming the offending setting, see
    /// [`EngineConfig::validate`].
    pub fn new(config: EngineConfig) -> Result<Self> {
        config
            .validate()
            .inspect_err(|err| warn!(error = %err, "engine configuration rejected"))?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Aggregates with the configured minimum technique count.
    pub fn aggregate(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        techniques: &[TechniqueSample],
    ) -> Result<ExperimentResult> {
        aggregate(name, description, techniques, self.config.min_techniques)
    }

    /// Aggregates a validated request.
    pub fn aggregate_validated(&self, experiment: ValidatedExperiment) -> Result<ExperimentResult> {
        self.aggregate(experiment.name, experiment.description, &experiment.techniques)
    }
}
