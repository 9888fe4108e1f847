//! Experiment input: wire-shaped requests and their validated form.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::matrix::{ConfidenceLevel, ConfusionMatrix};

/// One technique, validated and ready for computation.
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueSample {
    name: String,
    matrix: ConfusionMatrix,
    confidence: ConfidenceLevel,
}

impl TechniqueSample {
    /// Creates a sample.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if `name` is empty or whitespace.
    pub fn new(
        name: impl Into<String>,
        matrix: ConfusionMatrix,
        confidence: ConfidenceLevel,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::validation("technique_name", "must not be empty"));
        }
        Ok(Self {
            name,
            matrix,
            confidence,
        })
    }

    /// Technique name, e.g. `"qPCR"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Confusion matrix against the reference method.
    pub fn matrix(&self) -> &ConfusionMatrix {
        &self.matrix
    }

    /// Confidence level for every interval of this technique.
    pub fn confidence(&self) -> ConfidenceLevel {
        self.confidence
    }
}

/// Raw confusion-matrix counts as submitted.
///
/// Counts are signed so that negative values reach validation with a field
/// name instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixInput {
    pub true_positive: i64,
    pub false_positive: i64,
    pub true_negative: i64,
    pub false_negative: i64,
}

impl MatrixInput {
    /// Converts to a [`ConfusionMatrix`], naming the first negative count.
    ///
    /// `path` prefixes the reported field, e.g. `techniques[0].matrix`. A
    /// matrix whose total overflows `u64` is reported against `path` itself.
    pub fn to_matrix(&self, path: &str) -> Result<ConfusionMatrix> {
        let count = |name: &str, value: i64| {
            u64::try_from(value).map_err(|_| {
                Error::validation(format!("{path}.{name}"), format!("must be >= 0, got {value}"))
            })
        };
        let matrix = ConfusionMatrix::new(
            count("true_positive", self.true_positive)?,
            count("false_positive", self.false_positive)?,
            count("true_negative", self.true_negative)?,
            count("false_negative", self.false_negative)?,
        );
        if matrix.checked_total().is_none() {
            return Err(Error::validation(
                path,
                format!("total sample count exceeds {}", u64::MAX),
            ));
        }
        Ok(matrix)
    }
}

impl From<ConfusionMatrix> for MatrixInput {
    fn from(m: ConfusionMatrix) -> Self {
        let signed = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        Self {
            true_positive: signed(m.true_positive),
            false_positive: signed(m.false_positive),
            true_negative: signed(m.true_negative),
            false_negative: signed(m.false_negative),
        }
    }
}

/// One technique as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueInput {
    /// Technique name, e.g. qPCR, RPA, LAMP.
    pub technique_name: String,
    pub matrix: MatrixInput,
    /// Falls back to [`EngineConfig::default_confidence`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<f64>,
}

impl TechniqueInput {
    /// Creates an input with the default confidence level.
    pub fn new(name: impl Into<String>, matrix: impl Into<MatrixInput>) -> Self {
        Self {
            technique_name: name.into(),
            matrix: matrix.into(),
            confidence_level: None,
        }
    }

    /// Sets the confidence level.
    pub fn with_confidence(mut self, level: f64) -> Self {
        self.confidence_level = Some(level);
        self
    }

    fn validate(&self, index: usize, fallback: ConfidenceLevel) -> Result<TechniqueSample> {
        let path = format!("techniques[{index}]");
        if self.technique_name.trim().is_empty() {
            return Err(Error::validation(
                format!("{path}.technique_name"),
                "must not be empty",
            ));
        }
        let matrix = self.matrix.to_matrix(&format!("{path}.matrix"))?;
        let confidence = match self.confidence_level {
            None => fallback,
            Some(level) => ConfidenceLevel::new(level).map_err(|err| match err {
                Error::Validation { message, .. } => {
                    Error::validation(format!("{path}.confidence_level"), message)
                }
                other => other,
            })?,
        };
        TechniqueSample::new(self.technique_name.clone(), matrix, confidence)
    }
}

/// An experiment as submitted by a collaborator.
///
/// # Examples
///
/// ```
/// use u_diagnostics::config::EngineConfig;
/// use u_diagnostics::experiment::ExperimentRequest;
///
/// let json = r#"{
///     "experiment_name": "qPCR vs RPA",
///     "techniques": [
///         {"technique_name": "qPCR",
///          "matrix": {"true_positive": 85, "false_positive": 5,
///                     "true_negative": 90, "false_negative": 10}},
///         {"technique_name": "RPA",
///          "matrix": {"true_positive": 80, "false_positive": 8,
///                     "true_negative": 87, "false_negative": 15},
///          "confidence_level": 0.9}
///     ]
/// }"#;
/// let request: ExperimentRequest = serde_json::from_str(json).unwrap();
/// let validated = request.validate(&EngineConfig::default()).unwrap();
/// assert_eq!(validated.techniques.len(), 2);
/// assert_eq!(validated.techniques[0].confidence().value(), 0.95);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRequest {
    pub experiment_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub techniques: Vec<TechniqueInput>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedExperiment {
    pub name: String,
    pub description: String,
    pub techniques: Vec<TechniqueSample>,
}

impl ExperimentRequest {
    /// Creates a request with no description.
    pub fn new(name: impl Into<String>, techniques: Vec<TechniqueInput>) -> Self {
        Self {
            experiment_name: name.into(),
            description: None,
            techniques,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates the request in field order and stops at the first problem.
    ///
    /// Checks: experiment name non-empty, at least `config.min_techniques`
    /// techniques, then per technique a non-empty name, non-negative
    /// counts, and a confidence level in `[0.80, 0.99]`.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] naming the offending field.
    pub fn validate(&self, config: &EngineConfig) -> Result<ValidatedExperiment> {
        if self.experiment_name.trim().is_empty() {
            return Err(Error::validation("experiment_name", "must not be empty"));
        }
        check_technique_count(self.techniques.len(), config.min_techniques)?;

        let fallback = config.confidence()?;
        let techniques = self
            .techniques
            .iter()
            .enumerate()
            .map(|(i, t)| t.validate(i, fallback))
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidatedExperiment {
            name: self.experiment_name.clone(),
            description: self.description.clone().unwrap_or_default(),
            techniques,
        })
    }
}

pub(crate) fn check_technique_count(count: usize, min_count: usize) -> Result<()> {
    if count < min_count {
        return Err(Error::validation(
            "techniques",
            format!("at least {min_count} techniques are required, got {count}"),
        ));
    }
    Ok(())
}
