//! Engine configuration.
//!
//! # Examples
//!
//! ```
//! use u_diagnostics::config::EngineConfig;
//!
//! let config = EngineConfig::default().with_min_techniques(3);
//! assert_eq!(config.min_techniques, 3);
//! assert_eq!(config.default_confidence, 0.95);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::{ConfidenceLevel, DEFAULT_CONFIDENCE, MAX_CONFIDENCE, MIN_CONFIDENCE};

/// Smallest accepted [`EngineConfig::min_techniques`]: a comparison needs
/// two techniques.
pub const MIN_TECHNIQUES: usize = 2;

/// Environment variable overriding [`EngineConfig::min_techniques`].
pub const ENV_MIN_TECHNIQUES: &str = "DIAG_MIN_TECHNIQUES";
/// Environment variable overriding [`EngineConfig::default_confidence`].
pub const ENV_DEFAULT_CONFIDENCE: &str = "DIAG_DEFAULT_CONFIDENCE";
/// Environment variable overriding [`EngineConfig::list_limit`].
pub const ENV_LIST_LIMIT: &str = "DIAG_LIST_LIMIT";

/// Tunables for experiment validation, aggregation and listing.
///
/// Deserialization and the `with_*` builders do not check values;
/// [`ExperimentAggregator::new`](crate::experiment::ExperimentAggregator::new)
/// and [`ExperimentService::new`](crate::service::ExperimentService::new)
/// run [`validate`](Self::validate) before accepting a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum number of techniques an experiment must compare.
    #[serde(default = "default_min_techniques")]
    pub min_techniques: usize,
    /// Confidence level applied when a technique does not specify one.
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,
    /// Maximum number of experiments returned by a list call.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_min_techniques() -> usize {
    MIN_TECHNIQUES
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

fn default_list_limit() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_techniques: default_min_techniques(),
            default_confidence: default_confidence(),
            list_limit: default_list_limit(),
        }
    }
}

impl EngineConfig {
    /// Set the minimum technique count.
    pub fn with_min_techniques(mut self, min_techniques: usize) -> Self {
        self.min_techniques = min_techniques;
        self
    }

    /// Set the fallback confidence level.
    pub fn with_default_confidence(mut self, confidence: f64) -> Self {
        self.default_confidence = confidence;
        self
    }

    /// Set the list limit.
    pub fn with_list_limit(mut self, list_limit: usize) -> Self {
        self.list_limit = list_limit;
        self
    }

    /// The fallback confidence level, validated.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if `default_confidence` is outside `[0.80, 0.99]`.
    pub fn confidence(&self) -> Result<ConfidenceLevel> {
        let level = self.default_confidence;
        ConfidenceLevel::new(level).map_err(|_| {
            Error::validation(
                "default_confidence",
                format!("must be within [{MIN_CONFIDENCE}, {MAX_CONFIDENCE}], got {level}"),
            )
        })
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.min_techniques < MIN_TECHNIQUES {
            return Err(Error::validation(
                "min_techniques",
                format!("must be at least {MIN_TECHNIQUES}, got {}", self.min_techniques),
            ));
        }
        if self.list_limit == 0 {
            return Err(Error::validation("list_limit", "must be at least 1"));
        }
        self.confidence().map(|_| ())
    }

    /// Create from environment variables.
    ///
    /// Reads:
    /// - `DIAG_MIN_TECHNIQUES` (optional, default 2)
    /// - `DIAG_DEFAULT_CONFIDENCE` (optional, default 0.95)
    /// - `DIAG_LIST_LIMIT` (optional, default 100)
    ///
    /// A variable that is set but unparsable is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MIN_TECHNIQUES) {
            config.min_techniques = parse_var(ENV_MIN_TECHNIQUES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEFAULT_CONFIDENCE) {
            config.default_confidence = parse_var(ENV_DEFAULT_CONFIDENCE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LIST_LIMIT) {
            config.list_limit = parse_var(ENV_LIST_LIMIT, &raw)?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::validation(key, format!("cannot parse {raw:?}")))
}
