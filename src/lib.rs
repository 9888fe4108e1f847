//! # u-diagnostics
//!
//! Diagnostic-accuracy statistics for comparing nucleic-acid amplification
//! techniques (qPCR, RPA, LAMP, ...) against a reference method.
//!
//! Each technique is summarized by a 2x2 confusion matrix. From it the
//! crate derives sensitivity, specificity, predictive values, accuracy and
//! prevalence with Wilson score intervals, plus Cohen's kappa with its
//! confidence interval, and compares techniques within an experiment.
//!
//! ## Modules
//!
//! - [`matrix`] — Confusion matrix, confidence level, interval type
//! - [`diagnostic`] — Sensitivity, specificity, PPV, NPV, accuracy, prevalence, Wilson CIs
//! - [`agreement`] — Cohen's kappa, kappa CI, Landis & Koch interpretation
//! - [`experiment`] — Request validation, aggregation, comparison summary
//! - [`store`] — Persistence boundary and in-memory store
//! - [`service`] — Create/get/list/delete over aggregator and store
//! - [`config`] — Engine configuration
//! - [`error`] — Error types
//!
//! ## Design Philosophy
//!
//! - **Pure core**: calculators are free functions with no shared state,
//!   safe to call concurrently
//! - **Defined degeneracy**: zero denominators give `0` and `[0, 0]`;
//!   only an empty matrix is an error
//! - **Atomic experiments**: an experiment is computed completely or not at all
//!
//! ## Example
//!
//! ```
//! use u_diagnostics::experiment::{aggregate, TechniqueSample};
//! use u_diagnostics::matrix::{ConfidenceLevel, ConfusionMatrix};
//!
//! let c = ConfidenceLevel::new(0.95).unwrap();
//! let techniques = [
//!     TechniqueSample::new("qPCR", ConfusionMatrix::new(85, 5, 90, 10), c).unwrap(),
//!     TechniqueSample::new("RPA", ConfusionMatrix::new(80, 8, 87, 15), c).unwrap(),
//! ];
//! let result = aggregate("qPCR vs RPA", "", &techniques, 2).unwrap();
//! let qpcr = &result.techniques_results[0];
//! assert!((qpcr.stats.accuracy - 175.0 / 190.0).abs() < 1e-12);
//! assert_eq!(result.comparison_summary.best_kappa, "qPCR");
//! ```

pub mod agreement;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod experiment;
pub mod matrix;
pub mod service;
pub mod store;

pub use error::{Error, Result};
