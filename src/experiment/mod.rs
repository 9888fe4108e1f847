//! Multi-technique experiments.
//!
//! An experiment compares two or more amplification techniques (qPCR, RPA,
//! LAMP, ...) against the same reference method. Each technique is run
//! through the diagnostic and agreement calculators, then the results are
//! summarized across techniques.
//!
//! # Flow
//!
//! - [`ExperimentRequest`] — wire-shaped input, validated into
//!   [`ValidatedExperiment`] / [`TechniqueSample`]
//! - [`aggregate`] / [`ExperimentAggregator`] — computes every technique,
//!   atomically
//! - [`ExperimentResult`] — immutable output with a [`ComparisonSummary`]

mod aggregator;
mod input;
mod result;
mod summary;

pub use aggregator::{aggregate, compute_technique, ExperimentAggregator};
pub use input::{
    ExperimentRequest, MatrixInput, TechniqueInput, TechniqueSample, ValidatedExperiment,
};
pub use result::{ExperimentResult, TechniqueResult};
pub use summary::ComparisonSummary;
