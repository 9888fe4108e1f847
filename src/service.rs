//! Create/read/list/delete orchestration over the aggregator and a store.
//!
//! This is the layer a transport (HTTP, CLI, FFI) calls into. It owns no
//! statistics: requests are validated, handed to the
//! [`ExperimentAggregator`], and the result is persisted verbatim.
//!
//! # Examples
//!
//! ```
//! use u_diagnostics::config::EngineConfig;
//! use u_diagnostics::experiment::{ExperimentRequest, TechniqueInput};
//! use u_diagnostics::matrix::ConfusionMatrix;
//! use u_diagnostics::service::ExperimentService;
//! use u_diagnostics::store::InMemoryExperimentStore;
//!
//! let service =
//!     ExperimentService::new(EngineConfig::default(), InMemoryExperimentStore::new()).unwrap();
//! let request = ExperimentRequest::new(
//!     "qPCR vs LAMP",
//!     vec![
//!         TechniqueInput::new("qPCR", ConfusionMatrix::new(85, 5, 90, 10)),
//!         TechniqueInput::new("LAMP", ConfusionMatrix::new(78, 12, 83, 17)),
//!     ],
//! );
//! let created = service.create(&request).unwrap();
//! assert_eq!(service.get(created.id).unwrap(), created);
//! service.delete(created.id).unwrap();
//! assert!(service.get(created.id).unwrap_err().is_not_found());
//! ```

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::ServiceError;
use crate::experiment::{ExperimentAggregator, ExperimentRequest, ExperimentResult};
use crate::store::ExperimentStore;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Experiment lifecycle: create, get, list, delete.
#[derive(Debug)]
pub struct ExperimentService<S> {
    aggregator: ExperimentAggregator,
    store: S,
}

impl<S: ExperimentStore> ExperimentService<S> {
    /// Creates a service over `store`.
    ///
    /// Fails if `config` does not pass [`EngineConfig::validate`].
    ///
    /// # Errors
    ///
    /// [`Error::Validation`](crate::error::Error::Validation) naming the
    /// offending setting.
    pub fn new(config: EngineConfig, store: S) -> crate::Result<Self> {
        Ok(Self {
            aggregator: ExperimentAggregator::new(config)?,
            store,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        self.aggregator.config()
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates, computes and stores an experiment.
    ///
    /// Nothing is stored unless every technique computed successfully.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Compute`] for validation or domain failures
    /// - [`ServiceError::Store`] if persisting fails
    pub fn create(&self, request: &ExperimentRequest) -> ServiceResult<ExperimentResult> {
        let result = request
            .validate(self.config())
            .and_then(|validated| self.aggregator.aggregate_validated(validated))
            .inspect_err(|err| {
                warn!(experiment = %request.experiment_name, error = %err, "experiment rejected")
            })?;

        self.store.insert(result.clone())?;
        info!(
            id = %result.id,
            experiment = %result.experiment_name,
            techniques = result.techniques_results.len(),
            "experiment created"
        );
        Ok(result)
    }

    /// Fetches a stored experiment.
    pub fn get(&self, id: Uuid) -> ServiceResult<ExperimentResult> {
        Ok(self.store.get(id)?)
    }

    /// Newest experiments first, at most [`EngineConfig::list_limit`].
    pub fn list(&self) -> ServiceResult<Vec<ExperimentResult>> {
        Ok(self.store.list(self.config().list_limit)?)
    }

    /// Deletes a stored experiment.
    pub fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.store.delete(id)?;
        info!(%id, "experiment deleted");
        Ok(())
    }
}
