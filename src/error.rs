//! Error types.
//!
//! The statistical core only ever fails in two ways: the caller handed in
//! something malformed ([`Error::Validation`]) or the requested quantity is
//! mathematically undefined ([`Error::Domain`]). Degenerate-but-defined
//! cases, such as a zero denominator in a single ratio, are not errors.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the statistical core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed or insufficient input. `field` is a dotted path such as
    /// `techniques[1].matrix.false_negative`.
    #[error("Validation error in `{field}`: {message}")]
    Validation { field: String, message: String },

    /// The computation is undefined for the supplied counts.
    #[error("Domain error: {0}")]
    Domain(String),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true for caller errors that should never be retried.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Result type for the statistical core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by an [`ExperimentStore`](crate::store::ExperimentStore).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No experiment is stored under this id.
    #[error("Experiment not found: {0}")]
    NotFound(Uuid),

    /// An experiment with this id is already stored.
    #[error("Experiment already exists: {0}")]
    Duplicate(Uuid),

    /// A writer panicked while holding the store lock.
    #[error("Experiment store lock poisoned")]
    Poisoned,
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the [`ExperimentService`](crate::service::ExperimentService).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Validation or domain failure while computing the experiment.
    #[error(transparent)]
    Compute(#[from] Error),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// True when the failure was caused by the request rather than by the
    /// store: invalid input, undefined statistics, or an unknown id.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Compute(_) => true,
            Self::Store(StoreError::NotFound(_)) => true,
            Self::Store(_) => false,
        }
    }

    /// True when the requested experiment does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_names_field() {
        let err = Error::validation("techniques[0].matrix.true_positive", "must be >= 0");
        let msg = err.to_string();
        assert!(msg.contains("techniques[0].matrix.true_positive"));
        assert!(msg.contains("must be >= 0"));
        assert!(err.is_validation());
    }

    #[test]
    fn domain_is_not_validation() {
        let err = Error::Domain("total sample count is zero".to_string());
        assert!(!err.is_validation());
        assert!(err.to_string().contains("total sample count is zero"));
    }

    #[test]
    fn service_error_classification() {
        let id = Uuid::new_v4();
        assert!(ServiceError::from(StoreError::NotFound(id)).is_client_error());
        assert!(ServiceError::from(StoreError::NotFound(id)).is_not_found());
        assert!(!ServiceError::from(StoreError::Poisoned).is_client_error());
        assert!(ServiceError::from(Error::Domain("x".into())).is_client_error());
    }

    #[test]
    fn service_error_is_transparent() {
        let inner = Error::validation("experiment_name", "must not be empty");
        let outer = ServiceError::from(inner.clone());
        assert_eq!(outer.to_string(), inner.to_string());
    }
}
