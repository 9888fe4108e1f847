//! Experiment persistence boundary.
//!
//! [`ExperimentStore`] is what a service layer persists computed
//! experiments through. Results are stored and returned verbatim.
//! [`InMemoryExperimentStore`] backs tests and single-process embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::experiment::ExperimentResult;

/// Storage for computed experiments.
///
/// No update operation: experiments are immutable once computed.
pub trait ExperimentStore: Send + Sync {
    /// Stores a new experiment.
    fn insert(&self, experiment: ExperimentResult) -> StoreResult<()>;

    /// Fetches an experiment by id.
    fn get(&self, id: Uuid) -> StoreResult<ExperimentResult>;

    /// Up to `limit` experiments, newest `created_at` first.
    fn list(&self, limit: usize) -> StoreResult<Vec<ExperimentResult>>;

    /// Removes an experiment, failing with [`StoreError::NotFound`] if absent.
    fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// Number of stored experiments.
    fn len(&self) -> StoreResult<usize>;

    /// Whether the store is empty.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// A store backed by a `HashMap` behind an `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryExperimentStore {
    experiments: RwLock<HashMap<Uuid, ExperimentResult>>,
}

impl InMemoryExperimentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExperimentStore for InMemoryExperimentStore {
    fn insert(&self, experiment: ExperimentResult) -> StoreResult<()> {
        let mut experiments = self.experiments.write().map_err(|_| StoreError::Poisoned)?;
        if experiments.contains_key(&experiment.id) {
            return Err(StoreError::Duplicate(experiment.id));
        }
        debug!(id = %experiment.id, "storing experiment");
        experiments.insert(experiment.id, experiment);
        Ok(())
    }

    fn get(&self, id: Uuid) -> StoreResult<ExperimentResult> {
        let experiments = self.experiments.read().map_err(|_| StoreError::Poisoned)?;
        experiments.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn list(&self, limit: usize) -> StoreResult<Vec<ExperimentResult>> {
        let experiments = self.experiments.read().map_err(|_| StoreError::Poisoned)?;
        let mut all: Vec<_> = experiments.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        all.truncate(limit);
        Ok(all)
    }

    fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut experiments = self.experiments.write().map_err(|_| StoreError::Poisoned)?;
        experiments
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn len(&self) -> StoreResult<usize> {
        let experiments = self.experiments.read().map_err(|_| StoreError::Poisoned)?;
        Ok(experiments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{aggregate, TechniqueSample};
    use crate::matrix::{ConfidenceLevel, ConfusionMatrix};
    use chrono::Duration;
    use std::sync::Arc;

    fn experiment(name: &str) -> ExperimentResult {
        let c = ConfidenceLevel::default();
        let techniques = [
            TechniqueSample::new("qPCR", ConfusionMatrix::new(85, 5, 90, 10), c).unwrap(),
            TechniqueSample::new("RPA", ConfusionMatrix::new(80, 8, 87, 15), c).unwrap(),
        ];
        aggregate(name, "", &techniques, 2).expect("should aggregate")
    }

    #[test]
    fn insert_and_get_verbatim() {
        let store = InMemoryExperimentStore::new();
        let exp = experiment("a");
        store.insert(exp.clone()).expect("insert");
        assert_eq!(store.get(exp.id).expect("present"), exp);
        assert_eq!(store.len().expect("len"), 1);
        assert!(!store.is_empty().expect("is_empty"));
    }

    #[test]
    fn duplicate_insert_rejected() {
        let store = InMemoryExperimentStore::new();
        let exp = experiment("a");
        store.insert(exp.clone()).expect("insert");
        assert_eq!(store.insert(exp.clone()), Err(StoreError::Duplicate(exp.id)));
    }

    #[test]
    fn get_unknown_is_not_found() {
        let store = InMemoryExperimentStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.get(id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn list_newest_first_with_limit() {
        let store = InMemoryExperimentStore::new();
        let base = experiment("base").created_at;
        for (i, name) in ["old", "mid", "new"].iter().enumerate() {
            let mut exp = experiment(name);
            exp.created_at = base + Duration::seconds(i as i64);
            store.insert(exp).expect("insert");
        }
        let names: Vec<_> = store
            .list(10)
            .expect("list")
            .into_iter()
            .map(|e| e.experiment_name)
            .collect();
        assert_eq!(names, ["new", "mid", "old"]);
        assert_eq!(store.list(2).expect("list").len(), 2);
    }

    #[test]
    fn delete_then_not_found() {
        let store = InMemoryExperimentStore::new();
        let exp = experiment("a");
        store.insert(exp.clone()).expect("insert");
        store.delete(exp.id).expect("delete");
        assert_eq!(store.delete(exp.id), Err(StoreError::NotFound(exp.id)));
        assert!(store.is_empty().expect("is_empty"));
    }

    #[test]
    fn concurrent_inserts() {
        let store = Arc::new(InMemoryExperimentStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.insert(experiment(&format!("e{i}"))))
            })
            .collect();
        for h in handles {
            h.join().expect("thread").expect("insert");
        }
        assert_eq!(store.len().expect("len"), 8);
    }
}
