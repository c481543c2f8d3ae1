//! In-memory graph store.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{reject_identity_change, DagStore, StoreError, UpdateFn};
use crate::types::{Dag, DagId};

/// In-memory graph store guarded by a single reader/writer lock.
///
/// Reads take the read lock and run in parallel; mutations take the write
/// lock and serialize against each other, store-wide rather than per graph.
/// Uses a BTreeMap so listings come out in deterministic id order.
#[derive(Debug, Default)]
pub struct InMemoryDagStore {
    dags: RwLock<BTreeMap<DagId, Dag>>,
}

impl InMemoryDagStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of graphs held.
    pub fn len(&self) -> usize {
        self.dags.read().len()
    }

    /// Whether the store holds no graphs.
    pub fn is_empty(&self) -> bool {
        self.dags.read().is_empty()
    }
}

impl DagStore for InMemoryDagStore {
    fn list(&self) -> Result<Vec<DagId>, StoreError> {
        Ok(self.dags.read().keys().copied().collect())
    }

    fn get(&self, id: DagId) -> Result<Dag, StoreError> {
        self.dags
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn create(&self, dag: Dag) -> Result<(), StoreError> {
        let mut dags = self.dags.write();
        if dags.contains_key(&dag.id) {
            return Err(StoreError::InvalidCommand(format!(
                "dag {} already exists",
                dag.id
            )));
        }
        dags.insert(dag.id, dag);
        Ok(())
    }

    fn update(&self, id: DagId, transform: UpdateFn<'_>) -> Result<Dag, StoreError> {
        let mut dags = self.dags.write();
        let existing = dags.get(&id).ok_or(StoreError::NotFound(id))?;

        let updated = transform(existing.clone())?;
        reject_identity_change(id, updated.id)?;

        dags.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete(&self, id: DagId) -> Result<(), StoreError> {
        match self.dags.write().remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }
}
