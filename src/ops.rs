//! Commands over a storage tier.
//!
//! This is the layer that decides whether a structurally invalid graph is
//! rejected outright: validator findings stay data inside the report, and
//! only here do they fold into a [`StoreError::InvalidCommand`].

use std::sync::Arc;

use crate::store::{DagStore, StoreError};
use crate::types::{Dag, DagId, DagMetadata};
use crate::validator::{DagValidator, ValidationReport};

/// Graph commands bound to a storage tier.
#[derive(Clone)]
pub struct DagOps {
    store: Arc<dyn DagStore>,
    validator: DagValidator,
}

impl DagOps {
    /// Bind commands to a store.
    pub fn new(store: Arc<dyn DagStore>) -> Self {
        Self {
            store,
            validator: DagValidator::new(),
        }
    }

    /// Fetch a graph.
    pub fn get(&self, id: DagId) -> Result<Dag, StoreError> {
        self.store.get(id)
    }

    /// List all graph identities.
    pub fn list(&self) -> Result<Vec<DagId>, StoreError> {
        self.store.list()
    }

    /// Store a new graph, rejecting one the validator finds invalid.
    pub fn create(&self, dag: Dag) -> Result<(), StoreError> {
        self.reject_invalid(&dag)?;
        self.store.create(dag)
    }

    /// Replace a stored graph wholesale.
    ///
    /// The payload must carry the target identity and must validate; either
    /// failure is an [`StoreError::InvalidCommand`] and nothing is written.
    pub fn update(&self, id: DagId, dag: Dag) -> Result<Dag, StoreError> {
        if dag.id != id {
            return Err(StoreError::InvalidCommand(format!(
                "payload id {} does not match target id {id}",
                dag.id
            )));
        }
        self.reject_invalid(&dag)?;

        self.store.update(id, &mut |_| Ok(dag.clone()))
    }

    /// Remove a graph.
    pub fn delete(&self, id: DagId) -> Result<(), StoreError> {
        self.store.delete(id)
    }

    /// Validate a stored graph and persist the outcome on its metadata.
    ///
    /// The full report is returned either way; an invalid graph stays
    /// stored, with `metadata.is_valid` recording the verdict.
    pub fn validate_stored(&self, id: DagId) -> Result<ValidationReport, StoreError> {
        let dag = self.store.get(id)?;
        let report = self.validator.validate(Some(&dag));

        tracing::info!(
            dag_id = %id,
            is_valid = report.is_valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated stored graph"
        );

        let metadata = DagMetadata::recorded_now(report.is_valid, report.statistics.clone());
        self.store.update(id, &mut |mut dag| {
            dag.metadata = Some(metadata.clone());
            Ok(dag)
        })?;

        Ok(report)
    }

    fn reject_invalid(&self, dag: &Dag) -> Result<(), StoreError> {
        let report = self.validator.validate(Some(dag));
        if !report.is_valid {
            return Err(StoreError::InvalidCommand(format!(
                "graph validation failed: {}",
                report.error_summary()
            )));
        }
        Ok(())
    }
}
