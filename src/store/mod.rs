//! Graph storage tiers.
//!
//! Every tier satisfies the same synchronous [`DagStore`] contract.
//! [`FileDagStore`] persists one JSON document per graph, [`InMemoryDagStore`]
//! serves a lock-guarded map, and [`HybridDagStore`] composes both for
//! memory-speed reads with file durability.

pub mod file;
pub mod hybrid;
pub mod memory;

use crate::types::{Dag, DagId};

/// Error type for store operations.
///
/// Validator findings are never surfaced through this type; they are data,
/// returned in full inside a validation report. Stores fail fast with a
/// classifiable cause instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The identity is absent at the queried tier.
    #[error("dag {0} not found")]
    NotFound(DagId),
    /// The caller asked for something the store refuses: a duplicate
    /// create, an identity-changing update, or a structurally invalid graph.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    /// I/O or (de)serialization failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Read-modify-write transform applied by [`DagStore::update`].
///
/// The transform receives the stored graph by value and returns its
/// replacement; it may fail, and it may not change the graph's identity.
/// `FnMut` rather than `FnOnce` so a tier can hold it behind a trait
/// object and a caller can reuse it across retries.
pub type UpdateFn<'a> = &'a mut dyn FnMut(Dag) -> Result<Dag, StoreError>;

/// Common contract across all storage tiers.
pub trait DagStore: Send + Sync {
    /// All graph identities held by this tier.
    fn list(&self) -> Result<Vec<DagId>, StoreError>;

    /// Fetch a graph by identity.
    fn get(&self, id: DagId) -> Result<Dag, StoreError>;

    /// Store a new graph; refuses an identity that already exists.
    fn create(&self, dag: Dag) -> Result<(), StoreError>;

    /// Atomically read, transform, and write back a graph.
    ///
    /// Returns the updated graph. The transform may not change the
    /// identity; such an update is rejected before anything is persisted.
    fn update(&self, id: DagId, transform: UpdateFn<'_>) -> Result<Dag, StoreError>;

    /// Remove a graph by identity.
    fn delete(&self, id: DagId) -> Result<(), StoreError>;
}

/// Shared identity check for read-modify-write updates.
fn reject_identity_change(original: DagId, updated: DagId) -> Result<(), StoreError> {
    if original != updated {
        return Err(StoreError::InvalidCommand(format!(
            "update cannot change dag id from {original} to {updated}"
        )));
    }
    Ok(())
}

pub use file::FileDagStore;
pub use hybrid::{BulkReport, HybridDagStore, HybridStoreStats};
pub use memory::InMemoryDagStore;
