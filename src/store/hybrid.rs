//! Hybrid graph store: in-memory reads, file durability.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{DagStore, FileDagStore, InMemoryDagStore, StoreError, UpdateFn};
use crate::types::{Dag, DagId};

/// Outcome of a bulk load or sync.
///
/// Bulk operations are partial-failure tolerant: one corrupt document must
/// not block the rest of the fleet, so per-item failures are logged and
/// counted rather than propagated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReport {
    /// Items the operation attempted.
    pub attempted: usize,
    /// Items applied successfully.
    pub succeeded: usize,
    /// Items skipped after an individual failure.
    pub skipped: usize,
}

/// Snapshot of the two tiers, for operational diagnosis of drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridStoreStats {
    /// Graphs held in memory.
    pub memory_count: usize,
    /// Documents present on disk.
    pub file_count: usize,
    /// Whether writes are mirrored to file synchronously.
    pub write_through: bool,
}

/// Two-tier store composing [`FileDagStore`] and [`InMemoryDagStore`].
///
/// Reads always come from memory. With write-through enabled, every write
/// mutates memory first and then mirrors to file; when the file leg fails
/// the memory mutation is rolled back, so a returned error means neither
/// tier changed. With write-through disabled, writes stay in memory until
/// [`HybridDagStore::sync`] pushes them to disk.
pub struct HybridDagStore {
    file: FileDagStore,
    memory: InMemoryDagStore,
    write_through: bool,
}

impl HybridDagStore {
    /// Create a hybrid store over the given document directory.
    pub fn new(root: impl Into<PathBuf>, write_through: bool) -> Self {
        Self {
            file: FileDagStore::new(root),
            memory: InMemoryDagStore::new(),
            write_through,
        }
    }

    /// Load every document on disk into memory.
    ///
    /// Run once at startup. Documents that fail to parse or insert are
    /// logged and skipped; only a failing directory scan is an error.
    pub fn initialize(&self) -> Result<BulkReport, StoreError> {
        tracing::info!("initializing hybrid store, loading documents into memory");

        let ids = self.file.list()?;
        let mut report = BulkReport {
            attempted: ids.len(),
            ..BulkReport::default()
        };

        for id in ids {
            let dag = match self.file.get(id) {
                Ok(dag) => dag,
                Err(e) => {
                    tracing::warn!(dag_id = %id, error = %e, "failed to load document, skipping");
                    report.skipped += 1;
                    continue;
                }
            };
            if let Err(e) = self.memory.create(dag) {
                tracing::warn!(dag_id = %id, error = %e, "failed to insert into memory, skipping");
                report.skipped += 1;
                continue;
            }
            report.succeeded += 1;
        }

        tracing::info!(
            found = report.attempted,
            loaded = report.succeeded,
            skipped = report.skipped,
            "hybrid store initialization complete"
        );
        Ok(report)
    }

    /// Push every graph in memory to disk, creating or updating as needed.
    ///
    /// Individual failures are logged and skipped, same as
    /// [`HybridDagStore::initialize`].
    pub fn sync(&self) -> Result<BulkReport, StoreError> {
        tracing::info!("syncing in-memory graphs to disk");

        let ids = self.memory.list()?;
        let mut report = BulkReport {
            attempted: ids.len(),
            ..BulkReport::default()
        };

        for id in ids {
            let dag = match self.memory.get(id) {
                Ok(dag) => dag,
                Err(e) => {
                    tracing::warn!(dag_id = %id, error = %e, "graph vanished from memory during sync");
                    report.skipped += 1;
                    continue;
                }
            };

            let outcome = if self.file.get(id).is_ok() {
                self.file.update(id, &mut |_| Ok(dag.clone())).map(|_| ())
            } else {
                self.file.create(dag)
            };

            if let Err(e) = outcome {
                tracing::warn!(dag_id = %id, error = %e, "failed to sync graph to disk");
                report.skipped += 1;
                continue;
            }
            report.succeeded += 1;
        }

        tracing::info!(
            total = report.attempted,
            synced = report.succeeded,
            skipped = report.skipped,
            "sync complete"
        );
        Ok(report)
    }

    /// Counts per tier plus the write-through mode.
    pub fn stats(&self) -> Result<HybridStoreStats, StoreError> {
        Ok(HybridStoreStats {
            memory_count: self.memory.list()?.len(),
            file_count: self.file.list()?.len(),
            write_through: self.write_through,
        })
    }
}

impl DagStore for HybridDagStore {
    fn list(&self) -> Result<Vec<DagId>, StoreError> {
        self.memory.list()
    }

    fn get(&self, id: DagId) -> Result<Dag, StoreError> {
        self.memory.get(id)
    }

    fn create(&self, dag: Dag) -> Result<(), StoreError> {
        let id = dag.id;
        self.memory.create(dag.clone())?;

        if !self.write_through {
            tracing::debug!(dag_id = %id, "graph created in memory, write-through disabled");
            return Ok(());
        }

        if let Err(e) = self.file.create(dag) {
            // Roll the memory insert back so both tiers stay consistent.
            if let Err(rollback) = self.memory.delete(id) {
                tracing::error!(dag_id = %id, error = %rollback, "rollback of memory create failed");
            }
            return Err(e);
        }

        tracing::debug!(dag_id = %id, "graph created in memory and on disk");
        Ok(())
    }

    fn update(&self, id: DagId, transform: UpdateFn<'_>) -> Result<Dag, StoreError> {
        // Snapshot before mutating so a failed file leg can be undone.
        let snapshot = if self.write_through {
            Some(self.memory.get(id)?)
        } else {
            None
        };

        let updated = self.memory.update(id, transform)?;

        let Some(snapshot) = snapshot else {
            tracing::debug!(dag_id = %id, "graph updated in memory, write-through disabled");
            return Ok(updated);
        };

        // Mirror the memory result to disk rather than re-running the
        // transform, so the two tiers cannot diverge on its output.
        if let Err(e) = self.file.update(id, &mut |_| Ok(updated.clone())) {
            if let Err(rollback) = self.memory.update(id, &mut |_| Ok(snapshot.clone())) {
                tracing::error!(dag_id = %id, error = %rollback, "rollback of memory update failed");
            }
            return Err(e);
        }

        tracing::debug!(dag_id = %id, "graph updated in memory and on disk");
        Ok(updated)
    }

    fn delete(&self, id: DagId) -> Result<(), StoreError> {
        let snapshot = if self.write_through {
            Some(self.memory.get(id)?)
        } else {
            None
        };

        self.memory.delete(id)?;

        let Some(snapshot) = snapshot else {
            tracing::debug!(dag_id = %id, "graph deleted from memory, write-through disabled");
            return Ok(());
        };

        if let Err(e) = self.file.delete(id) {
            if let Err(rollback) = self.memory.create(snapshot) {
                tracing::error!(dag_id = %id, error = %rollback, "rollback of memory delete failed");
            }
            return Err(e);
        }

        tracing::debug!(dag_id = %id, "graph deleted from memory and disk");
        Ok(())
    }
}
