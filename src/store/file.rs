//! File-backed graph store.

use std::fs;
use std::path::{Path, PathBuf};

use super::{reject_identity_change, DagStore, StoreError, UpdateFn};
use crate::types::{Dag, DagId};

const DAG_FILE_EXTENSION: &str = "json";

/// File-backed graph store: one serialized document per graph, named by
/// its identity, in a single directory.
///
/// Updates are read-modify-write without any locking; concurrent writers
/// to the same identity interleave and the last write wins.
#[derive(Debug, Clone)]
pub struct FileDagStore {
    root: PathBuf,
}

impl FileDagStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory does not need to exist yet; it is created on the
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this store reads and writes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, id: DagId) -> PathBuf {
        self.root.join(format!("{id}.{DAG_FILE_EXTENSION}"))
    }

    fn write_document(&self, path: &Path, dag: &Dag) -> Result<(), StoreError> {
        let data = serde_json::to_vec(dag)?;
        fs::write(path, data)
            .map_err(|e| StoreError::Internal(format!("error writing {}: {e}", path.display())))
    }
}

impl DagStore for FileDagStore {
    /// Scan the directory for identity-named documents.
    ///
    /// Subdirectories, foreign extensions, and malformed names are
    /// silently skipped rather than failing the scan.
    fn list(&self) -> Result<Vec<DagId>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            StoreError::Internal(format!("error reading {}: {e}", self.root.display()))
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StoreError::Internal(format!("error reading entry: {e}")))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(DAG_FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(id) = DagId::parse(stem) {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn get(&self, id: DagId) -> Result<Dag, StoreError> {
        let path = self.document_path(id);
        // An unreadable document means the identity is absent at this tier.
        let data = fs::read(&path).map_err(|_| StoreError::NotFound(id))?;

        serde_json::from_slice(&data).map_err(|e| {
            StoreError::Internal(format!("error parsing {}: {e}", path.display()))
        })
    }

    fn create(&self, dag: Dag) -> Result<(), StoreError> {
        let path = self.document_path(dag.id);
        if path.exists() {
            return Err(StoreError::InvalidCommand(format!(
                "dag {} already exists",
                dag.id
            )));
        }

        fs::create_dir_all(&self.root).map_err(|e| {
            StoreError::Internal(format!("error creating {}: {e}", self.root.display()))
        })?;

        self.write_document(&path, &dag)
    }

    fn update(&self, id: DagId, transform: UpdateFn<'_>) -> Result<Dag, StoreError> {
        let existing = self.get(id)?;

        let updated = transform(existing)?;
        reject_identity_change(id, updated.id)?;

        self.write_document(&self.document_path(id), &updated)?;
        Ok(updated)
    }

    fn delete(&self, id: DagId) -> Result<(), StoreError> {
        let path = self.document_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id));
        }

        fs::remove_file(&path)
            .map_err(|e| StoreError::Internal(format!("error deleting {}: {e}", path.display())))
    }
}
