//! # decision-kernel
//!
//! Validated storage and deterministic traversal for question/answer
//! decision DAGs.
//!
//! A caller defines a graph of question nodes whose answers either lead to
//! another node or terminate the walk. The kernel keeps that graph honest
//! and durable:
//!
//! 1. **Validate**: one structural pass accumulating every finding
//!    (single root, acyclicity, referential integrity) plus depth and leaf
//!    statistics.
//! 2. **Traverse**: walk a validated graph from its root with a
//!    caller-supplied answer-selection strategy, producing an ordered
//!    decision path.
//! 3. **Persist**: a two-tier repository (memory + file) serving reads at
//!    memory speed while mirroring writes to durable storage.
//!
//! ## Architecture
//!
//! ```text
//! DagOps ──> DagValidator
//!    │
//!    └────> DagStore (Hybrid = InMemory + File)
//!
//! walk(dag, start, strategy) ──> Vec<Answer>
//! ```
//!
//! ## Consistency
//!
//! With write-through enabled, the hybrid tier mutates memory first and
//! mirrors to file; a file failure rolls the memory mutation back, so an
//! error means neither tier changed. Bulk load and sync are instead
//! partial-failure tolerant: corrupt documents are logged and skipped.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod logging;
pub mod ops;
pub mod store;
pub mod types;
pub mod validator;
pub mod walker;

// Re-exports
pub use ops::DagOps;
pub use store::{
    BulkReport, DagStore, FileDagStore, HybridDagStore, HybridStoreStats, InMemoryDagStore,
    StoreError,
};
pub use types::{
    Answer, AnswerId, Dag, DagId, DagMetadata, GraphError, Node, NodeId, ValidationStatistics,
};
pub use validator::{
    DagValidator, ValidationCode, ValidationError, ValidationReport, ValidationWarning,
};
pub use walker::{first_answer, walk, WalkError};
