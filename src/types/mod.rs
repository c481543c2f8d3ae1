//! Core types for the decision kernel.

pub mod answer;
pub mod dag;
pub mod metadata;
pub mod node;

pub use answer::{Answer, AnswerId};
pub use dag::{Dag, DagId, GraphError};
pub use metadata::{DagMetadata, ValidationStatistics};
pub use node::{Node, NodeId};
