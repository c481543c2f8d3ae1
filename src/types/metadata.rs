//! Persisted validation metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Aggregate structure statistics produced by validation.
///
/// Counts are always populated, whether or not the graph is valid.
/// `max_depth` stays 0 when the graph has cycles or lacks a unique root:
/// depth is undefined there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStatistics {
    /// Number of nodes in the graph.
    pub total_nodes: usize,
    /// Number of root candidates (nodes unreferenced by any answer).
    pub root_nodes: usize,
    /// Number of leaf nodes (no answers, or all answers terminal).
    pub leaf_nodes: usize,
    /// Number of answers across all nodes.
    pub total_answers: usize,
    /// Maximum depth reached by breadth-first traversal from the root.
    pub max_depth: usize,
    /// Whether the reference graph contains at least one cycle.
    pub has_cycles: bool,
    /// Identities of all root candidates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root_node_ids: Vec<NodeId>,
    /// Identities of all leaf nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub leaf_node_ids: Vec<NodeId>,
    /// One rendered path per detected cycle, first and last entry equal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cycle_paths: Vec<String>,
}

/// Validation outcome persisted alongside a stored graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagMetadata {
    /// Whether the graph passed validation when last checked.
    pub is_valid: bool,
    /// Statistics snapshot from the last validation.
    pub statistics: ValidationStatistics,
    /// When the graph was last validated.
    pub last_validated_at: DateTime<Utc>,
}

impl DagMetadata {
    /// Record a validation outcome taken now.
    pub fn recorded_now(is_valid: bool, statistics: ValidationStatistics) -> Self {
        Self {
            is_valid,
            statistics,
            last_validated_at: Utc::now(),
        }
    }
}
