//! The decision DAG aggregate.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

use super::answer::Answer;
use super::metadata::DagMetadata;
use super::node::{Node, NodeId};

/// Unique identifier for a decision DAG.
///
/// Wraps a UUID and implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DagId(Uuid);

impl DagId {
    /// Create a DagId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random DagId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a DagId from a UUID string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Whether this is the all-zero UUID.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for DagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DagId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Error type for direct graph lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The requested node is not part of this graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    /// No node is unreferenced; a cycle is hiding the root.
    #[error("no root node found")]
    NoRoot,
    /// More than one node is unreferenced.
    #[error("multiple root nodes found, expected exactly one (got {0})")]
    MultipleRoots(usize),
}

/// A question/answer decision DAG.
///
/// Nodes are keyed by their identity; the key must equal the node's own id
/// (checked by the validator, not enforced here). Iteration order is the
/// `NodeId` order, so renderings and listings are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DagDocument", into = "DagDocument")]
pub struct Dag {
    /// Graph identity.
    pub id: DagId,
    /// Human title.
    pub title: String,
    /// Nodes keyed by identity.
    pub nodes: BTreeMap<NodeId, Node>,
    /// Validation snapshot, present once the stored graph has been validated.
    pub metadata: Option<DagMetadata>,
}

impl Dag {
    /// Create an empty graph with a fresh identity.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: DagId::generate(),
            title: title.into(),
            nodes: BTreeMap::new(),
            metadata: None,
        }
    }

    /// Insert a node, restoring the parent back-reference on its answers.
    pub fn insert_node(&mut self, mut node: Node) {
        for answer in &mut node.answers {
            answer.parent_node = Some(node.id);
        }
        self.nodes.insert(node.id, node);
    }

    /// Look up a node by identity.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of answers across all nodes.
    pub fn answer_count(&self) -> usize {
        self.nodes.values().map(|n| n.answers.len()).sum()
    }

    /// The set of node ids referenced by any answer's `next_node`.
    pub fn referenced_nodes(&self) -> BTreeSet<NodeId> {
        self.nodes
            .values()
            .flat_map(|n| n.answers.iter().filter_map(|a| a.next_node))
            .collect()
    }

    /// Nodes unreferenced by any answer, in id order.
    ///
    /// A well-formed graph has exactly one: the root.
    pub fn root_candidates(&self) -> Vec<NodeId> {
        let referenced = self.referenced_nodes();
        self.nodes
            .keys()
            .copied()
            .filter(|id| !referenced.contains(id))
            .collect()
    }

    /// The unique root node.
    ///
    /// Fails when no node is unreferenced (a cycle consumed every node) or
    /// when more than one is (a forest, not a tree).
    pub fn root_node(&self) -> Result<&Node, GraphError> {
        let candidates = self.root_candidates();
        match candidates.as_slice() {
            [] => Err(GraphError::NoRoot),
            [root] => self.node(*root).ok_or(GraphError::NodeNotFound(*root)),
            many => Err(GraphError::MultipleRoots(many.len())),
        }
    }
}

impl fmt::Display for Dag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes.values() {
            writeln!(f, "Question: {}", node.question)?;
            for answer in &node.answers {
                write!(f, "\tAnswer: {}", answer.statement)?;
                match answer.next_node {
                    Some(next) => match self.node(next) {
                        Some(next_node) => writeln!(f, " -> {}", next_node.question)?,
                        None => writeln!(f, " -> [MISSING: {next}]")?,
                    },
                    None => writeln!(f, " -> [LEAF]")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Wire shape of a persisted graph document.
///
/// `nodes` is an array on disk and an id-keyed map in memory; the
/// conversion restores every answer's parent back-reference on load and
/// flattens the map back on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DagDocument {
    id: DagId,
    title: String,
    nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<DagMetadata>,
}

impl From<DagDocument> for Dag {
    fn from(doc: DagDocument) -> Self {
        let mut dag = Dag {
            id: doc.id,
            title: doc.title,
            nodes: BTreeMap::new(),
            metadata: doc.metadata,
        };
        for node in doc.nodes {
            dag.insert_node(node);
        }
        dag
    }
}

impl From<Dag> for DagDocument {
    fn from(dag: Dag) -> Self {
        Self {
            id: dag.id,
            title: dag.title,
            nodes: dag.nodes.into_values().collect(),
            metadata: dag.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Answer;

    fn two_node_dag() -> (Dag, NodeId, NodeId) {
        let mut dag = Dag::new("test");
        let child = Node::new("Child question");
        let child_id = child.id;
        let root = Node::new("Root question").with_answer(Answer::leading_to("Go to child", child_id));
        let root_id = root.id;
        dag.insert_node(root);
        dag.insert_node(child);
        (dag, root_id, child_id)
    }

    #[test]
    fn test_new_dag_is_empty() {
        let dag = Dag::new("empty");
        assert_eq!(dag.node_count(), 0);
        assert!(!dag.id.is_nil());
        assert!(dag.metadata.is_none());
    }

    #[test]
    fn test_node_lookup() {
        let (dag, root_id, _) = two_node_dag();
        assert!(dag.node(root_id).is_some());
        assert!(dag.node(NodeId::generate()).is_none());
    }

    #[test]
    fn test_root_node_single() {
        let (dag, root_id, _) = two_node_dag();
        let root = dag.root_node().unwrap();
        assert_eq!(root.id, root_id);
    }

    #[test]
    fn test_root_node_multiple() {
        let mut dag = Dag::new("forest");
        dag.insert_node(Node::new("First"));
        dag.insert_node(Node::new("Second"));
        assert_eq!(dag.root_node(), Err(GraphError::MultipleRoots(2)));
    }

    #[test]
    fn test_root_node_none_when_cyclic() {
        let mut dag = Dag::new("cycle");
        let a = NodeId::generate();
        let b = NodeId::generate();
        let mut node_a = Node::new("A");
        node_a.id = a;
        node_a.push_answer(Answer::leading_to("to b", b));
        let mut node_b = Node::new("B");
        node_b.id = b;
        node_b.push_answer(Answer::leading_to("to a", a));
        dag.insert_node(node_a);
        dag.insert_node(node_b);

        assert_eq!(dag.root_node(), Err(GraphError::NoRoot));
    }

    #[test]
    fn test_document_nodes_are_an_array() {
        let (dag, _, _) = two_node_dag();
        let json = serde_json::to_value(&dag).unwrap();
        assert!(json["nodes"].is_array());
        assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["title"], "test");
    }

    #[test]
    fn test_load_restores_parent_references() {
        let (dag, root_id, child_id) = two_node_dag();
        let json = serde_json::to_string(&dag).unwrap();
        let back: Dag = serde_json::from_str(&json).unwrap();

        let root = back.node(root_id).unwrap();
        assert_eq!(root.answers[0].parent_node, Some(root_id));
        assert!(back.node(child_id).is_some());
        assert_eq!(back, dag);
    }

    #[test]
    fn test_display_marks_leaves() {
        let (dag, _, _) = two_node_dag();
        let rendered = dag.to_string();
        assert!(rendered.contains("Question: Root question"));
        assert!(rendered.contains("-> Child question"));
    }

    #[test]
    fn test_display_marks_missing_references() {
        let mut dag = Dag::new("broken");
        let root =
            Node::new("Root").with_answer(Answer::leading_to("dangling", NodeId::generate()));
        dag.insert_node(root);
        assert!(dag.to_string().contains("[MISSING:"));
    }
}
