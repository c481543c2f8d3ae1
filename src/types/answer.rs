//! Answer types for the decision kernel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use super::node::NodeId;

/// Unique identifier for an answer.
///
/// Wraps a UUID and implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnswerId(Uuid);

impl AnswerId {
    /// Create an AnswerId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random AnswerId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an AnswerId from a UUID string.
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

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for AnswerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A selectable answer attached to a node's question.
///
/// An answer without a `next_node` reference is **terminal**: selecting it
/// ends the traversal. `parent_node` is a non-owning back-reference to the
/// owning node, kept as a lookup key rather than a pointer; it is excluded
/// from the persisted document and restored after every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer identity.
    pub id: AnswerId,
    /// The statement presented to the caller.
    #[serde(rename = "answer")]
    pub statement: String,
    /// Node this answer leads to; `None` marks a terminal answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_node: Option<NodeId>,
    /// Owning node, as a lookup key. Never serialized.
    #[serde(skip)]
    pub parent_node: Option<NodeId>,
    /// Free-form notes captured alongside the selection.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_context: String,
    /// Open key/value bag. Values may be scalars, sequences, or nested maps;
    /// nested containers round-trip as generic JSON values.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Answer {
    /// Create a terminal answer with a fresh identity.
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            id: AnswerId::generate(),
            statement: statement.into(),
            next_node: None,
            parent_node: None,
            user_context: String::new(),
            metadata: Map::new(),
        }
    }

    /// Create an answer leading to another node.
    pub fn leading_to(statement: impl Into<String>, next_node: NodeId) -> Self {
        Self {
            next_node: Some(next_node),
            ..Self::new(statement)
        }
    }

    /// Whether this answer ends the traversal.
    pub fn is_terminal(&self) -> bool {
        self.next_node.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_answer() {
        let answer = Answer::new("Yes");
        assert!(answer.is_terminal());
        assert!(answer.metadata.is_empty());
    }

    #[test]
    fn test_leading_answer() {
        let next = NodeId::generate();
        let answer = Answer::leading_to("No", next);
        assert!(!answer.is_terminal());
        assert_eq!(answer.next_node, Some(next));
    }

    #[test]
    fn test_parent_node_not_serialized() {
        let mut answer = Answer::new("Yes");
        answer.parent_node = Some(NodeId::generate());

        let json = serde_json::to_value(&answer).unwrap();
        assert!(json.get("parent_node").is_none());

        let back: Answer = serde_json::from_value(json).unwrap();
        assert_eq!(back.parent_node, None);
    }

    #[test]
    fn test_statement_wire_name() {
        let answer = Answer::new("Yes");
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["answer"], "Yes");
        assert!(json.get("statement").is_none());
    }
}
