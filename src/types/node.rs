//! Node types for the decision kernel.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::answer::{Answer, AnswerId};

/// Unique identifier for a node in the decision DAG.
///
/// Wraps a UUID and implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a NodeId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random NodeId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a NodeId from a UUID string.
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

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A question node in the decision DAG.
///
/// Answers keep their declaration order; it is the display and selection
/// order seen by traversal strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node identity.
    pub id: NodeId,
    /// The question posed at this node.
    pub question: String,
    /// Ordered answers to the question.
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Node {
    /// Create a node with a fresh identity and no answers.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            question: question.into(),
            answers: Vec::new(),
        }
    }

    /// Append an answer, restoring its parent back-reference to this node.
    pub fn push_answer(&mut self, mut answer: Answer) {
        answer.parent_node = Some(self.id);
        self.answers.push(answer);
    }

    /// Append an answer, builder style.
    pub fn with_answer(mut self, answer: Answer) -> Self {
        self.push_answer(answer);
        self
    }

    /// Look up one of this node's answers by identity.
    pub fn answer(&self, id: AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == id)
    }

    /// A node is a leaf if it has no answers, or all its answers are terminal.
    pub fn is_leaf(&self) -> bool {
        self.answers.iter().all(Answer::is_terminal)
    }
}
