//! Strategy-driven traversal of a validated decision DAG.
//!
//! A walk starts at a node and repeatedly asks a caller-supplied strategy
//! to pick one of the current node's answers, collecting the picks into an
//! ordered decision path until a terminal answer or an answerless node is
//! reached.
//!
//! The walker assumes its input passed the validator. It still bounds
//! itself at one step per node: an acyclic traversal can never take more,
//! so the bound is invisible on validated input and turns an unvalidated
//! cyclic graph into [`WalkError::StepLimitExceeded`] instead of an
//! infinite loop.

use crate::types::{Answer, AnswerId, Dag, Node, NodeId};

/// Error type for traversal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkError {
    /// The current node id does not resolve in this graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    /// The strategy returned an answer that is not one of the current
    /// node's own answers.
    #[error("selected answer {answer} is not valid for node {node}")]
    ForeignAnswer {
        /// The answer the strategy returned.
        answer: AnswerId,
        /// The node whose answers were on offer.
        node: NodeId,
    },
    /// The walk took more steps than the graph has nodes.
    #[error("traversal exceeded {0} steps, the graph was not validated as acyclic")]
    StepLimitExceeded(usize),
    /// The strategy itself failed to produce an answer.
    #[error("answer selection failed: {0}")]
    Selection(String),
}

/// Walk the graph from `start`, selecting one answer per node via `choose`.
///
/// Returns the ordered path of selected answers. The strategy's answer is
/// matched against the current node's own answers by identity; navigation
/// then follows the node's own copy, so a strategy can enrich the returned
/// answer (notes, metadata) but cannot redirect the walk. A node without
/// answers terminates the walk with an empty or partial path and no error.
pub fn walk<F>(dag: &Dag, start: NodeId, mut choose: F) -> Result<Vec<Answer>, WalkError>
where
    F: FnMut(&Node) -> Result<Answer, WalkError>,
{
    let mut path = Vec::new();
    let mut current = start;
    let step_limit = dag.node_count();

    for _ in 0..=step_limit {
        let node = dag
            .node(current)
            .ok_or(WalkError::NodeNotFound(current))?;

        if node.answers.is_empty() {
            return Ok(path);
        }

        let selected = choose(node)?;
        let matched = node.answer(selected.id).ok_or(WalkError::ForeignAnswer {
            answer: selected.id,
            node: current,
        })?;
        let next_node = matched.next_node;

        path.push(selected);

        match next_node {
            None => return Ok(path),
            Some(next) => current = next,
        }
    }

    Err(WalkError::StepLimitExceeded(step_limit))
}

/// Scripted strategy that always picks the first answer in display order.
pub fn first_answer(node: &Node) -> Result<Answer, WalkError> {
    node.answers
        .first()
        .cloned()
        .ok_or_else(|| WalkError::Selection(format!("node {} has no answers", node.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Answer, Node};
    use uuid::Uuid;

    fn node_with_id(id: u128, question: &str) -> Node {
        let mut node = Node::new(question);
        node.id = NodeId::new(Uuid::from_u128(id));
        node
    }

    /// 1 -> 2 -> 3 (leaf), with a terminal branch at each hop.
    fn chain_dag() -> Dag {
        let mut dag = Dag::new("chain");
        let mut n1 = node_with_id(1, "First?");
        n1.push_answer(Answer::leading_to("continue", NodeId::new(Uuid::from_u128(2))));
        n1.push_answer(Answer::new("stop here"));
        let mut n2 = node_with_id(2, "Second?");
        n2.push_answer(Answer::leading_to("continue", NodeId::new(Uuid::from_u128(3))));
        n2.push_answer(Answer::new("stop here"));
        let n3 = node_with_id(3, "Third?");

        dag.insert_node(n1);
        dag.insert_node(n2);
        dag.insert_node(n3);
        dag
    }

    #[test]
    fn test_walk_to_answerless_node() {
        let dag = chain_dag();
        let path = walk(&dag, NodeId::new(Uuid::from_u128(1)), first_answer).unwrap();

        assert_eq!(path.len(), 2);
        assert_eq!(path[0].statement, "continue");
        assert_eq!(path[1].statement, "continue");
    }

    #[test]
    fn test_walk_from_answerless_node_is_empty() {
        let dag = chain_dag();
        let path = walk(&dag, NodeId::new(Uuid::from_u128(3)), first_answer).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_walk_stops_at_terminal_answer() {
        let dag = chain_dag();
        // Pick the terminal branch at the first node.
        let path = walk(&dag, NodeId::new(Uuid::from_u128(1)), |node| {
            Ok(node.answers[1].clone())
        })
        .unwrap();

        assert_eq!(path.len(), 1);
        assert_eq!(path[0].statement, "stop here");
    }

    #[test]
    fn test_walk_unknown_start() {
        let dag = chain_dag();
        let missing = NodeId::new(Uuid::from_u128(99));
        let err = walk(&dag, missing, first_answer).unwrap_err();
        assert_eq!(err, WalkError::NodeNotFound(missing));
    }

    #[test]
    fn test_walk_rejects_foreign_answer() {
        let dag = chain_dag();
        let foreign = Answer::new("not from this node");
        let foreign_id = foreign.id;

        let err = walk(&dag, NodeId::new(Uuid::from_u128(1)), move |_| {
            Ok(foreign.clone())
        })
        .unwrap_err();

        assert_eq!(
            err,
            WalkError::ForeignAnswer {
                answer: foreign_id,
                node: NodeId::new(Uuid::from_u128(1)),
            }
        );
    }

    #[test]
    fn test_walk_propagates_strategy_failure() {
        let dag = chain_dag();
        let err = walk(&dag, NodeId::new(Uuid::from_u128(1)), |_| {
            Err(WalkError::Selection("user aborted".to_string()))
        })
        .unwrap_err();
        assert_eq!(err, WalkError::Selection("user aborted".to_string()));
    }

    #[test]
    fn test_walk_preserves_strategy_enrichment() {
        let dag = chain_dag();
        let path = walk(&dag, NodeId::new(Uuid::from_u128(1)), |node| {
            let mut answer = node.answers[0].clone();
            answer.user_context = "because of the deadline".to_string();
            answer
                .metadata
                .insert("confidence".to_string(), serde_json::json!(0.8));
            Ok(answer)
        })
        .unwrap();

        assert_eq!(path[0].user_context, "because of the deadline");
        assert_eq!(path[0].metadata["confidence"], serde_json::json!(0.8));
    }

    #[test]
    fn test_walk_bounds_unvalidated_cycle() {
        let mut dag = Dag::new("cycle");
        let a = NodeId::new(Uuid::from_u128(1));
        let b = NodeId::new(Uuid::from_u128(2));
        let mut na = node_with_id(1, "A?");
        na.push_answer(Answer::leading_to("to b", b));
        let mut nb = node_with_id(2, "B?");
        nb.push_answer(Answer::leading_to("to a", a));
        dag.insert_node(na);
        dag.insert_node(nb);

        let err = walk(&dag, a, first_answer).unwrap_err();
        assert_eq!(err, WalkError::StepLimitExceeded(2));
    }

    #[test]
    fn test_walk_navigates_by_node_answer_not_strategy_copy() {
        let dag = chain_dag();
        // A tampering strategy returns a matching id but a redirected
        // next_node; the walk must follow the node's own edge.
        let path = walk(&dag, NodeId::new(Uuid::from_u128(1)), |node| {
            let mut answer = node.answers[0].clone();
            answer.next_node = Some(NodeId::new(Uuid::from_u128(99)));
            Ok(answer)
        });

        // Node 99 does not exist; if the walk followed the tampered copy it
        // would fail with NodeNotFound(99). It terminates normally instead.
        assert!(path.is_ok());
        assert_eq!(path.unwrap().len(), 2);
    }
}
