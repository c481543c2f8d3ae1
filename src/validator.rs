//! Structural validation for decision DAGs.
//!
//! The validator is a pure function over a graph. It never fails for
//! structural problems: every finding is accumulated into one report so a
//! caller can fix all of them from a single pass. An absent graph is itself
//! a finding, not a panic or an error return.
//!
//! ## Check order
//!
//! 1. Basic structure: nil id, empty title, zero nodes
//! 2. Per-node/answer integrity: key mismatch, empty question, nil answer
//!    id, empty statement, dangling `next_node`
//! 3. Root detection: the complement of the referenced-id set
//! 4. Cycle detection: DFS with an on-stack set, one recorded path per cycle
//! 5. Statistics: totals always; depth only for acyclic single-root graphs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{AnswerId, Dag, NodeId, ValidationStatistics};

/// Machine-readable code attached to every validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// No graph was supplied at all.
    DagMissing,
    /// The graph id is the nil UUID.
    DagInvalidId,
    /// The graph title is empty.
    DagEmptyTitle,
    /// The graph contains no nodes.
    DagNoNodes,
    /// A node-map key differs from the node's own id.
    NodeIdMismatch,
    /// A node's question is empty.
    NodeEmptyQuestion,
    /// An answer carries the nil UUID as its id.
    AnswerInvalidId,
    /// An answer's statement is empty.
    AnswerEmptyStatement,
    /// An answer references a node that does not exist.
    AnswerInvalidReference,
    /// No node is unreferenced; a cycle is hiding the root.
    DagNoRoot,
    /// More than one node is unreferenced.
    DagMultipleRoots,
    /// The reference graph contains at least one cycle.
    DagHasCycles,
    /// Two answers of one node target the same next node.
    DuplicateNextNode,
}

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Finding code.
    pub code: ValidationCode,
    /// Human-readable description.
    pub message: String,
    /// Offending node, when the finding is node-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// Offending answer, when the finding is answer-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<AnswerId>,
}

/// A single validation warning. Warnings never affect validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Finding code.
    pub code: ValidationCode,
    /// Human-readable description.
    pub message: String,
    /// Offending node, when the finding is node-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// Offending answer, when the finding is answer-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<AnswerId>,
}

/// Full validation outcome: findings plus structure statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the graph passed every error-level check.
    pub is_valid: bool,
    /// All accumulated errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    /// All accumulated warnings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
    /// Structure statistics, populated regardless of validity.
    pub statistics: ValidationStatistics,
}

impl ValidationReport {
    fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            statistics: ValidationStatistics::default(),
        }
    }

    fn push_error(&mut self, error: ValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// All error messages joined into one line, for surfacing as a single
    /// rejection reason.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Structural validator for decision DAGs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagValidator;

impl DagValidator {
    /// Create a validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate a graph, accumulating every finding into one report.
    ///
    /// `None` yields a report with a single [`ValidationCode::DagMissing`]
    /// error; nothing else is checked in that case.
    pub fn validate(&self, dag: Option<&Dag>) -> ValidationReport {
        let mut report = ValidationReport::valid();

        let Some(dag) = dag else {
            report.push_error(ValidationError {
                code: ValidationCode::DagMissing,
                message: "no graph supplied".to_string(),
                node_id: None,
                answer_id: None,
            });
            return report;
        };

        self.check_basic_structure(dag, &mut report);
        self.check_nodes(dag, &mut report);
        self.check_root(dag, &mut report);
        self.check_cycles(dag, &mut report);
        self.collect_statistics(dag, &mut report);

        report
    }

    /// Quick check returning only the boolean validity.
    pub fn is_valid(&self, dag: Option<&Dag>) -> bool {
        self.validate(dag).is_valid
    }

    fn check_basic_structure(&self, dag: &Dag, report: &mut ValidationReport) {
        if dag.id.is_nil() {
            report.push_error(ValidationError {
                code: ValidationCode::DagInvalidId,
                message: "graph id cannot be the nil UUID".to_string(),
                node_id: None,
                answer_id: None,
            });
        }

        if dag.title.is_empty() {
            report.push_error(ValidationError {
                code: ValidationCode::DagEmptyTitle,
                message: "graph title cannot be empty".to_string(),
                node_id: None,
                answer_id: None,
            });
        }

        if dag.nodes.is_empty() {
            report.push_error(ValidationError {
                code: ValidationCode::DagNoNodes,
                message: "graph must contain at least one node".to_string(),
                node_id: None,
                answer_id: None,
            });
        }
    }

    fn check_nodes(&self, dag: &Dag, report: &mut ValidationReport) {
        for (&key, node) in &dag.nodes {
            if key != node.id {
                report.push_error(ValidationError {
                    code: ValidationCode::NodeIdMismatch,
                    message: format!("node map key {key} does not match node id {}", node.id),
                    node_id: Some(node.id),
                    answer_id: None,
                });
            }

            if node.question.is_empty() {
                report.push_error(ValidationError {
                    code: ValidationCode::NodeEmptyQuestion,
                    message: format!("node {} must have a non-empty question", node.id),
                    node_id: Some(node.id),
                    answer_id: None,
                });
            }

            self.check_answers(dag, node.id, report);
        }
    }

    fn check_answers(&self, dag: &Dag, node_id: NodeId, report: &mut ValidationReport) {
        let Some(node) = dag.node(node_id) else {
            return;
        };

        let mut seen_targets: BTreeMap<NodeId, AnswerId> = BTreeMap::new();

        for (position, answer) in node.answers.iter().enumerate() {
            if answer.id.is_nil() {
                report.push_error(ValidationError {
                    code: ValidationCode::AnswerInvalidId,
                    message: format!("answer {position} in node {node_id} must have a valid id"),
                    node_id: Some(node_id),
                    answer_id: None,
                });
            }

            if answer.statement.is_empty() {
                report.push_error(ValidationError {
                    code: ValidationCode::AnswerEmptyStatement,
                    message: format!(
                        "answer {} in node {node_id} must have a non-empty statement",
                        answer.id
                    ),
                    node_id: Some(node_id),
                    answer_id: Some(answer.id),
                });
            }

            let Some(target) = answer.next_node else {
                continue;
            };

            if dag.node(target).is_none() {
                report.push_error(ValidationError {
                    code: ValidationCode::AnswerInvalidReference,
                    message: format!("answer {} references non-existent node {target}", answer.id),
                    node_id: Some(node_id),
                    answer_id: Some(answer.id),
                });
            }

            if let Some(&first) = seen_targets.get(&target) {
                report.warnings.push(ValidationWarning {
                    code: ValidationCode::DuplicateNextNode,
                    message: format!(
                        "answers {first} and {} of node {node_id} both lead to node {target}",
                        answer.id
                    ),
                    node_id: Some(node_id),
                    answer_id: Some(answer.id),
                });
            } else {
                seen_targets.insert(target, answer.id);
            }
        }
    }

    fn check_root(&self, dag: &Dag, report: &mut ValidationReport) {
        let candidates = dag.root_candidates();

        match candidates.len() {
            0 => report.push_error(ValidationError {
                code: ValidationCode::DagNoRoot,
                message: "graph has no root node, a circular reference consumed every node"
                    .to_string(),
                node_id: None,
                answer_id: None,
            }),
            1 => {}
            n => {
                let listed = candidates
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                report.push_error(ValidationError {
                    code: ValidationCode::DagMultipleRoots,
                    message: format!("graph has {n} root nodes, expected exactly 1: {listed}"),
                    node_id: None,
                    answer_id: None,
                });
            }
        }

        report.statistics.root_nodes = candidates.len();
        report.statistics.root_node_ids = candidates;
    }

    fn check_cycles(&self, dag: &Dag, report: &mut ValidationReport) {
        let cycles = detect_cycles(dag);

        report.statistics.has_cycles = !cycles.is_empty();
        report.statistics.cycle_paths = cycles;

        if report.statistics.has_cycles {
            report.push_error(ValidationError {
                code: ValidationCode::DagHasCycles,
                message: format!(
                    "graph contains {} cycle(s), a valid graph must be acyclic",
                    report.statistics.cycle_paths.len()
                ),
                node_id: None,
                answer_id: None,
            });
        }
    }

    fn collect_statistics(&self, dag: &Dag, report: &mut ValidationReport) {
        let stats = &mut report.statistics;
        stats.total_nodes = dag.node_count();
        stats.total_answers = dag.answer_count();

        stats.leaf_node_ids = dag
            .nodes
            .values()
            .filter(|n| n.is_leaf())
            .map(|n| n.id)
            .collect();
        stats.leaf_nodes = stats.leaf_node_ids.len();

        // Depth is undefined in the presence of cycles or without a unique
        // root; it stays 0 then.
        if stats.root_nodes == 1 && !stats.has_cycles {
            stats.max_depth = max_depth(dag, stats.root_node_ids[0]);
        }
    }
}

/// Breadth-first maximum depth from the given root.
fn max_depth(dag: &Dag, root: NodeId) -> usize {
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut queue: std::collections::VecDeque<(NodeId, usize)> = [(root, 0)].into();
    let mut deepest = 0;

    while let Some((node_id, depth)) = queue.pop_front() {
        if !visited.insert(node_id) {
            continue;
        }
        deepest = deepest.max(depth);

        let Some(node) = dag.node(node_id) else {
            continue;
        };
        for answer in &node.answers {
            if let Some(next) = answer.next_node {
                if !visited.contains(&next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
    }

    deepest
}

/// Depth-first cycle detection over the `next_node` reference graph.
///
/// Each rendered path runs from the first occurrence of the re-entered node
/// back to itself inclusive, so the first and last entries are equal. One
/// cycle is recorded per search tree; independent cycles in disconnected
/// components are each found by the outer scan.
fn detect_cycles(dag: &Dag) -> Vec<String> {
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut cycles: Vec<String> = Vec::new();

    for &start in dag.nodes.keys() {
        if visited.contains(&start) {
            continue;
        }

        // Explicit stack of (node, next successor index) paired with the
        // current path and its on-stack membership set.
        let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];
        let mut path: Vec<NodeId> = vec![start];
        let mut on_stack: BTreeSet<NodeId> = BTreeSet::new();
        visited.insert(start);
        on_stack.insert(start);

        'dfs: while let Some(&(node_id, successor_index)) = stack.last() {
            let successors: Vec<NodeId> = dag
                .node(node_id)
                .map(|n| n.answers.iter().filter_map(|a| a.next_node).collect())
                .unwrap_or_default();

            if successor_index >= successors.len() {
                stack.pop();
                path.pop();
                on_stack.remove(&node_id);
                continue;
            }

            if let Some(frame) = stack.last_mut() {
                frame.1 += 1;
            }
            let next = successors[successor_index];

            if on_stack.contains(&next) {
                let first = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut rendered: Vec<String> =
                    path[first..].iter().map(ToString::to_string).collect();
                rendered.push(next.to_string());
                cycles.push(rendered.join(" -> "));
                break 'dfs;
            }

            if visited.insert(next) {
                on_stack.insert(next);
                stack.push((next, 0));
                path.push(next);
            }
        }
    }

    cycles
}
