//! Non-fatal consistency checks on an assembled graph.

use log::warn;

use flowsketch_core::{
    element::LogicalNode,
    semantic::SemanticClass,
};

use super::topology::Topology;

/// Runs every check and returns one message per failure.
///
/// Order: missing terminals, then per-node findings in node order, then
/// cycles reachable from start nodes.
pub(crate) fn check(nodes: &[LogicalNode], topology: &Topology) -> Vec<String> {
    let mut violations = Vec::new();

    let has_class = |class: SemanticClass| nodes.iter().any(|node| node.semantic_class() == class);
    if !has_class(SemanticClass::Start) {
        violations.push("no start node found".to_string());
    }
    if !has_class(SemanticClass::End) {
        violations.push("no end node found".to_string());
    }

    for node in nodes {
        let outgoing = topology.out_degree(node.id());
        let incoming = topology.in_degree(node.id());

        if node.semantic_class() == SemanticClass::Decision && outgoing < 2 {
            violations.push(format!(
                "decision node {} has {outgoing} outgoing edge(s), expected at least 2",
                node.id()
            ));
        }
        if incoming == 0 && outgoing == 0 {
            violations.push(format!("node {} is isolated", node.id()));
        }
    }

    for node in nodes
        .iter()
        .filter(|node| node.semantic_class() == SemanticClass::Start)
    {
        if topology.reaches_cycle(node.id()) {
            violations.push(format!("cycle reachable from start node {}", node.id()));
        }
    }

    for violation in &violations {
        warn!(violation; "Sanity check failed");
    }
    violations
}
