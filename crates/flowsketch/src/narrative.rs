//! Narrative synthesis: a breadth-first walk from the start node.
//!
//! Every node reached from the first start node yields one `Step {n}: …`
//! line the first time it is dequeued. Decision nodes are followed by one
//! indented branch line per outgoing edge, affirmative outcomes first. An
//! edge leading back to an already emitted step is rendered as a reference
//! to that step, which keeps cyclic graphs finite.

use std::{collections::VecDeque, fmt};

use indexmap::{IndexMap, IndexSet};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use flowsketch_core::{
    element::{Edge, LogicalNode},
    identifier::NodeId,
    semantic::{Polarity, SemanticClass},
};

use crate::{config::NarrativeConfig, graph::Graph};

/// Ordered narrative lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Narrative(Vec<String>);

impl Narrative {
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, line) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Phrase for a node: its labels, or a default for its class.
pub(crate) fn phrase(node: &LogicalNode) -> String {
    node.label_text()
        .unwrap_or_else(|| node.semantic_class().default_phrase().to_string())
}

/// Branch order of an outgoing decision edge; unlabeled edges go last.
fn branch_rank(edge: &Edge) -> u8 {
    edge.polarity()
        .or_else(|| edge.label().map(Polarity::from_label))
        .map_or(3, Polarity::priority)
}

/// Renders a [`Graph`] as a step-by-step narrative.
///
/// # Examples
///
/// ```
/// use flowsketch::{config::NarrativeConfig, narrative::NarrativeGenerator, Analyzer};
/// use flowsketch_core::input::DetectionInput;
///
/// // Nothing detected, so there is no start node to walk from
/// let analysis = Analyzer::default().analyze(&DetectionInput::default()).unwrap();
///
/// let config = NarrativeConfig::default();
/// let narrative = NarrativeGenerator::new(&config).generate(&analysis.graph);
/// assert!(narrative.is_empty());
/// ```
#[derive(Debug)]
pub struct NarrativeGenerator<'a> {
    config: &'a NarrativeConfig,
}

impl<'a> NarrativeGenerator<'a> {
    pub fn new(config: &'a NarrativeConfig) -> Self {
        Self { config }
    }

    /// Walks `graph` breadth-first from its first start node.
    ///
    /// Returns an empty narrative when no node is classified as a start.
    pub fn generate(&self, graph: &Graph) -> Narrative {
        let Some(start) = graph
            .nodes()
            .iter()
            .filter(|node| node.semantic_class() == SemanticClass::Start)
            .min_by_key(|node| node.id())
        else {
            info!("No start node, narrative is empty");
            return Narrative::default();
        };
        info!(start:% = start.id(); "Generating narrative");

        let mut lines = Vec::new();
        let mut steps: IndexMap<NodeId, usize> = IndexMap::new();
        let mut visited: IndexSet<NodeId> = IndexSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        visited.insert(start.id());
        queue.push_back(start.id());

        while let Some(id) = queue.pop_front() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            let step = steps.len() + 1;
            steps.insert(id, step);
            lines.push(format!("Step {step}: {}", phrase(node)));

            let mut outgoing: Vec<&Edge> = graph.outgoing(id).collect();
            let is_decision = node.semantic_class() == SemanticClass::Decision;
            if is_decision {
                outgoing.sort_by_key(|edge| branch_rank(edge));
            }

            for edge in outgoing {
                let Some(target) = graph.node(edge.target()) else {
                    continue;
                };
                let reference = steps.get(&target.id()).map(|step| {
                    format!("return to Step {step} ({})", phrase(target))
                });

                if is_decision {
                    let condition = edge
                        .label()
                        .map_or_else(|| "Otherwise".to_string(), |label| format!("If {label}"));
                    let outcome = reference.unwrap_or_else(|| phrase(target));
                    lines.push(self.branch_line(&format!("{condition}: {outcome}")));
                } else if let Some(reference) = reference {
                    lines.push(self.branch_line(&reference));
                }

                if visited.insert(target.id()) {
                    queue.push_back(target.id());
                }
            }
        }

        debug!(
            steps = steps.len(),
            lines = lines.len(),
            unreachable = graph.nodes().len().saturating_sub(steps.len());
            "Narrative generated"
        );
        Narrative(lines)
    }

    fn branch_line(&self, text: &str) -> String {
        format!(
            "{:indent$}{} {text}",
            "",
            self.config.branch_marker(),
            indent = self.config.branch_indent()
        )
    }
}

#[cfg(test)]
mod tests {
    use flowsketch_core::{
        geometry::Bounds,
        semantic::ShapeKind,
    };

    use super::*;
    use crate::{config::GraphConfig, graph::GraphBuilder};

    fn node(n: u32, class: SemanticClass, label: Option<&str>) -> LogicalNode {
        let bbox = Bounds::from_xywh(0.0, n as f32 * 150.0, 100.0, 50.0);
        let mut node = LogicalNode::new(
            NodeId::from_ordinal(n),
            ShapeKind::Rectangle,
            bbox,
            bbox.area(),
            0.9,
            vec![n as usize - 1],
        );
        node.set_semantic_class(class);
        if let Some(label) = label {
            node.set_labels(vec![label.to_string()]);
        }
        node
    }

    fn id(n: u32) -> NodeId {
        NodeId::from_ordinal(n)
    }

    fn labeled(source: u32, target: u32, label: &str) -> Edge {
        let mut edge = Edge::new(id(source), id(target)).with_label(label);
        edge.set_polarity(Some(Polarity::from_label(label)));
        edge
    }

    fn narrate(nodes: Vec<LogicalNode>, edges: Vec<Edge>) -> Vec<String> {
        let config = GraphConfig::default().with_allow_self_loops(true);
        let raw = nodes.len();
        let graph = GraphBuilder::new(&config)
            .build(nodes, edges, Vec::new(), raw)
            .unwrap();
        NarrativeGenerator::new(&NarrativeConfig::default())
            .generate(&graph)
            .lines()
            .to_vec()
    }

    #[test]
    fn test_linear_flow() {
        let lines = narrate(
            vec![
                node(1, SemanticClass::Start, Some("Start")),
                node(2, SemanticClass::Process, Some("Process A")),
                node(3, SemanticClass::End, Some("End")),
            ],
            vec![Edge::new(id(1), id(2)), Edge::new(id(2), id(3))],
        );

        assert_eq!(lines, vec!["Step 1: Start", "Step 2: Process A", "Step 3: End"]);
    }

    #[test]
    fn test_no_start_is_empty() {
        let lines = narrate(
            vec![
                node(1, SemanticClass::Process, Some("A")),
                node(2, SemanticClass::End, None),
            ],
            vec![Edge::new(id(1), id(2))],
        );

        assert!(lines.is_empty());
    }

    #[test]
    fn test_decision_branches_yes_first() {
        let lines = narrate(
            vec![
                node(1, SemanticClass::Start, None),
                node(2, SemanticClass::Decision, Some("Valid?")),
                node(3, SemanticClass::Process, Some("Reject")),
                node(4, SemanticClass::End, Some("Done")),
            ],
            vec![
                Edge::new(id(1), id(2)),
                labeled(2, 3, "No"),
                labeled(2, 4, "Yes"),
            ],
        );

        assert_eq!(
            lines,
            vec![
                "Step 1: Start",
                "Step 2: Valid?",
                "  ↳ If Yes: Done",
                "  ↳ If No: Reject",
                "Step 3: Done",
                "Step 4: Reject",
            ]
        );
    }

    #[test]
    fn test_unlabeled_branch_is_otherwise() {
        let lines = narrate(
            vec![
                node(1, SemanticClass::Decision, None),
                node(2, SemanticClass::End, None),
                node(3, SemanticClass::Start, Some("Begin")),
            ],
            vec![Edge::new(id(3), id(1)), Edge::new(id(1), id(2))],
        );

        assert_eq!(
            lines,
            vec!["Step 1: Begin", "Step 2: Decision", "  ↳ Otherwise: End", "Step 3: End"]
        );
    }

    #[test]
    fn test_back_edges_reference_earlier_steps() {
        let lines = narrate(
            vec![
                node(1, SemanticClass::Start, Some("Start")),
                node(2, SemanticClass::Process, Some("Read input")),
                node(3, SemanticClass::Decision, Some("More?")),
                node(4, SemanticClass::End, Some("End")),
            ],
            vec![
                Edge::new(id(1), id(2)),
                Edge::new(id(2), id(3)),
                labeled(3, 2, "Yes"),
                labeled(3, 4, "No"),
                Edge::new(id(4), id(4)),
            ],
        );

        assert_eq!(
            lines,
            vec![
                "Step 1: Start",
                "Step 2: Read input",
                "Step 3: More?",
                "  ↳ If Yes: return to Step 2 (Read input)",
                "  ↳ If No: End",
                "Step 4: End",
                "  ↳ return to Step 4 (End)",
            ]
        );
    }

    #[test]
    fn test_unreachable_nodes_are_omitted() {
        let lines = narrate(
            vec![
                node(1, SemanticClass::Start, Some("Start")),
                node(2, SemanticClass::End, Some("End")),
                node(3, SemanticClass::Process, Some("Orphan")),
            ],
            vec![Edge::new(id(1), id(2))],
        );

        assert_eq!(lines, vec!["Step 1: Start", "Step 2: End"]);
    }

    #[test]
    fn test_display_joins_lines() {
        let narrative = Narrative(vec!["Step 1: Start".to_string(), "Step 2: End".to_string()]);
        assert_eq!(narrative.to_string(), "Step 1: Start\nStep 2: End");
    }
}
