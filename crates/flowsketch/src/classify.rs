//! Rule-based semantic classification.
//!
//! Node roles come from an ordered rule table; the first rule whose
//! condition holds decides the class. The degree rules for round shapes
//! claim one node each per pass, the first in node order. Edge polarity
//! comes from the edge label alone.

use std::collections::HashMap;

use log::{debug, info};

use flowsketch_core::{
    element::{Edge, LogicalNode},
    identifier::NodeId,
    semantic::{Polarity, SemanticClass, ShapeKind},
};

use crate::config::LabelConfig;

/// Connection evidence for one node, counted over non-loop edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Degree {
    pub incoming: usize,
    pub outgoing: usize,
}

impl Degree {
    /// Counts incoming and outgoing edges per node; self-loops are ignored.
    pub fn tally(edges: &[Edge]) -> HashMap<NodeId, Degree> {
        let mut degrees: HashMap<NodeId, Degree> = HashMap::new();
        for edge in edges.iter().filter(|edge| !edge.is_self_loop()) {
            degrees.entry(edge.source()).or_default().outgoing += 1;
            degrees.entry(edge.target()).or_default().incoming += 1;
        }
        degrees
    }
}

/// Condition half of a classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    /// A label matches the start vocabulary.
    StartWord,
    /// A label matches the end vocabulary.
    EndWord,
    /// A round shape nothing points to.
    RoundWithoutPredecessors,
    /// A round shape that points nowhere.
    RoundWithoutSuccessors,
    /// The shape has the given kind.
    Kind(ShapeKind),
}

impl Condition {
    /// Whether the rule stops matching once it has decided one node.
    fn matches_once(self) -> bool {
        matches!(
            self,
            Condition::RoundWithoutPredecessors | Condition::RoundWithoutSuccessors
        )
    }
}

/// Rules in priority order; nodes matching none are [`SemanticClass::Unknown`].
const RULES: [(Condition, SemanticClass); 7] = [
    (Condition::StartWord, SemanticClass::Start),
    (Condition::EndWord, SemanticClass::End),
    (Condition::RoundWithoutPredecessors, SemanticClass::Start),
    (Condition::RoundWithoutSuccessors, SemanticClass::End),
    (Condition::Kind(ShapeKind::Diamond), SemanticClass::Decision),
    (Condition::Kind(ShapeKind::Rectangle), SemanticClass::Process),
    (Condition::Kind(ShapeKind::Parallelogram), SemanticClass::Data),
];

/// Assigns flowchart roles to nodes and polarity to edges.
///
/// Classification is a pure function of the node, its degree and the
/// configured vocabulary.
#[derive(Debug)]
pub struct Classifier<'a> {
    config: &'a LabelConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a LabelConfig) -> Self {
        Self { config }
    }

    /// Returns the class of the first rule matching `node` on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowsketch::{classify::{Classifier, Degree}, config::LabelConfig};
    /// use flowsketch_core::{
    ///     element::LogicalNode, geometry::Bounds, identifier::NodeId,
    ///     semantic::{SemanticClass, ShapeKind},
    /// };
    ///
    /// let bbox = Bounds::from_xywh(0.0, 0.0, 80.0, 80.0);
    /// let node = LogicalNode::new(NodeId::from_ordinal(1), ShapeKind::Circle, bbox, 5000.0, 0.9, vec![0]);
    /// let config = LabelConfig::default();
    /// let classifier = Classifier::new(&config);
    ///
    /// let degree = Degree { incoming: 0, outgoing: 1 };
    /// assert_eq!(classifier.classify_node(&node, degree), SemanticClass::Start);
    /// ```
    pub fn classify_node(&self, node: &LogicalNode, degree: Degree) -> SemanticClass {
        self.first_match(node, degree, &[])
            .map(|(_, class)| class)
            .unwrap_or(SemanticClass::Unknown)
    }

    /// Classifies every node using degree evidence from `edges`.
    ///
    /// Only the first round shape without predecessors becomes `start` by
    /// degree, and only the first without successors becomes `end`; later
    /// ones fall through to the remaining rules. The result depends on node
    /// order, labels and `edges` only, so a second pass changes nothing.
    pub fn classify_nodes(&self, nodes: &mut [LogicalNode], edges: &[Edge]) {
        info!(nodes = nodes.len(); "Classifying nodes");

        let degrees = Degree::tally(edges);
        let mut claimed = Vec::new();
        for node in nodes.iter_mut() {
            let degree = degrees.get(&node.id()).copied().unwrap_or_default();
            let class = match self.first_match(node, degree, &claimed) {
                Some((condition, class)) => {
                    if condition.matches_once() {
                        claimed.push(condition);
                    }
                    class
                }
                None => SemanticClass::Unknown,
            };
            debug!(node:% = node.id(), kind:% = node.kind(), class:%; "Classified node");
            node.set_semantic_class(class);
        }
    }

    fn first_match(
        &self,
        node: &LogicalNode,
        degree: Degree,
        claimed: &[Condition],
    ) -> Option<(Condition, SemanticClass)> {
        RULES
            .iter()
            .copied()
            .find(|(condition, _)| {
                !claimed.contains(condition) && self.holds(*condition, node, degree)
            })
    }

    /// Sets the polarity of every edge from its label.
    pub fn classify_edges(&self, edges: &mut [Edge]) {
        for edge in edges.iter_mut() {
            edge.set_polarity(edge.label().map(Polarity::from_label));
        }
    }

    fn holds(&self, condition: Condition, node: &LogicalNode, degree: Degree) -> bool {
        match condition {
            Condition::StartWord => has_word(node, self.config.start_words()),
            Condition::EndWord => has_word(node, self.config.end_words()),
            Condition::RoundWithoutPredecessors => node.kind().is_circular() && degree.incoming == 0,
            Condition::RoundWithoutSuccessors => node.kind().is_circular() && degree.outgoing == 0,
            Condition::Kind(kind) => node.kind() == kind,
        }
    }
}

fn has_word(node: &LogicalNode, words: &[String]) -> bool {
    node.labels().iter().any(|label| {
        words
            .iter()
            .any(|word| label.trim().eq_ignore_ascii_case(word.trim()))
    })
}
