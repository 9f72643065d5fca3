//! Directed graph assembly.
//!
//! [`GraphBuilder`] turns classified nodes and edge candidates into an
//! immutable [`Graph`]:
//!
//! - candidates referencing unknown nodes abort with [`FlowError::Integrity`]
//! - self-loops are dropped unless allowed
//! - parallel edges are deduplicated per ordered pair and label
//! - pending labels are placed on the nearest unlabeled edge
//! - metadata and sanity violations are computed last
//!
//! Quality findings never abort assembly; they are listed in
//! [`GraphMetadata::sanity_violations`].

mod sanity;
mod topology;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use flowsketch_core::{
    element::{Edge, LogicalNode},
    identifier::NodeId,
    semantic::GraphType,
};

use crate::{FlowError, config::GraphConfig, label::PendingLabel};

use topology::Topology;

/// Summary of an assembled graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub node_count: usize,
    pub edge_count: usize,
    /// Share of raw shapes that did not become nodes, in percent.
    pub node_reduction_pct: f32,
    pub graph_type: GraphType,
    pub sanity_violations: Vec<String>,
    /// Nodes without incoming edges.
    pub start_nodes: Vec<NodeId>,
    /// Nodes without outgoing edges.
    pub end_nodes: Vec<NodeId>,
    /// Simple start-to-end paths, bounded by [`GraphConfig::max_paths`].
    #[serde(default)]
    pub paths: Vec<Vec<NodeId>>,
}

/// A directed graph of logical nodes, immutable once built.
///
/// Nodes keep detection order and edges keep assembly order, so the
/// serialized form is stable for a given input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<LogicalNode>,
    edges: Vec<Edge>,
    metadata: GraphMetadata,
}

impl Graph {
    pub fn nodes(&self) -> &[LogicalNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }

    /// Looks a node up by id.
    pub fn node(&self, id: NodeId) -> Option<&LogicalNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Edges leaving `id`, in edge order.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.source() == id)
    }

    /// Nodes without incoming edges.
    pub fn start_nodes(&self) -> &[NodeId] {
        &self.metadata.start_nodes
    }

    /// Nodes without outgoing edges.
    pub fn end_nodes(&self) -> &[NodeId] {
        &self.metadata.end_nodes
    }

    /// Successor lists for every node, in node order.
    pub fn adjacency(&self) -> IndexMap<NodeId, Vec<NodeId>> {
        let mut adjacency: IndexMap<NodeId, Vec<NodeId>> =
            self.nodes.iter().map(|node| (node.id(), Vec::new())).collect();
        for edge in &self.edges {
            if let Some(targets) = adjacency.get_mut(&edge.source()) {
                targets.push(edge.target());
            }
        }
        adjacency
    }

    /// Simple paths from nodes without predecessors to nodes without
    /// successors, at most `max` of them.
    ///
    /// Paths are enumerated depth-first with an explicit stack, following
    /// edges in edge order. A graph where every node has a predecessor has
    /// no such paths.
    pub fn paths(&self, max: usize) -> Vec<Vec<NodeId>> {
        let adjacency = self.adjacency();
        let sinks: IndexSet<NodeId> = self.metadata.end_nodes.iter().copied().collect();
        let mut paths = Vec::new();

        for &start in &self.metadata.start_nodes {
            // Each frame: the path so far and the index of the next successor to try.
            let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];
            let mut path: Vec<NodeId> = vec![start];

            while let Some((node, next)) = stack.last_mut() {
                if paths.len() >= max {
                    return paths;
                }
                let node = *node;
                if *next == 0 && sinks.contains(&node) {
                    paths.push(path.clone());
                }

                let successors = adjacency.get(&node).map(Vec::as_slice).unwrap_or_default();
                let candidate = successors.get(*next).copied();
                *next += 1;

                match candidate {
                    Some(successor) if !path.contains(&successor) => {
                        stack.push((successor, 0));
                        path.push(successor);
                    }
                    Some(_) => {}
                    None => {
                        stack.pop();
                        path.pop();
                    }
                }
            }
        }
        paths
    }
}

/// Assembles a [`Graph`] from pipeline stage outputs.
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    config: &'a GraphConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a GraphConfig) -> Self {
        Self { config }
    }

    /// Builds the graph.
    ///
    /// # Arguments
    ///
    /// * `nodes` - Classified nodes in detection order
    /// * `candidates` - Edge candidates with polarity already assigned
    /// * `pending` - Labels not attached to any node
    /// * `raw_shape_count` - Number of raw shapes the nodes came from
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Integrity`] if a candidate references a node
    /// that does not exist.
    pub fn build(
        &self,
        nodes: Vec<LogicalNode>,
        candidates: Vec<Edge>,
        pending: Vec<PendingLabel>,
        raw_shape_count: usize,
    ) -> Result<Graph, FlowError> {
        info!(nodes = nodes.len(), candidates = candidates.len(); "Building graph");

        let known: IndexSet<NodeId> = nodes.iter().map(LogicalNode::id).collect();
        let mut warnings = Vec::new();
        let mut edges: Vec<Edge> = Vec::new();

        for candidate in candidates {
            for endpoint in [candidate.source(), candidate.target()] {
                if !known.contains(&endpoint) {
                    return Err(FlowError::Integrity(format!(
                        "edge {} -> {} references missing node {endpoint}",
                        candidate.source(),
                        candidate.target()
                    )));
                }
            }

            if candidate.is_self_loop() && !self.config.allow_self_loops() {
                let message = format!("discarded self-loop on node {}", candidate.source());
                warn!(message; "Dropped edge");
                warnings.push(message);
                continue;
            }

            insert_deduplicated(&mut edges, candidate);
        }
        debug!(edges = edges.len(); "Edges deduplicated");

        for label in pending {
            if !self.attach_pending(&nodes, &mut edges, &label) {
                let message = format!("label \"{}\" could not be attached to an edge", label.text);
                warn!(message; "Unattached label");
                warnings.push(message);
            }
        }

        let topology = Topology::new(&nodes, &edges);
        let mut sanity_violations = warnings;
        sanity_violations.extend(sanity::check(&nodes, &topology));

        let metadata = GraphMetadata {
            node_count: nodes.len(),
            edge_count: edges.len(),
            node_reduction_pct: reduction_pct(raw_shape_count, nodes.len()),
            graph_type: topology.graph_type(),
            sanity_violations,
            start_nodes: topology.sources(),
            end_nodes: topology.sinks(),
            paths: Vec::new(),
        };

        let mut graph = Graph {
            nodes,
            edges,
            metadata,
        };
        graph.metadata.paths = graph.paths(self.config.max_paths());
        let metadata = &graph.metadata;

        info!(
            node_count = metadata.node_count,
            edge_count = metadata.edge_count,
            graph_type:% = metadata.graph_type,
            violations = metadata.sanity_violations.len(),
            paths = metadata.paths.len();
            "Graph built"
        );
        trace!(graph:?; "Built graph");
        Ok(graph)
    }

    /// Puts `label` on the nearest unlabeled edge within reach.
    fn attach_pending(&self, nodes: &[LogicalNode], edges: &mut [Edge], label: &PendingLabel) -> bool {
        let center = |id: NodeId| {
            nodes
                .iter()
                .find(|node| node.id() == id)
                .map(LogicalNode::center)
        };

        let mut best: Option<(usize, f32)> = None;
        for (idx, edge) in edges.iter().enumerate() {
            if edge.label().is_some() {
                continue;
            }
            let (Some(a), Some(b)) = (center(edge.source()), center(edge.target())) else {
                continue;
            };
            let distance = label.position.distance_to_segment(a, b);
            if distance > self.config.edge_label_distance() {
                continue;
            }
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((idx, distance));
            }
        }

        let Some((idx, _)) = best else {
            return false;
        };
        let edge = &mut edges[idx];
        debug!(label = label.text, source:% = edge.source(), target:% = edge.target(); "Attached pending label");
        edge.set_label(label.text.clone());
        edge.set_polarity(Some(label.polarity));
        true
    }
}

/// Adds `candidate` unless an equivalent edge exists.
///
/// Per ordered pair, one edge survives per distinct label (ignoring case);
/// an unlabeled edge takes the label of a later labeled duplicate.
fn insert_deduplicated(edges: &mut Vec<Edge>, candidate: Edge) {
    let same_pair = |edge: &Edge| {
        edge.source() == candidate.source() && edge.target() == candidate.target()
    };

    match candidate.label() {
        None => {
            if !edges.iter().any(same_pair) {
                edges.push(candidate);
            }
        }
        Some(label) => {
            let duplicate = edges.iter().any(|edge| {
                same_pair(edge)
                    && edge
                        .label()
                        .is_some_and(|existing| existing.eq_ignore_ascii_case(label))
            });
            if duplicate {
                return;
            }
            if let Some(unlabeled) = edges
                .iter_mut()
                .find(|edge| same_pair(&**edge) && edge.label().is_none())
            {
                unlabeled.set_label(label);
                unlabeled.set_polarity(candidate.polarity());
                return;
            }
            edges.push(candidate);
        }
    }
}

fn reduction_pct(raw: usize, kept: usize) -> f32 {
    if raw == 0 {
        return 0.0;
    }
    let removed = raw.saturating_sub(kept) as f32;
    (removed / raw as f32 * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use flowsketch_core::{
        geometry::{Bounds, Point},
        semantic::{Polarity, SemanticClass, ShapeKind},
    };

    use super::*;

    fn node(n: u32, x: f32, y: f32, class: SemanticClass) -> LogicalNode {
        let bbox = Bounds::from_xywh(x, y, 100.0, 50.0);
        let mut node = LogicalNode::new(
            NodeId::from_ordinal(n),
            ShapeKind::Rectangle,
            bbox,
            bbox.area(),
            0.9,
            vec![n as usize - 1],
        );
        node.set_semantic_class(class);
        node
    }

    fn id(n: u32) -> NodeId {
        NodeId::from_ordinal(n)
    }

    fn chain() -> Vec<LogicalNode> {
        vec![
            node(1, 0.0, 0.0, SemanticClass::Start),
            node(2, 0.0, 200.0, SemanticClass::Process),
            node(3, 0.0, 400.0, SemanticClass::End),
        ]
    }

    fn build(
        config: &GraphConfig,
        nodes: Vec<LogicalNode>,
        candidates: Vec<Edge>,
        pending: Vec<PendingLabel>,
    ) -> Result<Graph, FlowError> {
        let raw = nodes.len();
        GraphBuilder::new(config).build(nodes, candidates, pending, raw)
    }

    #[test]
    fn test_missing_endpoint_is_integrity_error() {
        let result = build(
            &GraphConfig::default(),
            chain(),
            vec![Edge::new(id(1), id(9))],
            Vec::new(),
        );

        match result {
            Err(FlowError::Integrity(message)) => assert!(message.contains("node_9")),
            other => panic!("Expected integrity error, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_dropped_with_warning() {
        let graph = build(
            &GraphConfig::default(),
            chain(),
            vec![Edge::new(id(1), id(2)), Edge::new(id(2), id(2)), Edge::new(id(2), id(3))],
            Vec::new(),
        )
        .unwrap();

        assert_eq!(graph.edges().len(), 2);
        assert_eq!(
            graph.metadata().sanity_violations,
            vec!["discarded self-loop on node node_2".to_string()]
        );
    }

    #[test]
    fn test_self_loop_kept_when_allowed() {
        let config = GraphConfig::default().with_allow_self_loops(true);
        let graph = build(
            &config,
            chain(),
            vec![Edge::new(id(1), id(2)), Edge::new(id(2), id(2)), Edge::new(id(2), id(3))],
            Vec::new(),
        )
        .unwrap();

        assert_eq!(graph.edges().len(), 3);
        assert_eq!(graph.metadata().graph_type, GraphType::DirectedCyclic);
    }

    #[test]
    fn test_parallel_edges_deduplicated() {
        let mut edges = Vec::new();
        insert_deduplicated(&mut edges, Edge::new(id(1), id(2)));
        insert_deduplicated(&mut edges, Edge::new(id(1), id(2)));
        insert_deduplicated(&mut edges, Edge::new(id(1), id(2)).with_label("Yes"));
        insert_deduplicated(&mut edges, Edge::new(id(1), id(2)).with_label("yes"));
        insert_deduplicated(&mut edges, Edge::new(id(1), id(2)).with_label("No"));
        insert_deduplicated(&mut edges, Edge::new(id(2), id(1)));

        assert_eq!(
            edges,
            vec![
                Edge::new(id(1), id(2)).with_label("Yes"),
                Edge::new(id(1), id(2)).with_label("No"),
                Edge::new(id(2), id(1)),
            ]
        );
    }

    #[test]
    fn test_pending_label_attaches_to_nearest_edge() {
        let nodes = vec![
            node(1, 0.0, 0.0, SemanticClass::Decision),
            node(2, -200.0, 200.0, SemanticClass::End),
            node(3, 200.0, 200.0, SemanticClass::End),
        ];
        let pending = vec![
            PendingLabel {
                text: "No".to_string(),
                position: Point::new(160.0, 120.0),
                polarity: Polarity::No,
            },
            PendingLabel {
                text: "Yes".to_string(),
                position: Point::new(-60.0, 120.0),
                polarity: Polarity::Yes,
            },
            PendingLabel {
                text: "Maybe".to_string(),
                position: Point::new(2000.0, 2000.0),
                polarity: Polarity::Other,
            },
        ];
        let graph = build(
            &GraphConfig::default(),
            nodes,
            vec![Edge::new(id(1), id(2)), Edge::new(id(1), id(3))],
            pending,
        )
        .unwrap();

        assert_eq!(graph.edges()[0].label(), Some("Yes"));
        assert_eq!(graph.edges()[0].polarity(), Some(Polarity::Yes));
        assert_eq!(graph.edges()[1].label(), Some("No"));
        assert!(
            graph
                .metadata()
                .sanity_violations
                .contains(&"label \"Maybe\" could not be attached to an edge".to_string())
        );
    }

    #[test]
    fn test_metadata_for_chain() {
        let graph = GraphBuilder::new(&GraphConfig::default())
            .build(
                chain(),
                vec![Edge::new(id(1), id(2)), Edge::new(id(2), id(3))],
                Vec::new(),
                4,
            )
            .unwrap();

        let metadata = graph.metadata();
        assert_eq!(metadata.node_count, 3);
        assert_eq!(metadata.edge_count, 2);
        assert_eq!(metadata.node_reduction_pct, 25.0);
        assert_eq!(metadata.graph_type, GraphType::DirectedAcyclic);
        assert!(metadata.sanity_violations.is_empty());
        assert_eq!(metadata.start_nodes, vec![id(1)]);
        assert_eq!(metadata.end_nodes, vec![id(3)]);
        assert_eq!(metadata.paths, vec![vec![id(1), id(2), id(3)]]);
    }

    #[test]
    fn test_reduction_pct_bounds() {
        assert_eq!(reduction_pct(0, 0), 0.0);
        assert_eq!(reduction_pct(5, 5), 0.0);
        assert_eq!(reduction_pct(4, 0), 100.0);
        assert_eq!(reduction_pct(2, 3), 0.0);
    }

    #[test]
    fn test_adjacency_and_paths() {
        let nodes = vec![
            node(1, 0.0, 0.0, SemanticClass::Start),
            node(2, 0.0, 200.0, SemanticClass::Decision),
            node(3, -200.0, 400.0, SemanticClass::Process),
            node(4, 200.0, 400.0, SemanticClass::End),
        ];
        let edges = vec![
            Edge::new(id(1), id(2)),
            Edge::new(id(2), id(3)),
            Edge::new(id(2), id(4)),
            Edge::new(id(3), id(2)),
        ];
        let graph = build(&GraphConfig::default(), nodes, edges, Vec::new()).unwrap();

        let adjacency = graph.adjacency();
        assert_eq!(adjacency[&id(2)], vec![id(3), id(4)]);
        assert!(adjacency[&id(4)].is_empty());

        assert_eq!(graph.paths(10), vec![vec![id(1), id(2), id(4)]]);
        assert!(graph.paths(0).is_empty());
    }

    #[test]
    fn test_paths_respect_limit() {
        // Diamond-shaped flow: two paths from 1 to 4
        let nodes = vec![
            node(1, 0.0, 0.0, SemanticClass::Start),
            node(2, -200.0, 200.0, SemanticClass::Process),
            node(3, 200.0, 200.0, SemanticClass::Process),
            node(4, 0.0, 400.0, SemanticClass::End),
        ];
        let edges = vec![
            Edge::new(id(1), id(2)),
            Edge::new(id(1), id(3)),
            Edge::new(id(2), id(4)),
            Edge::new(id(3), id(4)),
        ];
        let graph = build(&GraphConfig::default(), nodes, edges, Vec::new()).unwrap();

        assert_eq!(graph.paths(10).len(), 2);
        assert_eq!(graph.paths(1), vec![vec![id(1), id(2), id(4)]]);
    }

    #[test]
    fn test_metadata_paths_follow_config_limit() {
        let nodes = vec![
            node(1, 0.0, 0.0, SemanticClass::Start),
            node(2, -200.0, 200.0, SemanticClass::Process),
            node(3, 200.0, 200.0, SemanticClass::Process),
            node(4, 0.0, 400.0, SemanticClass::End),
        ];
        let edges = vec![
            Edge::new(id(1), id(2)),
            Edge::new(id(1), id(3)),
            Edge::new(id(2), id(4)),
            Edge::new(id(3), id(4)),
        ];
        let config = GraphConfig::default().with_max_paths(1);
        let graph = build(&config, nodes, edges, Vec::new()).unwrap();

        assert_eq!(graph.metadata().paths, vec![vec![id(1), id(2), id(4)]]);
    }
}
