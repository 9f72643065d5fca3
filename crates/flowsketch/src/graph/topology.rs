//! Structural queries over an assembled node/edge set.

use indexmap::IndexMap;
use petgraph::{
    Direction,
    algo::{connected_components, is_cyclic_directed, tarjan_scc},
    graph::{DiGraph, NodeIndex},
    visit::Bfs,
};

use flowsketch_core::{
    element::{Edge, LogicalNode},
    identifier::NodeId,
    semantic::GraphType,
};

/// A petgraph view of the nodes and edges, keyed by node id.
#[derive(Debug)]
pub(crate) struct Topology {
    graph: DiGraph<NodeId, ()>,
    indices: IndexMap<NodeId, NodeIndex>,
}

impl Topology {
    /// Builds the view; edges with an unknown endpoint are skipped.
    pub(crate) fn new(nodes: &[LogicalNode], edges: &[Edge]) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut indices = IndexMap::with_capacity(nodes.len());
        for node in nodes {
            indices.insert(node.id(), graph.add_node(node.id()));
        }
        for edge in edges {
            if let (Some(&source), Some(&target)) =
                (indices.get(&edge.source()), indices.get(&edge.target()))
            {
                graph.add_edge(source, target, ());
            }
        }
        Self { graph, indices }
    }

    pub(crate) fn in_degree(&self, id: NodeId) -> usize {
        self.degree(id, Direction::Incoming)
    }

    pub(crate) fn out_degree(&self, id: NodeId) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    /// Nodes without incoming edges, in node order.
    pub(crate) fn sources(&self) -> Vec<NodeId> {
        self.indices
            .keys()
            .copied()
            .filter(|id| self.in_degree(*id) == 0)
            .collect()
    }

    /// Nodes without outgoing edges, in node order.
    pub(crate) fn sinks(&self) -> Vec<NodeId> {
        self.indices
            .keys()
            .copied()
            .filter(|id| self.out_degree(*id) == 0)
            .collect()
    }

    pub(crate) fn graph_type(&self) -> GraphType {
        if connected_components(&self.graph) > 1 {
            GraphType::Disconnected
        } else if is_cyclic_directed(&self.graph) {
            GraphType::DirectedCyclic
        } else {
            GraphType::DirectedAcyclic
        }
    }

    /// Returns true if a cycle can be reached by following edges from `start`.
    pub(crate) fn reaches_cycle(&self, start: NodeId) -> bool {
        let Some(&start) = self.indices.get(&start) else {
            return false;
        };

        let mut on_cycle = vec![false; self.graph.node_count()];
        for component in tarjan_scc(&self.graph) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| self.graph.contains_edge(idx, idx));
            if cyclic {
                for idx in component {
                    on_cycle[idx.index()] = true;
                }
            }
        }

        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(idx) = bfs.next(&self.graph) {
            if on_cycle[idx.index()] {
                return true;
            }
        }
        false
    }

    fn degree(&self, id: NodeId, direction: Direction) -> usize {
        self.indices
            .get(&id)
            .map_or(0, |&idx| self.graph.edges_directed(idx, direction).count())
    }
}

#[cfg(test)]
mod tests {
    use flowsketch_core::{geometry::Bounds, semantic::ShapeKind};

    use super::*;

    fn nodes(count: u32) -> Vec<LogicalNode> {
        (1..=count)
            .map(|n| {
                let bbox = Bounds::from_xywh(0.0, n as f32 * 100.0, 80.0, 40.0);
                LogicalNode::new(
                    NodeId::from_ordinal(n),
                    ShapeKind::Rectangle,
                    bbox,
                    bbox.area(),
                    0.9,
                    vec![n as usize - 1],
                )
            })
            .collect()
    }

    fn edge(source: u32, target: u32) -> Edge {
        Edge::new(NodeId::from_ordinal(source), NodeId::from_ordinal(target))
    }

    #[test]
    fn test_chain_is_acyclic() {
        let topology = Topology::new(&nodes(3), &[edge(1, 2), edge(2, 3)]);

        assert_eq!(topology.graph_type(), GraphType::DirectedAcyclic);
        assert_eq!(topology.sources(), vec![NodeId::from_ordinal(1)]);
        assert_eq!(topology.sinks(), vec![NodeId::from_ordinal(3)]);
        assert!(!topology.reaches_cycle(NodeId::from_ordinal(1)));
    }

    #[test]
    fn test_loop_back_is_cyclic() {
        let topology = Topology::new(&nodes(3), &[edge(1, 2), edge(2, 3), edge(3, 2)]);

        assert_eq!(topology.graph_type(), GraphType::DirectedCyclic);
        assert!(topology.reaches_cycle(NodeId::from_ordinal(1)));
        assert!(topology.sinks().is_empty());
    }

    #[test]
    fn test_self_loop_counts_as_cycle() {
        let topology = Topology::new(&nodes(2), &[edge(1, 2), edge(2, 2)]);

        assert_eq!(topology.graph_type(), GraphType::DirectedCyclic);
        assert!(topology.reaches_cycle(NodeId::from_ordinal(1)));
    }

    #[test]
    fn test_disconnected_wins_over_cyclic() {
        let topology = Topology::new(&nodes(3), &[edge(1, 2), edge(2, 1)]);

        assert_eq!(topology.graph_type(), GraphType::Disconnected);
        assert!(!topology.reaches_cycle(NodeId::from_ordinal(3)));
    }

    #[test]
    fn test_empty_graph() {
        let topology = Topology::new(&[], &[]);
        assert_eq!(topology.graph_type(), GraphType::DirectedAcyclic);
        assert!(topology.sources().is_empty());
    }
}
