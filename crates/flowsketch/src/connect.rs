//! Connector resolution: from adjacency hints to edge candidates.
//!
//! Line detection reports arrows as loose segments. Segments whose
//! endpoints touch are joined into one connector, and the connector ends are
//! snapped to the nearest node. Explicit link hints name raw shapes and are
//! mapped to the node each shape was merged into.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use flowsketch_core::{
    element::{Edge, LogicalNode},
    error::{Diagnostic, ErrorCode, RecordRef},
    geometry::Point,
    identifier::NodeId,
    input::AdjacencyHint,
};

use crate::{
    config::GraphConfig,
    disjoint_set::DisjointSet,
    label::{nearest_node, normalize_text},
};

/// Counters describing how hints turned into edge candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorStats {
    pub segments: usize,
    pub connectors: usize,
    pub links: usize,
    /// Connectors with an end near no node.
    pub unsnapped: usize,
    /// Connectors and links with both ends on the same node.
    pub looped: usize,
    /// Links with an endpoint shape that did not become a node.
    #[serde(default)]
    pub dangling_links: usize,
}

/// Result of [`ConnectorResolver::resolve`].
#[derive(Debug, Clone)]
pub struct Connection {
    pub candidates: Vec<Edge>,
    pub stats: ConnectorStats,
    /// One warning per dangling link.
    pub warnings: Vec<Diagnostic>,
}

/// Turns adjacency hints into directed edge candidates.
#[derive(Debug)]
pub struct ConnectorResolver<'a> {
    config: &'a GraphConfig,
}

impl<'a> ConnectorResolver<'a> {
    pub fn new(config: &'a GraphConfig) -> Self {
        Self { config }
    }

    /// Resolves `hints` against `nodes`.
    ///
    /// Candidates from segment connectors come first, in the order of their
    /// first segment, followed by explicit links in input order. Link
    /// endpoints are shape indices; a link whose shape was discarded before
    /// node assignment is dropped with a warning.
    pub fn resolve(&self, hints: &[AdjacencyHint], nodes: &[LogicalNode]) -> Connection {
        let owners: HashMap<usize, NodeId> = nodes
            .iter()
            .flat_map(|node| node.sources().iter().map(|&idx| (idx, node.id())))
            .collect();

        let mut segments = Vec::new();
        let mut links = Vec::new();
        let mut warnings = Vec::new();
        let mut looped_links = 0;
        for (idx, hint) in hints.iter().enumerate() {
            match hint {
                AdjacencyHint::Segment { from, to } => segments.push((*from, *to)),
                AdjacencyHint::Link {
                    source,
                    target,
                    label,
                } => {
                    let (Some(&from), Some(&to)) = (owners.get(source), owners.get(target)) else {
                        let missing = if owners.contains_key(source) {
                            *target
                        } else {
                            *source
                        };
                        warn!(hint = idx, shape = missing; "Link endpoint was discarded");
                        warnings.push(
                            Diagnostic::warning(format!(
                                "link endpoint shape {missing} was discarded before node assignment"
                            ))
                            .with_code(ErrorCode::E203)
                            .with_record(RecordRef::Hint(idx))
                            .with_help("the link is ignored"),
                        );
                        continue;
                    };
                    if from == to && !self.config.allow_self_loops() {
                        debug!(node:% = from; "Link starts and ends on one node");
                        looped_links += 1;
                        continue;
                    }
                    let mut edge = Edge::new(from, to);
                    if let Some(label) = label {
                        edge.set_label(normalize_text(label));
                    }
                    links.push(edge);
                }
            }
        }

        info!(segments = segments.len(), links = links.len(); "Resolving connectors");

        let mut stats = ConnectorStats {
            segments: segments.len(),
            links: links.len(),
            looped: looped_links,
            dangling_links: warnings.len(),
            ..ConnectorStats::default()
        };

        let connectors = self.join_segments(&segments);
        stats.connectors = connectors.len();

        let mut candidates = Vec::with_capacity(connectors.len() + links.len());
        for (start, end) in connectors {
            let snap_distance = self.config.snap_distance();
            let (Some(source), Some(target)) = (
                nearest_node(nodes, start, snap_distance),
                nearest_node(nodes, end, snap_distance),
            ) else {
                debug!(start:?, end:?; "Connector does not reach a node");
                stats.unsnapped += 1;
                continue;
            };

            if source == target && !self.config.allow_self_loops() {
                debug!(node:% = nodes[source].id(); "Connector starts and ends on one node");
                stats.looped += 1;
                continue;
            }
            candidates.push(Edge::new(nodes[source].id(), nodes[target].id()));
        }
        candidates.extend(links);

        info!(
            candidates = candidates.len(),
            unsnapped = stats.unsnapped,
            looped = stats.looped,
            dangling_links = stats.dangling_links;
            "Connectors resolved"
        );

        Connection {
            candidates,
            stats,
            warnings,
        }
    }

    /// Joins touching segments into connectors, returned as `(start, end)`.
    ///
    /// A connector spans the endpoints of its group that touch no other
    /// segment, and the free end that was drawn as some segment's `to` is the
    /// arrowhead. Hint order therefore does not move the ends. Closed,
    /// branching or inconsistently drawn chains fall back to the two
    /// endpoints farthest apart, oriented along the first segment.
    fn join_segments(&self, segments: &[(Point, Point)]) -> Vec<(Point, Point)> {
        let join_distance = self.config.segment_join_distance();
        let near = |p: Point, segment: &(Point, Point)| {
            p.distance(segment.0) <= join_distance || p.distance(segment.1) <= join_distance
        };

        let mut set = DisjointSet::new(segments.len());
        for i in 0..segments.len() {
            for j in (i + 1)..segments.len() {
                if near(segments[i].0, &segments[j]) || near(segments[i].1, &segments[j]) {
                    set.union(i, j);
                }
            }
        }

        set.groups()
            .into_iter()
            .filter_map(|group| {
                // (point, drawn as a `to`)
                let free: Vec<(Point, bool)> = group
                    .iter()
                    .flat_map(|&idx| {
                        let (from, to) = segments[idx];
                        [(idx, from, false), (idx, to, true)]
                    })
                    .filter(|&(idx, point, _)| {
                        group
                            .iter()
                            .all(|&other| other == idx || !near(point, &segments[other]))
                    })
                    .map(|(_, point, is_head)| (point, is_head))
                    .collect();

                match free.as_slice() {
                    [(tail, false), (head, true)] | [(head, true), (tail, false)] => {
                        Some((*tail, *head))
                    }
                    _ => {
                        let (from, to) = segments[*group.first()?];
                        let points: Vec<Point> = group
                            .iter()
                            .flat_map(|&idx| [segments[idx].0, segments[idx].1])
                            .collect();
                        let (a, b) = farthest_pair(&points)?;
                        if along(from, to, a) <= along(from, to, b) {
                            Some((a, b))
                        } else {
                            Some((b, a))
                        }
                    }
                }
            })
            .collect()
    }
}

/// The pair of points with the greatest separation.
fn farthest_pair(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    let mut best = (first, first);
    let mut best_distance = 0.0;
    for (i, &p) in points.iter().enumerate() {
        for &q in &points[i + 1..] {
            let distance = p.distance(q);
            if distance > best_distance {
                best = (p, q);
                best_distance = distance;
            }
        }
    }
    Some(best)
}

/// Projection of `point` onto the direction `from -> to`.
fn along(from: Point, to: Point, point: Point) -> f32 {
    let direction = to.sub_point(from);
    let offset = point.sub_point(from);
    direction.x() * offset.x() + direction.y() * offset.y()
}
