//! Shape detection: from raw detector output to logical nodes.
//!
//! The merger runs three passes over the raw shapes:
//!
//! 1. **Confidence guard** drops low-confidence and degenerate shapes.
//! 2. **Proximal merging** collapses overlapping or near-concentric shapes
//!    into one cluster, repeating until no two clusters are mergeable.
//! 3. **Noise flush** drops clusters below the minimum area.
//!
//! Surviving clusters are ordered by their smallest raw shape index and
//! numbered `node_1..node_k` in that order.

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use flowsketch_core::{
    element::LogicalNode,
    geometry::Bounds,
    identifier::NodeId,
    input::RawShape,
    semantic::ShapeKind,
};

use crate::{config::DetectionConfig, disjoint_set::DisjointSet};

/// Counters describing what the merger kept and discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    /// Number of raw shapes received.
    pub raw_shapes: usize,
    /// Shapes dropped by the confidence guard.
    pub guard_rejections: usize,
    /// Shapes dropped for an extreme aspect ratio.
    pub degenerate_rejections: usize,
    /// Shapes absorbed into another cluster.
    pub merged_away: usize,
    /// Clusters dropped by the noise flush.
    pub noise_rejections: usize,
}

/// Result of [`ShapeMerger::merge`].
#[derive(Debug, Clone)]
pub struct Detection {
    pub nodes: Vec<LogicalNode>,
    pub stats: DetectionStats,
}

/// A group of raw shapes believed to depict one element.
#[derive(Debug, Clone)]
struct Cluster {
    bbox: Bounds,
    area: f32,
    confidence: f32,
    kind: KindVote,
    /// Raw shape indices, ascending.
    sources: Vec<usize>,
}

/// The contributor whose kind the cluster inherits.
#[derive(Debug, Clone, Copy)]
struct KindVote {
    kind: ShapeKind,
    confidence: f32,
    area: f32,
    source: usize,
}

impl KindVote {
    /// Higher confidence wins, then larger area, then the earlier shape.
    fn beats(&self, other: &KindVote) -> bool {
        if self.confidence != other.confidence {
            return self.confidence > other.confidence;
        }
        if self.area != other.area {
            return self.area > other.area;
        }
        self.source < other.source
    }
}

impl Cluster {
    fn from_shape(idx: usize, shape: &RawShape) -> Self {
        let area = shape.area();
        Self {
            bbox: shape.bbox(),
            area,
            confidence: shape.confidence(),
            kind: KindVote {
                kind: shape.kind(),
                confidence: shape.confidence(),
                area,
                source: idx,
            },
            sources: vec![idx],
        }
    }

    fn root_source(&self) -> usize {
        self.sources.first().copied().unwrap_or(usize::MAX)
    }

    fn absorb(&mut self, other: Cluster) {
        self.bbox = self.bbox.merge(&other.bbox);
        self.area = (self.area + other.area).min(self.bbox.area());
        self.confidence = self.confidence.max(other.confidence);
        if other.kind.beats(&self.kind) {
            self.kind = other.kind;
        }
        self.sources.extend(other.sources);
        self.sources.sort_unstable();
    }
}

/// Merges fragmented shape detections into logical nodes.
///
/// # Examples
///
/// ```
/// use flowsketch::{config::DetectionConfig, detect::ShapeMerger};
/// use flowsketch_core::{geometry::Bounds, input::RawShape};
///
/// let config = DetectionConfig::default();
/// let shapes = vec![
///     RawShape::new(Bounds::from_xywh(0.0, 0.0, 100.0, 60.0), 0.9),
///     // The same box detected twice, slightly offset
///     RawShape::new(Bounds::from_xywh(4.0, 2.0, 100.0, 60.0), 0.7),
///     // Too faint to trust
///     RawShape::new(Bounds::from_xywh(300.0, 0.0, 100.0, 60.0), 0.2),
/// ];
///
/// let detection = ShapeMerger::new(&config).merge(&shapes);
/// assert_eq!(detection.nodes.len(), 1);
/// assert_eq!(detection.nodes[0].sources(), &[0, 1]);
/// assert_eq!(detection.stats.guard_rejections, 1);
/// ```
#[derive(Debug)]
pub struct ShapeMerger<'a> {
    config: &'a DetectionConfig,
}

impl<'a> ShapeMerger<'a> {
    pub fn new(config: &'a DetectionConfig) -> Self {
        Self { config }
    }

    /// Runs guard, merge and noise flush over `shapes`.
    ///
    /// Empty input yields an empty detection.
    pub fn merge(&self, shapes: &[RawShape]) -> Detection {
        info!(raw_shapes = shapes.len(); "Merging shape detections");

        let mut stats = DetectionStats {
            raw_shapes: shapes.len(),
            ..DetectionStats::default()
        };

        let clusters = self.guard(shapes, &mut stats);
        let guarded = clusters.len();
        let clusters = self.merge_to_fixpoint(clusters);
        stats.merged_away = guarded - clusters.len();

        let min_area = self.config.min_area();
        let (kept, noise): (Vec<_>, Vec<_>) =
            clusters.into_iter().partition(|cluster| cluster.area >= min_area);
        stats.noise_rejections = noise.len();
        trace!(noise:?; "Flushed noise clusters");

        let mut kept = kept;
        kept.sort_by_key(Cluster::root_source);

        let nodes: Vec<LogicalNode> = kept
            .into_iter()
            .enumerate()
            .map(|(ordinal, cluster)| {
                LogicalNode::new(
                    NodeId::from_ordinal(ordinal as u32 + 1),
                    cluster.kind.kind,
                    cluster.bbox,
                    cluster.area,
                    cluster.confidence,
                    cluster.sources,
                )
            })
            .collect();

        info!(
            nodes = nodes.len(),
            guard_rejections = stats.guard_rejections,
            degenerate_rejections = stats.degenerate_rejections,
            merged_away = stats.merged_away,
            noise_rejections = stats.noise_rejections;
            "Shapes merged"
        );

        Detection { nodes, stats }
    }

    /// Applies the confidence guard and the aspect ratio filter.
    fn guard(&self, shapes: &[RawShape], stats: &mut DetectionStats) -> Vec<Cluster> {
        let max_aspect = self.config.max_aspect_ratio();
        let min_aspect = 1.0 / max_aspect;

        shapes
            .iter()
            .enumerate()
            .filter(|(idx, shape)| {
                if shape.confidence() < self.config.min_confidence() {
                    debug!(shape = *idx, confidence = shape.confidence(); "Rejected by confidence guard");
                    stats.guard_rejections += 1;
                    return false;
                }
                let aspect = shape.aspect_ratio();
                if aspect < min_aspect || aspect > max_aspect {
                    debug!(shape = *idx, aspect; "Rejected as degenerate");
                    stats.degenerate_rejections += 1;
                    return false;
                }
                true
            })
            .map(|(idx, shape)| Cluster::from_shape(idx, shape))
            .collect()
    }

    fn mergeable(&self, a: &Cluster, b: &Cluster) -> bool {
        if a.bbox.overlap_ratio(&b.bbox) > self.config.merge_overlap() {
            return true;
        }
        let reach = self.config.merge_distance_factor() * a.bbox.diagonal().min(b.bbox.diagonal());
        a.bbox.center().distance(b.bbox.center()) < reach
    }

    /// Collapses mergeable clusters until none remain.
    ///
    /// A collapsed cluster can become mergeable with a neighbour it did not
    /// touch before, so union-find runs again on the result until the
    /// cluster count stops shrinking.
    fn merge_to_fixpoint(&self, mut clusters: Vec<Cluster>) -> Vec<Cluster> {
        let mut round = 0;
        loop {
            round += 1;
            let len = clusters.len();
            let mut set = DisjointSet::new(len);
            for i in 0..len {
                for j in (i + 1)..len {
                    if self.mergeable(&clusters[i], &clusters[j]) {
                        set.union(i, j);
                    }
                }
            }

            let groups = set.groups();
            debug!(round, clusters = len, groups = groups.len(); "Merge round");
            if groups.len() == len {
                return clusters;
            }

            let mut slots: Vec<Option<Cluster>> = clusters.into_iter().map(Some).collect();
            clusters = groups
                .into_iter()
                .filter_map(|group| {
                    let mut members = group.into_iter().filter_map(|idx| slots[idx].take());
                    let mut merged = members.next()?;
                    for member in members {
                        merged.absorb(member);
                    }
                    Some(merged)
                })
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32, confidence: f32) -> RawShape {
        RawShape::new(Bounds::from_xywh(x, y, w, h), confidence).with_kind(ShapeKind::Rectangle)
    }

    fn merge(shapes: &[RawShape]) -> Detection {
        ShapeMerger::new(&DetectionConfig::default()).merge(shapes)
    }

    #[test]
    fn test_empty_input() {
        let detection = merge(&[]);
        assert!(detection.nodes.is_empty());
        assert_eq!(detection.stats, DetectionStats::default());
    }

    #[test]
    fn test_guard_and_noise() {
        let shapes = vec![
            rect(0.0, 0.0, 100.0, 50.0, 0.9),
            // Low confidence
            rect(300.0, 0.0, 100.0, 50.0, 0.2),
            // Tiny
            rect(600.0, 0.0, 5.0, 10.0, 0.9),
            // Stroke-like sliver
            rect(0.0, 300.0, 400.0, 10.0, 0.9),
        ];

        let detection = merge(&shapes);

        assert_eq!(detection.nodes.len(), 1);
        assert_eq!(detection.stats.guard_rejections, 1);
        assert_eq!(detection.stats.noise_rejections, 1);
        assert_eq!(detection.stats.degenerate_rejections, 1);
        assert_eq!(detection.nodes[0].id().to_string(), "node_1");
    }

    #[test]
    fn test_overlapping_fragments_merge() {
        let shapes = vec![
            rect(0.0, 0.0, 100.0, 60.0, 0.6),
            RawShape::new(Bounds::from_xywh(10.0, 5.0, 80.0, 50.0), 0.9)
                .with_kind(ShapeKind::Diamond),
        ];

        let detection = merge(&shapes);

        assert_eq!(detection.nodes.len(), 1);
        let node = &detection.nodes[0];
        assert_eq!(node.kind(), ShapeKind::Diamond);
        assert_eq!(node.confidence(), 0.9);
        assert_eq!(node.bbox(), Bounds::from_xywh(0.0, 0.0, 100.0, 60.0));
        // Sum of areas bounded by the union box
        assert!(approx_eq!(f32, node.area(), 6000.0));
        assert_eq!(detection.stats.merged_away, 1);
    }

    #[test]
    fn test_kind_tie_prefers_larger_area() {
        let shapes = vec![
            RawShape::new(Bounds::from_xywh(10.0, 10.0, 40.0, 40.0), 0.8)
                .with_kind(ShapeKind::Circle),
            rect(0.0, 0.0, 60.0, 60.0, 0.8),
        ];

        let detection = merge(&shapes);

        assert_eq!(detection.nodes.len(), 1);
        assert_eq!(detection.nodes[0].kind(), ShapeKind::Rectangle);
    }

    #[test]
    fn test_transitive_chain_merges() {
        // a~b and b~c overlap, a and c do not
        let shapes = vec![
            rect(0.0, 0.0, 100.0, 100.0, 0.9),
            rect(50.0, 0.0, 100.0, 100.0, 0.9),
            rect(100.0, 0.0, 100.0, 100.0, 0.9),
        ];

        let detection = merge(&shapes);

        assert_eq!(detection.nodes.len(), 1);
        assert_eq!(detection.nodes[0].sources(), &[0, 1, 2]);
    }

    #[test]
    fn test_separate_shapes_keep_detection_order() {
        let shapes = vec![
            rect(0.0, 300.0, 100.0, 50.0, 0.9),
            rect(0.0, 0.0, 100.0, 50.0, 0.9),
            rect(0.0, 150.0, 100.0, 50.0, 0.9),
        ];

        let detection = merge(&shapes);

        let firsts: Vec<_> = detection.nodes.iter().map(|n| n.sources()[0]).collect();
        assert_eq!(firsts, vec![0, 1, 2]);
        assert_eq!(detection.nodes[2].id().to_string(), "node_3");
    }

    #[test]
    fn test_ids_skip_flushed_clusters() {
        let shapes = vec![
            rect(0.0, 0.0, 10.0, 10.0, 0.9),
            rect(100.0, 0.0, 100.0, 50.0, 0.9),
        ];

        let detection = merge(&shapes);

        assert_eq!(detection.nodes.len(), 1);
        assert_eq!(detection.nodes[0].id().to_string(), "node_1");
        assert_eq!(detection.nodes[0].sources(), &[1]);
    }
}
