//! Label association: attaching OCR text to nodes.
//!
//! Decision outcomes ("yes", "no", "true", "false") belong on edges, so they
//! are rerouted to the pending edge labels no matter where they were found.
//! Any other fragment attaches to the nearest node box within reach;
//! fragments out of reach of every node also become pending edge labels.

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use flowsketch_core::{
    element::LogicalNode,
    geometry::Point,
    input::OcrFragment,
    semantic::Polarity,
};

use crate::config::LabelConfig;

/// Text waiting to be placed on an edge by the graph builder.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLabel {
    pub text: String,
    /// Center of the fragment's bounding box.
    pub position: Point,
    pub polarity: Polarity,
}

/// Counters describing how fragments were used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelStats {
    pub fragments: usize,
    pub low_confidence: usize,
    pub blank: usize,
    pub attached: usize,
    pub rerouted: usize,
    pub unattached: usize,
}

/// Result of [`LabelAssociator::associate`].
#[derive(Debug, Clone)]
pub struct LabelAssignment {
    pub nodes: Vec<LogicalNode>,
    pub pending: Vec<PendingLabel>,
    pub stats: LabelStats,
}

/// Collapses runs of whitespace and trims the ends.
pub(crate) fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Attaches recognized text to logical nodes.
#[derive(Debug)]
pub struct LabelAssociator<'a> {
    config: &'a LabelConfig,
}

impl<'a> LabelAssociator<'a> {
    pub fn new(config: &'a LabelConfig) -> Self {
        Self { config }
    }

    /// Distributes `fragments` over `nodes`.
    ///
    /// Node geometry is left untouched; only labels are filled in, in
    /// reading order (top to bottom, then left to right) without duplicates.
    pub fn associate(
        &self,
        fragments: &[OcrFragment],
        mut nodes: Vec<LogicalNode>,
    ) -> LabelAssignment {
        info!(fragments = fragments.len(), nodes = nodes.len(); "Associating labels");

        let mut stats = LabelStats {
            fragments: fragments.len(),
            ..LabelStats::default()
        };
        let mut pending = Vec::new();
        // (node index, position, text)
        let mut attached: Vec<(usize, Point, String)> = Vec::new();

        for (idx, fragment) in fragments.iter().enumerate() {
            if fragment.confidence() < self.config.min_text_confidence() {
                stats.low_confidence += 1;
                continue;
            }
            let text = normalize_text(fragment.text());
            if text.is_empty() {
                stats.blank += 1;
                continue;
            }
            let position = fragment.bbox().center();

            if let Some(polarity) = Polarity::from_vocabulary(&text) {
                debug!(fragment = idx, text; "Rerouted decision outcome to edges");
                stats.rerouted += 1;
                pending.push(PendingLabel {
                    text,
                    position,
                    polarity,
                });
                continue;
            }

            match nearest_node(&nodes, position, self.config.attach_distance()) {
                Some(node_idx) => {
                    stats.attached += 1;
                    attached.push((node_idx, position, text));
                }
                None => {
                    debug!(fragment = idx, text; "Fragment out of reach of every node");
                    stats.unattached += 1;
                    let polarity = Polarity::from_label(&text);
                    pending.push(PendingLabel {
                        text,
                        position,
                        polarity,
                    });
                }
            }
        }

        attached.sort_by(|(_, a, _), (_, b, _)| a.y().total_cmp(&b.y()).then(a.x().total_cmp(&b.x())));

        for (node_idx, node) in nodes.iter_mut().enumerate() {
            let mut labels: Vec<String> = Vec::new();
            for (_, _, text) in attached.iter().filter(|(idx, _, _)| *idx == node_idx) {
                if !labels.iter().any(|label| label.eq_ignore_ascii_case(text)) {
                    labels.push(text.clone());
                }
            }
            if !labels.is_empty() {
                node.set_labels(labels);
            }
        }

        info!(
            attached = stats.attached,
            rerouted = stats.rerouted,
            unattached = stats.unattached;
            "Labels associated"
        );
        trace!(pending:?; "Pending edge labels");

        LabelAssignment {
            nodes,
            pending,
            stats,
        }
    }
}

/// Index of the node whose box is closest to `position`, if within `max_distance`.
///
/// Ties go to the larger node, then to the earlier one.
pub(crate) fn nearest_node(nodes: &[LogicalNode], position: Point, max_distance: f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, node) in nodes.iter().enumerate() {
        let distance = node.bbox().distance_to_point(position);
        if distance > max_distance {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_idx, best_distance)) => {
                distance < best_distance
                    || (distance == best_distance && node.area() > nodes[best_idx].area())
            }
        };
        if better {
            best = Some((idx, distance));
        }
    }
    best.map(|(idx, _)| idx)
}
