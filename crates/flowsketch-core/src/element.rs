//! Graph elements produced by the pipeline.
//!
//! A [`LogicalNode`] is created by the shape merger with its geometry fixed;
//! later stages only fill in its labels and semantic class. An [`Edge`]
//! connects two nodes by id.

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, Point},
    identifier::NodeId,
    semantic::{Polarity, SemanticClass, ShapeKind},
};

/// One diagram element after fragment merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalNode {
    id: NodeId,
    #[serde(rename = "type")]
    kind: ShapeKind,
    #[serde(default)]
    semantic_class: SemanticClass,
    center: Point,
    bbox: Bounds,
    area: f32,
    confidence: f32,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    sources: Vec<usize>,
}

impl LogicalNode {
    /// Creates an unlabeled, unclassified node centered on its bounding box.
    pub fn new(
        id: NodeId,
        kind: ShapeKind,
        bbox: Bounds,
        area: f32,
        confidence: f32,
        sources: Vec<usize>,
    ) -> Self {
        Self {
            id,
            kind,
            semantic_class: SemanticClass::Unknown,
            center: bbox.center(),
            bbox,
            area,
            confidence,
            labels: Vec::new(),
            sources,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn semantic_class(&self) -> SemanticClass {
        self.semantic_class
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn bbox(&self) -> Bounds {
        self.bbox
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Label texts in reading order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Indices of the raw shapes merged into this node, ascending.
    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    /// Labels joined by a space, `None` when unlabeled.
    pub fn label_text(&self) -> Option<String> {
        (!self.labels.is_empty()).then(|| self.labels.join(" "))
    }

    pub fn set_semantic_class(&mut self, class: SemanticClass) {
        self.semantic_class = class;
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    polarity: Option<Polarity>,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            label: None,
            polarity: None,
        }
    }

    /// Sets the label; blank labels are treated as absent.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn polarity(&self) -> Option<Polarity> {
        self.polarity
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        let trimmed = label.trim();
        self.label = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn set_polarity(&mut self, polarity: Option<Polarity>) {
        self.polarity = polarity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u32) -> NodeId {
        NodeId::from_ordinal(n)
    }

    #[test]
    fn test_node_center_follows_bbox() {
        let bbox = Bounds::from_xywh(10.0, 20.0, 40.0, 60.0);
        let logical = LogicalNode::new(node(1), ShapeKind::Rectangle, bbox, 2400.0, 0.9, vec![0]);

        assert_eq!(logical.center(), Point::new(30.0, 50.0));
        assert_eq!(logical.semantic_class(), SemanticClass::Unknown);
        assert!(logical.label_text().is_none());
    }

    #[test]
    fn test_node_label_text() {
        let bbox = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        let mut logical = LogicalNode::new(node(1), ShapeKind::Rectangle, bbox, 100.0, 0.9, vec![0]);
        logical.set_labels(vec!["Process".to_string(), "A".to_string()]);

        assert_eq!(logical.label_text().as_deref(), Some("Process A"));
    }

    #[test]
    fn test_node_serializes_kind_as_type() {
        let bbox = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
        let logical = LogicalNode::new(node(2), ShapeKind::Diamond, bbox, 50.0, 0.7, vec![1, 3]);

        let value = serde_json::to_value(&logical).unwrap();
        assert_eq!(value["id"], "node_2");
        assert_eq!(value["type"], "diamond");
        assert_eq!(value["semantic_class"], "unknown");
        assert_eq!(value["bbox"]["w"], 10.0);

        let back: LogicalNode = serde_json::from_value(value).unwrap();
        assert_eq!(back, logical);
    }

    #[test]
    fn test_edge_blank_label_is_absent() {
        let edge = Edge::new(node(1), node(2)).with_label("  ");
        assert!(edge.label().is_none());

        let edge = Edge::new(node(1), node(2)).with_label(" Yes ");
        assert_eq!(edge.label(), Some("Yes"));
    }

    #[test]
    fn test_edge_omits_missing_label() {
        let json = serde_json::to_string(&Edge::new(node(1), node(1))).unwrap();
        assert_eq!(json, r#"{"source":"node_1","target":"node_1"}"#);
    }
}
