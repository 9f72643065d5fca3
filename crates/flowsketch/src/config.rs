//! Configuration types for flowsketch analysis.
//!
//! This module provides the thresholds that control every pipeline stage.
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources; any field left out keeps its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`DetectionConfig`] - Confidence guard, merging and noise thresholds.
//! - [`LabelConfig`] - Text confidence, attachment distance and terminal vocabulary.
//! - [`GraphConfig`] - Connector resolution and edge assembly settings.
//! - [`NarrativeConfig`] - Rendering of branch lines.
//!
//! # Example
//!
//! ```
//! # use flowsketch::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.detection().min_confidence(), 0.4);
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

/// Top-level configuration combining every pipeline section.
///
/// The same immutable value is handed to each stage of one analysis.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Shape detection section.
    #[serde(default)]
    detection: DetectionConfig,

    /// Label association section.
    #[serde(default)]
    labels: LabelConfig,

    /// Graph assembly section.
    #[serde(default)]
    graph: GraphConfig,

    /// Narrative section.
    #[serde(default)]
    narrative: NarrativeConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        detection: DetectionConfig,
        labels: LabelConfig,
        graph: GraphConfig,
        narrative: NarrativeConfig,
    ) -> Self {
        Self {
            detection,
            labels,
            graph,
            narrative,
        }
    }

    /// Returns the detection configuration.
    pub fn detection(&self) -> &DetectionConfig {
        &self.detection
    }

    /// Returns the label configuration.
    pub fn labels(&self) -> &LabelConfig {
        &self.labels
    }

    /// Returns the graph configuration.
    pub fn graph(&self) -> &GraphConfig {
        &self.graph
    }

    /// Returns the narrative configuration.
    pub fn narrative(&self) -> &NarrativeConfig {
        &self.narrative
    }

    /// Checks that every threshold lies in its meaningful range.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        let fractions = [
            ("detection.min_confidence", self.detection.min_confidence),
            ("detection.merge_overlap", self.detection.merge_overlap),
            ("labels.min_text_confidence", self.labels.min_text_confidence),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0, 1], got {value}"));
            }
        }

        let distances = [
            (
                "detection.merge_distance_factor",
                self.detection.merge_distance_factor,
            ),
            ("detection.min_area", self.detection.min_area),
            ("labels.attach_distance", self.labels.attach_distance),
            ("graph.edge_label_distance", self.graph.edge_label_distance),
            ("graph.segment_join_distance", self.graph.segment_join_distance),
            ("graph.snap_distance", self.graph.snap_distance),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }

        let max_aspect_ratio = self.detection.max_aspect_ratio;
        if max_aspect_ratio.is_nan() || max_aspect_ratio < 1.0 {
            return Err(format!(
                "detection.max_aspect_ratio must be at least 1, got {max_aspect_ratio}"
            ));
        }

        Ok(())
    }
}

/// Thresholds for turning raw shapes into logical nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Raw shapes below this detector confidence are dropped.
    min_confidence: f32,

    /// Intersection over the smaller area above which two shapes merge.
    merge_overlap: f32,

    /// Two shapes merge when their centers are closer than this factor
    /// times the smaller bounding box diagonal.
    merge_distance_factor: f32,

    /// Merged nodes smaller than this area (px²) are treated as noise.
    min_area: f32,

    /// Shapes whose aspect ratio exceeds this value (or its inverse) are
    /// treated as stray strokes.
    max_aspect_ratio: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.4,
            merge_overlap: 0.4,
            merge_distance_factor: 0.5,
            min_area: 500.0,
            max_aspect_ratio: 10.0,
        }
    }
}

impl DetectionConfig {
    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    pub fn merge_overlap(&self) -> f32 {
        self.merge_overlap
    }

    pub fn merge_distance_factor(&self) -> f32 {
        self.merge_distance_factor
    }

    pub fn min_area(&self) -> f32 {
        self.min_area
    }

    pub fn max_aspect_ratio(&self) -> f32 {
        self.max_aspect_ratio
    }

    /// Sets the confidence guard threshold.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Sets the noise area threshold.
    pub fn with_min_area(mut self, min_area: f32) -> Self {
        self.min_area = min_area;
        self
    }
}

/// Settings for attaching recognized text to nodes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// OCR fragments below this confidence are ignored.
    min_text_confidence: f32,

    /// Maximum distance (px) from a fragment center to a node box.
    attach_distance: f32,

    /// Label words that mark a start terminal, compared case-insensitively.
    start_words: Vec<String>,

    /// Label words that mark an end terminal, compared case-insensitively.
    end_words: Vec<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            min_text_confidence: 0.3,
            attach_distance: 20.0,
            start_words: vec!["start".to_string()],
            end_words: vec!["end".to_string()],
        }
    }
}

impl LabelConfig {
    pub fn min_text_confidence(&self) -> f32 {
        self.min_text_confidence
    }

    pub fn attach_distance(&self) -> f32 {
        self.attach_distance
    }

    pub fn start_words(&self) -> &[String] {
        &self.start_words
    }

    pub fn end_words(&self) -> &[String] {
        &self.end_words
    }

    /// Sets the start vocabulary.
    pub fn with_start_words(mut self, words: Vec<String>) -> Self {
        self.start_words = words;
        self
    }

    /// Sets the end vocabulary.
    pub fn with_end_words(mut self, words: Vec<String>) -> Self {
        self.end_words = words;
        self
    }
}

/// Settings for connector resolution and edge assembly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Keep edges whose source and target are the same node.
    allow_self_loops: bool,

    /// Maximum distance (px) from a pending label to an edge.
    edge_label_distance: f32,

    /// Segments with endpoints closer than this (px) form one connector.
    segment_join_distance: f32,

    /// Maximum distance (px) from a connector end to the node it snaps to.
    snap_distance: f32,

    /// Upper bound on the number of enumerated start-to-end paths.
    max_paths: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            allow_self_loops: false,
            edge_label_distance: 80.0,
            segment_join_distance: 30.0,
            snap_distance: 150.0,
            max_paths: 64,
        }
    }
}

impl GraphConfig {
    pub fn allow_self_loops(&self) -> bool {
        self.allow_self_loops
    }

    pub fn edge_label_distance(&self) -> f32 {
        self.edge_label_distance
    }

    pub fn segment_join_distance(&self) -> f32 {
        self.segment_join_distance
    }

    pub fn snap_distance(&self) -> f32 {
        self.snap_distance
    }

    pub fn max_paths(&self) -> usize {
        self.max_paths
    }

    /// Sets whether self-loops survive assembly.
    pub fn with_allow_self_loops(mut self, allow: bool) -> Self {
        self.allow_self_loops = allow;
        self
    }

    /// Sets the bound on enumerated start-to-end paths.
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }
}

/// Rendering settings for narrative lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// Number of spaces before a branch line.
    branch_indent: usize,

    /// Marker that opens a branch line.
    branch_marker: String,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            branch_indent: 2,
            branch_marker: "↳".to_string(),
        }
    }
}

impl NarrativeConfig {
    pub fn branch_indent(&self) -> usize {
        self.branch_indent
    }

    pub fn branch_marker(&self) -> &str {
        &self.branch_marker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.detection().min_confidence(), 0.4);
        assert_eq!(config.detection().merge_overlap(), 0.4);
        assert_eq!(config.detection().min_area(), 500.0);
        assert_eq!(config.labels().attach_distance(), 20.0);
        assert_eq!(config.labels().start_words(), ["start".to_string()]);
        assert!(!config.graph().allow_self_loops());
        assert_eq!(config.graph().edge_label_distance(), 80.0);
        assert_eq!(config.narrative().branch_marker(), "↳");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"detection": {"min_area": 100}, "graph": {"allow_self_loops": true}}"#,
        )
        .unwrap();

        assert_eq!(config.detection().min_area(), 100.0);
        assert_eq!(config.detection().min_confidence(), 0.4);
        assert!(config.graph().allow_self_loops());
        assert_eq!(config.graph().snap_distance(), 150.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = AppConfig::new(
            DetectionConfig::default().with_min_confidence(1.5),
            LabelConfig::default(),
            GraphConfig::default(),
            NarrativeConfig::default(),
        );

        let err = config.validate().unwrap_err();
        assert!(err.contains("detection.min_confidence"));
    }

    #[test]
    fn test_validate_rejects_negative_area() {
        let config = AppConfig::new(
            DetectionConfig::default().with_min_area(-1.0),
            LabelConfig::default(),
            GraphConfig::default(),
            NarrativeConfig::default(),
        );

        assert!(config.validate().unwrap_err().contains("detection.min_area"));
    }
}
