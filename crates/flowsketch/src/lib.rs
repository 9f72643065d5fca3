//! Flowsketch - Turns diagram detections into a directed graph and a narrative.
//!
//! The pipeline consumes what vision passes found in one image of a
//! flowchart-like diagram (candidate shapes, OCR text, connector hints) and
//! produces a validated directed graph plus a step-by-step description:
//!
//! 1. [`detect`] merges fragmented shapes into logical nodes
//! 2. [`label`] attaches text to nodes or sets it aside for edges
//! 3. [`connect`] turns connector hints into edge candidates
//! 4. [`classify`] assigns flowchart roles and edge polarity
//! 5. [`graph`] assembles the graph and checks its integrity
//! 6. [`narrative`] walks the graph from its start node
//!
//! [`Analyzer`] runs all stages with one configuration.

pub mod classify;
pub mod config;
pub mod connect;
pub mod detect;
pub mod export;
pub mod graph;
pub mod label;
pub mod narrative;

mod disjoint_set;
mod error;

pub use flowsketch_core::{element, geometry, identifier, input, semantic};

pub use error::FlowError;

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use flowsketch_core::input::DetectionInput;

use classify::Classifier;
use config::AppConfig;
use connect::{ConnectorResolver, ConnectorStats};
use detect::{DetectionStats, ShapeMerger};
use graph::{Graph, GraphBuilder};
use label::{LabelAssociator, LabelStats};
use narrative::{Narrative, NarrativeGenerator};

/// Per-stage counters of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub detection: DetectionStats,
    pub labels: LabelStats,
    pub connectors: ConnectorStats,
    /// Input warnings, such as blank OCR fragments or links to discarded
    /// shapes.
    #[serde(default)]
    pub input_warnings: Vec<String>,
}

/// Result of one analysis: the graph, its narrative and stage statistics.
///
/// Serializes as `{ nodes, edges, metadata, narrative, stats }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(flatten)]
    pub graph: Graph,
    pub narrative: Narrative,
    pub stats: AnalysisStats,
}

/// Runs the analysis pipeline.
///
/// # Examples
///
/// ```rust
/// use flowsketch::{Analyzer, config::AppConfig};
///
/// let source = r#"{
///     "shapes": [
///         {"bbox": {"x": 0, "y": 0, "w": 80, "h": 80}, "kind": "circle", "confidence": 0.9},
///         {"bbox": {"x": 0, "y": 200, "w": 120, "h": 60}, "kind": "rectangle", "confidence": 0.8}
///     ],
///     "fragments": [
///         {"text": "Start", "bbox": {"x": 20, "y": 30, "w": 40, "h": 20}, "confidence": 0.9},
///         {"text": "Load data", "bbox": {"x": 20, "y": 220, "w": 80, "h": 20}, "confidence": 0.9}
///     ],
///     "hints": [
///         {"segment": {"from": {"x": 40, "y": 85}, "to": {"x": 40, "y": 195}}}
///     ]
/// }"#;
///
/// let analyzer = Analyzer::new(AppConfig::default());
/// let input = analyzer.parse_input(source).expect("Failed to parse input");
/// let analysis = analyzer.analyze(&input).expect("Failed to analyze");
///
/// assert_eq!(analysis.graph.edges().len(), 1);
/// assert_eq!(analysis.narrative.lines(), ["Step 1: Start", "Step 2: Load data"]);
/// ```
#[derive(Debug, Default)]
pub struct Analyzer {
    config: AppConfig,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a JSON document into detection input.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Serialization`] if the document does not match
    /// the input format.
    pub fn parse_input(&self, source: &str) -> Result<DetectionInput, FlowError> {
        info!("Parsing detection input");
        let input: DetectionInput = serde_json::from_str(source)?;
        debug!(
            shapes = input.shapes.len(),
            fragments = input.fragments.len(),
            hints = input.hints.len();
            "Detection input parsed"
        );
        Ok(input)
    }

    /// Run every stage over `input`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Input`] for malformed records, including links to
    /// shape indices that do not exist, and [`FlowError::Integrity`] if an
    /// edge names an unknown node. Everything else, including an empty
    /// result, is reported inside the analysis.
    pub fn analyze(&self, input: &DetectionInput) -> Result<Analysis, FlowError> {
        let warnings = input.validate()?;
        for warning in &warnings {
            warn!(warning:%; "Input warning");
        }

        let detection = ShapeMerger::new(self.config.detection()).merge(&input.shapes);

        let assignment =
            LabelAssociator::new(self.config.labels()).associate(&input.fragments, detection.nodes);

        let connection = ConnectorResolver::new(self.config.graph())
            .resolve(&input.hints, &assignment.nodes);

        let classifier = Classifier::new(self.config.labels());
        let mut nodes = assignment.nodes;
        let mut candidates = connection.candidates;
        classifier.classify_nodes(&mut nodes, &candidates);
        classifier.classify_edges(&mut candidates);

        let graph = GraphBuilder::new(self.config.graph()).build(
            nodes,
            candidates,
            assignment.pending,
            input.shapes.len(),
        )?;

        let narrative = NarrativeGenerator::new(self.config.narrative()).generate(&graph);
        info!(steps = narrative.len(); "Analysis complete");
        trace!(narrative:?; "Narrative");

        Ok(Analysis {
            graph,
            narrative,
            stats: AnalysisStats {
                detection: detection.stats,
                labels: assignment.stats,
                connectors: connection.stats,
                input_warnings: warnings
                    .iter()
                    .chain(&connection.warnings)
                    .map(ToString::to_string)
                    .collect(),
            },
        })
    }

    /// Parse and analyze a JSON document.
    pub fn analyze_json(&self, source: &str) -> Result<Analysis, FlowError> {
        let input = self.parse_input(source)?;
        self.analyze(&input)
    }
}
