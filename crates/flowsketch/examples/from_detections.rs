//! Example: Analyzing detections built in code
//!
//! This example assembles detector output by hand, without a JSON file,
//! and prints the narrative and the Graphviz rendering of the result.

use flowsketch::{
    Analyzer,
    config::{AppConfig, DetectionConfig, GraphConfig, LabelConfig, NarrativeConfig},
    export,
    geometry::{Bounds, Point},
    input::{AdjacencyHint, DetectionInput, OcrFragment, RawShape},
    semantic::ShapeKind,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Analyzing hand-built detections...\n");

    // A login check: start, a decision, and two outcomes. The decision is
    // reported as a bare contour so its kind is inferred.
    let diamond = vec![
        Point::new(150.0, 150.0),
        Point::new(200.0, 200.0),
        Point::new(150.0, 250.0),
        Point::new(100.0, 200.0),
    ];
    let shapes = vec![
        RawShape::new(Bounds::from_xywh(120.0, 0.0, 60.0, 60.0), 0.9).with_kind(ShapeKind::Circle),
        RawShape::new(Bounds::from_xywh(100.0, 150.0, 100.0, 100.0), 0.8).with_contour(diamond),
        RawShape::new(Bounds::from_xywh(0.0, 350.0, 120.0, 50.0), 0.9)
            .with_kind(ShapeKind::Rectangle),
        RawShape::new(Bounds::from_xywh(200.0, 350.0, 120.0, 50.0), 0.9)
            .with_kind(ShapeKind::Rectangle),
    ];

    let fragments = vec![
        OcrFragment::new("Start", Bounds::from_xywh(130.0, 24.0, 40.0, 12.0), 0.9),
        OcrFragment::new("Password ok?", Bounds::from_xywh(110.0, 194.0, 80.0, 12.0), 0.9),
        OcrFragment::new("Show error", Bounds::from_xywh(20.0, 369.0, 80.0, 12.0), 0.9),
        OcrFragment::new("Open session", Bounds::from_xywh(220.0, 369.0, 80.0, 12.0), 0.9),
    ];

    // Links name shapes by their index above
    let link = |source: usize, target: usize, label: Option<&str>| AdjacencyHint::Link {
        source,
        target,
        label: label.map(str::to_string),
    };
    let hints = vec![
        link(0, 1, None),
        link(1, 2, Some("No")),
        link(1, 3, Some("Yes")),
    ];

    let input = DetectionInput {
        shapes,
        fragments,
        hints,
    };

    // Stricter detection than the defaults
    let config = AppConfig::new(
        DetectionConfig::default().with_min_confidence(0.6),
        LabelConfig::default(),
        GraphConfig::default(),
        NarrativeConfig::default(),
    );
    let analysis = Analyzer::new(config).analyze(&input)?;

    println!("{}", export::to_text(&analysis));
    println!("{}", export::to_dot(&analysis.graph));

    Ok(())
}
