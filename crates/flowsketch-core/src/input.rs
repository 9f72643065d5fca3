//! Detection records consumed by the analysis pipeline.
//!
//! A [`DetectionInput`] bundles everything the upstream vision passes found
//! in one image: candidate shapes, OCR text fragments and connector hints.
//! Records are validated up front with [`DetectionInput::validate`] so that
//! later stages can rely on finite geometry and normalized confidences.

use std::f32::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, InputError, RecordRef},
    geometry::{Bounds, Point, polygon_area, polygon_perimeter},
    semantic::ShapeKind,
};

/// A candidate shape as reported by the detector.
///
/// Metrics that the detector did not supply are derived from the contour or
/// the bounding box on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShape {
    bbox: Bounds,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    contour: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    area: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    perimeter: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    circularity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vertices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<ShapeKind>,
    confidence: f32,
}

impl RawShape {
    /// Creates a shape with only a bounding box and a confidence.
    pub fn new(bbox: Bounds, confidence: f32) -> Self {
        Self {
            bbox,
            contour: Vec::new(),
            area: None,
            perimeter: None,
            circularity: None,
            vertices: None,
            kind: None,
            confidence,
        }
    }

    /// Sets the declared shape kind.
    pub fn with_kind(mut self, kind: ShapeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the contour polygon.
    pub fn with_contour(mut self, contour: Vec<Point>) -> Self {
        self.contour = contour;
        self
    }

    /// Sets the declared area.
    pub fn with_area(mut self, area: f32) -> Self {
        self.area = Some(area);
        self
    }

    /// Sets the vertex count of the simplified contour.
    pub fn with_vertices(mut self, vertices: u32) -> Self {
        self.vertices = Some(vertices);
        self
    }

    pub fn bbox(&self) -> Bounds {
        self.bbox
    }

    pub fn contour(&self) -> &[Point] {
        &self.contour
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Area in px²: declared, else the contour polygon area, else the bbox area.
    pub fn area(&self) -> f32 {
        if let Some(area) = self.area {
            return area;
        }
        let contour_area = polygon_area(&self.contour);
        if contour_area > 0.0 {
            contour_area
        } else {
            self.bbox.area()
        }
    }

    /// Perimeter in px: declared, else the contour perimeter, else the bbox perimeter.
    pub fn perimeter(&self) -> f32 {
        if let Some(perimeter) = self.perimeter {
            return perimeter;
        }
        if self.contour.len() >= 3 {
            polygon_perimeter(&self.contour)
        } else {
            2.0 * (self.bbox.width() + self.bbox.height())
        }
    }

    /// Circularity `4πA/P²`.
    ///
    /// Only available when declared or when a contour was supplied; a bare
    /// bounding box says nothing about roundness.
    pub fn circularity(&self) -> Option<f32> {
        if self.circularity.is_some() {
            return self.circularity;
        }
        if self.contour.len() < 3 {
            return None;
        }
        let perimeter = self.perimeter();
        (perimeter > 0.0).then(|| 4.0 * PI * self.area() / (perimeter * perimeter))
    }

    /// Width over height of the bounding box.
    pub fn aspect_ratio(&self) -> f32 {
        self.bbox.to_size().aspect_ratio()
    }

    /// Declared kind, or one inferred from the available metrics.
    pub fn kind(&self) -> ShapeKind {
        if let Some(kind) = self.kind {
            return kind;
        }

        let vertices = self.vertices.or_else(|| {
            (self.contour.len() >= 3).then_some(self.contour.len() as u32)
        });
        let bbox_area = self.bbox.area();
        let fill_ratio = if bbox_area > 0.0 {
            (self.area() / bbox_area).min(1.0)
        } else {
            0.0
        };
        ShapeKind::infer(
            self.circularity().unwrap_or(0.0),
            vertices,
            self.aspect_ratio(),
            fill_ratio,
        )
    }
}

/// A recognized text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrFragment {
    text: String,
    bbox: Bounds,
    confidence: f32,
}

impl OcrFragment {
    pub fn new(text: impl Into<String>, bbox: Bounds, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bbox(&self) -> Bounds {
        self.bbox
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Evidence that two nodes are connected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyHint {
    /// A detected line segment; segments are joined into connectors and
    /// snapped to nodes by the connector resolver.
    Segment { from: Point, to: Point },
    /// An explicit link between two shapes, named by their index in
    /// [`DetectionInput::shapes`].
    ///
    /// Indices refer to the raw records, so they stay valid when shapes are
    /// merged or filtered; the connector resolver maps them to node ids.
    Link {
        source: usize,
        target: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

/// Everything detected in one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionInput {
    pub shapes: Vec<RawShape>,
    pub fragments: Vec<OcrFragment>,
    pub hints: Vec<AdjacencyHint>,
}

impl DetectionInput {
    /// Checks every record and reports all problems at once.
    ///
    /// # Returns
    ///
    /// The warnings on success, or an [`InputError`] carrying every
    /// diagnostic when at least one record is malformed.
    pub fn validate(&self) -> Result<Vec<Diagnostic>, InputError> {
        let mut collector = DiagnosticCollector::new();

        for (idx, shape) in self.shapes.iter().enumerate() {
            validate_shape(&mut collector, idx, shape);
        }
        for (idx, fragment) in self.fragments.iter().enumerate() {
            validate_fragment(&mut collector, idx, fragment);
        }
        for (idx, hint) in self.hints.iter().enumerate() {
            validate_hint(&mut collector, idx, hint, self.shapes.len());
        }

        debug!(
            shapes = self.shapes.len(),
            fragments = self.fragments.len(),
            hints = self.hints.len(),
            has_errors = collector.has_errors();
            "Validated detection input"
        );
        collector.finish()
    }
}

fn is_unit_interval(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

fn validate_shape(collector: &mut DiagnosticCollector, idx: usize, shape: &RawShape) {
    let record = RecordRef::Shape(idx);

    if !shape.bbox.is_valid() {
        collector.emit(
            Diagnostic::error("bounding box must be finite with a non-negative extent")
                .with_code(ErrorCode::E001)
                .with_record(record),
        );
    } else if shape.bbox.width() == 0.0 || shape.bbox.height() == 0.0 {
        collector.emit(
            Diagnostic::error("bounding box has zero width or height")
                .with_code(ErrorCode::E003)
                .with_record(record),
        );
    }

    if !is_unit_interval(shape.confidence) {
        collector.emit(
            Diagnostic::error(format!(
                "confidence {} is outside [0, 1]",
                shape.confidence
            ))
            .with_code(ErrorCode::E002)
            .with_record(record)
            .with_help("detector confidences must be normalized"),
        );
    }

    let metrics = [
        ("area", shape.area),
        ("perimeter", shape.perimeter),
        ("circularity", shape.circularity),
    ];
    for (name, value) in metrics {
        let Some(value) = value else {
            continue;
        };
        if !value.is_finite() || value < 0.0 {
            collector.emit(
                Diagnostic::error(format!("{name} {value} must be finite and non-negative"))
                    .with_code(ErrorCode::E004)
                    .with_record(record),
            );
        }
    }

    if let Some(vertex) = shape.contour.iter().position(|p| !p.is_finite()) {
        collector.emit(
            Diagnostic::error(format!("contour point {vertex} is not finite"))
                .with_code(ErrorCode::E005)
                .with_record(record),
        );
    }
}

fn validate_fragment(collector: &mut DiagnosticCollector, idx: usize, fragment: &OcrFragment) {
    let record = RecordRef::Fragment(idx);

    if !fragment.bbox.is_valid() {
        collector.emit(
            Diagnostic::error("bounding box must be finite with a non-negative extent")
                .with_code(ErrorCode::E100)
                .with_record(record),
        );
    }

    if !is_unit_interval(fragment.confidence) {
        collector.emit(
            Diagnostic::error(format!(
                "confidence {} is outside [0, 1]",
                fragment.confidence
            ))
            .with_code(ErrorCode::E101)
            .with_record(record)
            .with_help("OCR confidences must be normalized, divide percentages by 100"),
        );
    }

    if fragment.text.trim().is_empty() {
        collector.emit(
            Diagnostic::warning("text is blank")
                .with_code(ErrorCode::E102)
                .with_record(record)
                .with_help("the fragment is ignored"),
        );
    }
}

fn validate_hint(
    collector: &mut DiagnosticCollector,
    idx: usize,
    hint: &AdjacencyHint,
    shape_count: usize,
) {
    let record = RecordRef::Hint(idx);

    match hint {
        AdjacencyHint::Segment { from, to } => {
            if !from.is_finite() || !to.is_finite() {
                collector.emit(
                    Diagnostic::error("segment endpoints must be finite")
                        .with_code(ErrorCode::E200)
                        .with_record(record),
                );
            } else if from == to {
                collector.emit(
                    Diagnostic::warning("segment has zero length")
                        .with_code(ErrorCode::E201)
                        .with_record(record),
                );
            }
        }
        AdjacencyHint::Link { source, target, .. } => {
            for shape in [source, target] {
                if *shape >= shape_count {
                    collector.emit(
                        Diagnostic::error(format!(
                            "link references shape {shape}, but only {shape_count} shapes were given"
                        ))
                        .with_code(ErrorCode::E202)
                        .with_record(record)
                        .with_help("link endpoints are indices into `shapes`"),
                    );
                }
            }
        }
    }
}
