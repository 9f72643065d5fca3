//! Semantic vocabulary of the analysis pipeline.
//!
//! - [`ShapeKind`] - Geometric category of a detected shape
//! - [`SemanticClass`] - Flowchart role assigned to a node
//! - [`Polarity`] - Meaning of a decision-edge label
//! - [`GraphType`] - Structural category of an assembled graph
//!
//! All enums use the same lowercase names in configuration files,
//! serialized output and their [`Display`](fmt::Display) implementations.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Geometric category of a detected shape.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    Ellipse,
    Rectangle,
    Diamond,
    Parallelogram,
    Polygon,
    #[default]
    Unknown,
}

impl ShapeKind {
    /// Returns true for round shapes used as flowchart terminals.
    pub fn is_circular(self) -> bool {
        matches!(self, Self::Circle | Self::Ellipse)
    }

    /// Infers a shape kind from contour metrics.
    ///
    /// Four-vertex contours are classified by fill and aspect ratio, other
    /// contours by circularity and then vertex count.
    ///
    /// # Arguments
    ///
    /// * `circularity` - `4πA/P²`, 1.0 for a perfect circle
    /// * `vertices` - Vertex count of the simplified contour, if known
    /// * `aspect_ratio` - Bounding box width divided by height
    /// * `fill_ratio` - Contour area divided by bounding box area
    ///
    /// # Examples
    ///
    /// ```
    /// use flowsketch_core::semantic::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::infer(0.9, None, 1.0, 0.78), ShapeKind::Circle);
    /// assert_eq!(ShapeKind::infer(0.5, Some(4), 1.0, 0.5), ShapeKind::Diamond);
    /// assert_eq!(ShapeKind::infer(0.5, Some(4), 2.0, 1.0), ShapeKind::Rectangle);
    /// ```
    pub fn infer(circularity: f32, vertices: Option<u32>, aspect_ratio: f32, fill_ratio: f32) -> Self {
        // Quadrilaterals first: a square or rhombus has circularity π/4 and
        // would otherwise read as an ellipse.
        if vertices == Some(4) {
            // A rhombus covers half of its bounding box, a skewed
            // quadrilateral somewhere between that and a full rectangle.
            return if fill_ratio <= 0.75 && aspect_ratio > 0.8 && aspect_ratio < 1.2 {
                Self::Diamond
            } else if fill_ratio <= 0.9 {
                Self::Parallelogram
            } else {
                Self::Rectangle
            };
        }

        if circularity > 0.85 {
            Self::Circle
        } else if circularity > 0.6 {
            Self::Ellipse
        } else if vertices.is_some_and(|n| n >= 5) {
            Self::Polygon
        } else {
            Self::Unknown
        }
    }
}

impl FromStr for ShapeKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circle" => Ok(Self::Circle),
            "ellipse" | "oval" => Ok(Self::Ellipse),
            "rectangle" => Ok(Self::Rectangle),
            "diamond" | "rhombus" => Ok(Self::Diamond),
            "parallelogram" => Ok(Self::Parallelogram),
            "polygon" => Ok(Self::Polygon),
            "unknown" => Ok(Self::Unknown),
            _ => Err("Unsupported shape kind"),
        }
    }
}

impl From<ShapeKind> for &'static str {
    fn from(val: ShapeKind) -> Self {
        match val {
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Diamond => "diamond",
            ShapeKind::Parallelogram => "parallelogram",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Flowchart role of a node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticClass {
    Start,
    End,
    Process,
    Decision,
    Data,
    #[default]
    Unknown,
}

impl SemanticClass {
    /// Phrase used in the narrative when a node carries no label.
    pub fn default_phrase(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::End => "End",
            Self::Process => "Process",
            Self::Decision => "Decision",
            Self::Data => "Data",
            Self::Unknown => "Step",
        }
    }
}

impl FromStr for SemanticClass {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "process" => Ok(Self::Process),
            "decision" => Ok(Self::Decision),
            "data" => Ok(Self::Data),
            "unknown" => Ok(Self::Unknown),
            _ => Err("Unsupported semantic class"),
        }
    }
}

impl From<SemanticClass> for &'static str {
    fn from(val: SemanticClass) -> Self {
        match val {
            SemanticClass::Start => "start",
            SemanticClass::End => "end",
            SemanticClass::Process => "process",
            SemanticClass::Decision => "decision",
            SemanticClass::Data => "data",
            SemanticClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SemanticClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Logical meaning of an edge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Yes,
    No,
    True,
    False,
    Other,
}

impl Polarity {
    /// Classifies a label by its normalized text.
    ///
    /// Matching ignores case, surrounding whitespace and trailing
    /// punctuation; anything outside the closed vocabulary is [`Polarity::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use flowsketch_core::semantic::Polarity;
    ///
    /// assert_eq!(Polarity::from_label(" YES! "), Polarity::Yes);
    /// assert_eq!(Polarity::from_label("false"), Polarity::False);
    /// assert_eq!(Polarity::from_label("retry"), Polarity::Other);
    /// ```
    pub fn from_label(text: &str) -> Self {
        Self::from_vocabulary(text).unwrap_or(Self::Other)
    }

    /// Returns the polarity only if the text belongs to the decision-outcome
    /// vocabulary {yes, no, true, false}.
    pub fn from_vocabulary(text: &str) -> Option<Self> {
        let word = text
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_punctuation())
            .to_ascii_lowercase();
        match word.as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            _ => None,
        }
    }

    /// Branch ordering priority: affirmative outcomes first.
    pub fn priority(self) -> u8 {
        match self {
            Self::Yes | Self::True => 0,
            Self::No | Self::False => 1,
            Self::Other => 2,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::True => "true",
            Self::False => "false",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Structural category of an assembled graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphType {
    #[default]
    DirectedAcyclic,
    DirectedCyclic,
    Disconnected,
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DirectedAcyclic => "directed-acyclic",
            Self::DirectedCyclic => "directed-cyclic",
            Self::Disconnected => "disconnected",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_round_trip_names() {
        for kind in [
            ShapeKind::Circle,
            ShapeKind::Ellipse,
            ShapeKind::Rectangle,
            ShapeKind::Diamond,
            ShapeKind::Parallelogram,
            ShapeKind::Polygon,
            ShapeKind::Unknown,
        ] {
            assert_eq!(kind.to_string().parse::<ShapeKind>(), Ok(kind));
        }
        assert_eq!("oval".parse::<ShapeKind>(), Ok(ShapeKind::Ellipse));
        assert!("hexagon".parse::<ShapeKind>().is_err());
    }

    #[test]
    fn test_shape_kind_infer_round_shapes() {
        assert_eq!(ShapeKind::infer(0.9, Some(8), 1.0, 0.78), ShapeKind::Circle);
        assert_eq!(ShapeKind::infer(0.7, Some(8), 2.0, 0.78), ShapeKind::Ellipse);
    }

    #[test]
    fn test_shape_kind_infer_quadrilaterals() {
        assert_eq!(ShapeKind::infer(0.5, Some(4), 1.0, 0.5), ShapeKind::Diamond);
        assert_eq!(ShapeKind::infer(0.5, Some(4), 2.5, 0.7), ShapeKind::Parallelogram);
        assert_eq!(ShapeKind::infer(0.5, Some(4), 2.5, 0.98), ShapeKind::Rectangle);
        // A filled square is a rectangle, not a diamond
        assert_eq!(ShapeKind::infer(0.5, Some(4), 1.0, 1.0), ShapeKind::Rectangle);
    }

    #[test]
    fn test_shape_kind_infer_other() {
        assert_eq!(ShapeKind::infer(0.4, Some(6), 1.0, 0.8), ShapeKind::Polygon);
        assert_eq!(ShapeKind::infer(0.4, Some(3), 1.0, 0.5), ShapeKind::Unknown);
        assert_eq!(ShapeKind::infer(0.4, None, 1.0, 0.5), ShapeKind::Unknown);
    }

    #[test]
    fn test_semantic_class_names() {
        assert_eq!(SemanticClass::Decision.to_string(), "decision");
        assert_eq!("data".parse::<SemanticClass>(), Ok(SemanticClass::Data));
        assert_eq!(SemanticClass::Unknown.default_phrase(), "Step");
    }

    #[test]
    fn test_polarity_vocabulary() {
        assert_eq!(Polarity::from_vocabulary("Yes"), Some(Polarity::Yes));
        assert_eq!(Polarity::from_vocabulary("NO."), Some(Polarity::No));
        assert_eq!(Polarity::from_vocabulary("True"), Some(Polarity::True));
        assert_eq!(Polarity::from_vocabulary("false?"), Some(Polarity::False));
        assert_eq!(Polarity::from_vocabulary("Yesterday"), None);
        assert_eq!(Polarity::from_label("maybe"), Polarity::Other);
    }

    #[test]
    fn test_polarity_priority() {
        assert!(Polarity::Yes.priority() < Polarity::No.priority());
        assert_eq!(Polarity::True.priority(), Polarity::Yes.priority());
        assert!(Polarity::False.priority() < Polarity::Other.priority());
    }

    #[test]
    fn test_graph_type_serde_names() {
        let json = serde_json::to_string(&GraphType::DirectedAcyclic).unwrap();
        assert_eq!(json, "\"directed-acyclic\"");
        assert_eq!(GraphType::Disconnected.to_string(), "disconnected");
    }
}
