//! Output formats for a finished analysis.
//!
//! - [`Format::Json`] - The full [`Analysis`] as pretty-printed JSON
//! - [`Format::Dot`] - The graph as Graphviz DOT
//! - [`Format::Text`] - The narrative followed by any warnings

use std::{fmt, str::FromStr};

use petgraph::{dot::Dot, graph::DiGraph};
use flowsketch_core::identifier::NodeId;

use crate::{Analysis, FlowError, graph::Graph, narrative::phrase};

/// Line printed when no narrative could be produced.
pub const EMPTY_NARRATIVE: &str = "No logic could be interpreted.";

/// Supported output formats.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    #[default]
    Json,
    Dot,
    Text,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "dot" => Ok(Self::Dot),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("unsupported output format `{s}`")),
        }
    }
}

impl From<Format> for &'static str {
    fn from(val: Format) -> Self {
        match val {
            Format::Json => "json",
            Format::Dot => "dot",
            Format::Text => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Renders `analysis` in the requested format.
///
/// # Errors
///
/// Returns [`FlowError::Serialization`] if JSON encoding fails.
pub fn render(analysis: &Analysis, format: Format) -> Result<String, FlowError> {
    match format {
        Format::Json => to_json(analysis),
        Format::Dot => Ok(to_dot(&analysis.graph)),
        Format::Text => Ok(to_text(analysis)),
    }
}

/// Pretty-printed JSON of the whole analysis.
pub fn to_json(analysis: &Analysis) -> Result<String, FlowError> {
    Ok(serde_json::to_string_pretty(analysis)?)
}

/// Graphviz DOT of the graph.
///
/// Nodes are labeled `<id>: <phrase> [<class>]`, edges with their label.
pub fn to_dot(graph: &Graph) -> String {
    let mut dot_graph: DiGraph<String, String> = DiGraph::new();
    let indices: Vec<_> = graph
        .nodes()
        .iter()
        .map(|node| {
            let weight = format!("{}: {} [{}]", node.id(), phrase(node), node.semantic_class());
            (node.id(), dot_graph.add_node(weight))
        })
        .collect();

    let index_of = |id: NodeId| {
        indices
            .iter()
            .find(|(node_id, _)| *node_id == id)
            .map(|(_, idx)| *idx)
    };
    for edge in graph.edges() {
        if let (Some(source), Some(target)) = (index_of(edge.source()), index_of(edge.target())) {
            dot_graph.add_edge(source, target, edge.label().unwrap_or_default().to_string());
        }
    }

    format!("{}", Dot::new(&dot_graph))
}

/// The narrative, one line each, followed by sanity warnings.
pub fn to_text(analysis: &Analysis) -> String {
    let mut text = if analysis.narrative.is_empty() {
        EMPTY_NARRATIVE.to_string()
    } else {
        analysis.narrative.to_string()
    };

    let violations = &analysis.graph.metadata().sanity_violations;
    if !violations.is_empty() {
        text.push_str("\n\nWarnings:");
        for violation in violations {
            text.push_str("\n- ");
            text.push_str(violation);
        }
    }
    text.push('\n');
    text
}
