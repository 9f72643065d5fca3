//! CLI logic for the flowsketch analysis tool.
//!
//! This module reads a detection input file, runs the analysis pipeline,
//! and writes the result in the requested format.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, io::Write};

use log::info;

use flowsketch::{Analyzer, FlowError, export};

/// Run the flowsketch CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `FlowError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or unparseable input
/// - Edges naming unknown nodes
pub fn run(args: &Args) -> Result<(), FlowError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        format:% = args.format;
        "Analyzing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let analyzer = Analyzer::new(app_config);
    let analysis = analyzer.analyze_json(&source)?;
    info!(
        nodes = analysis.graph.nodes().len(),
        edges = analysis.graph.edges().len(),
        violations = analysis.graph.metadata().sanity_violations.len();
        "Diagram analyzed"
    );

    let rendered = export::render(&analysis, args.format)?;

    if args.output == "-" {
        std::io::stdout().lock().write_all(rendered.as_bytes())?;
    } else {
        fs::write(&args.output, rendered)?;
        info!(output_file = args.output; "Analysis exported successfully");
    }

    Ok(())
}
