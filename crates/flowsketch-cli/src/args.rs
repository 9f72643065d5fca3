//! Command-line argument definitions for the flowsketch CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the output format,
//! configuration file selection, and logging verbosity.

use clap::Parser;

use flowsketch::export::Format;

/// Command-line arguments for the flowsketch analysis tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the detection input (JSON)
    #[arg(help = "Path to the detection input file")]
    pub input: String,

    /// Path to the output file, or `-` for stdout
    #[arg(short, long, default_value = "analysis.json")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format (json, dot, text)
    #[arg(short, long, default_value_t = Format::Json)]
    pub format: Format,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
