//! Error types for flowsketch operations.
//!
//! This module provides the main error type [`FlowError`] which wraps
//! the error conditions that can abort an analysis.

use std::io;

use thiserror::Error;

use flowsketch_core::error::InputError;

/// The main error type for flowsketch operations.
///
/// # Diagnostic Variants
///
/// The `Input` variant carries one coded diagnostic per malformed input
/// record, which the CLI renders individually.
///
/// Quality problems such as rejected shapes or unattached labels are not
/// errors; they are reported in the analysis statistics and sanity
/// violations.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Input(#[from] InputError),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
