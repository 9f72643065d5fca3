//! Flowsketch Core Types and Definitions
//!
//! This crate provides the foundational types shared by the flowsketch
//! diagram analysis pipeline. It includes:
//!
//! - **Geometry**: Points, sizes and bounding boxes in image space ([`geometry`] module)
//! - **Identifiers**: Stable node identifiers ([`identifier::NodeId`])
//! - **Semantic**: Shape kinds, flowchart roles and label polarity ([`semantic`] module)
//! - **Input**: Detection records and their validation ([`input`] module)
//! - **Elements**: Logical nodes and edges of the analyzed graph ([`element`] module)
//! - **Errors**: Coded diagnostics for malformed input ([`error`] module)

pub mod element;
pub mod error;
pub mod geometry;
pub mod identifier;
pub mod input;
pub mod semantic;
