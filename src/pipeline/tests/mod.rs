//! Integration tests for the pipeline module
//!
//! Runs the full clean over CareLink-shaped exports written to temp files.

pub mod basic_pipeline;
pub mod export_resolution;
