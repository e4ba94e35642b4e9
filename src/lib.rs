//! DiaDash Library
//!
//! Turns a weekly Medtronic CareLink CSV export into typed pump and sensor
//! records and a fixed set of weekly summary statistics.
//!
//! This library provides tools for:
//! - Reading the export past its preamble and splitting the embedded sub-tables
//! - Projecting each section to the columns in use and casting typed records
//! - Computing time in range, averages, dosing totals and projected A1C
//! - Shaping chart-ready glucose and bolus series

pub mod chart;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scrub;
pub mod stats;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use config::DashConfig;
pub use error::{DiaDashError, Result};
pub use models::{CarbSummary, CleanedDataset, DataQuality, GeneralSection, GlucoseSection};
pub use stats::{Stat, StatsParams, StatsSnapshot, StintPolicy};
