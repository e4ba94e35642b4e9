//! Core data structures for the weekly export pipeline.
//!
//! Defines the section kinds found in a CareLink export, the raw and
//! partitioned frames, the typed records produced by casting, and the
//! cleaned dataset consumed by the statistics engine and chart adapter.

use crate::constants::{CARB_INSULIN_COLUMNS, GENERAL_COLUMNS, GLUCOSE_COLUMNS, columns};
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical sub-tables embedded in one export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    General,
    CarbInsulin,
    Glucose,
}

impl SectionKind {
    /// Columns each section is reduced to before casting
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            SectionKind::General => GENERAL_COLUMNS,
            SectionKind::CarbInsulin => CARB_INSULIN_COLUMNS,
            SectionKind::Glucose => GLUCOSE_COLUMNS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::General => "general",
            SectionKind::CarbInsulin => "carbInsulin",
            SectionKind::Glucose => "glucose",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The export as read from disk: every column kept as a string
#[derive(Debug, Clone)]
pub struct RawReport {
    pub source: String,
    pub frame: DataFrame,
}

impl RawReport {
    pub fn total_rows(&self) -> usize {
        self.frame.height()
    }
}

/// Untyped slices of a [`RawReport`], one per sub-table
#[derive(Debug, Clone)]
pub struct ReportSections {
    pub general: DataFrame,
    pub carb_insulin: DataFrame,
    pub glucose: DataFrame,
}

impl ReportSections {
    pub fn get(&self, kind: SectionKind) -> &DataFrame {
        match kind {
            SectionKind::General => &self.general,
            SectionKind::CarbInsulin => &self.carb_insulin,
            SectionKind::Glucose => &self.glucose,
        }
    }

    /// Row count across all three sections
    pub fn total_rows(&self) -> usize {
        self.general.height() + self.carb_insulin.height() + self.glucose.height()
    }
}

/// One pump event row from the general section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralRecord {
    pub index: f32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub bolus_volume_delivered: Option<f32>,
    pub basal_rate: Option<f32>,
}

/// One sensor reading; `sensor_glucose` is `None` when the sensor reported nothing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseReading {
    pub index: f32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub sensor_glucose: Option<f32>,
}

impl GlucoseReading {
    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Typed general section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralSection {
    pub records: Vec<GeneralRecord>,
}

impl GeneralSection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of delivered bolus volumes; rows without a value do not contribute
    pub fn bolus_total(&self) -> f32 {
        self.records
            .iter()
            .filter_map(|r| r.bolus_volume_delivered)
            .sum()
    }

    /// Render back into a frame with Float32 measurements and ISO date/time strings
    pub fn to_frame(&self) -> Result<DataFrame> {
        let index: Vec<f32> = self.records.iter().map(|r| r.index).collect();
        let dates: Vec<String> = self.records.iter().map(|r| r.date.to_string()).collect();
        let times: Vec<String> = self.records.iter().map(|r| r.time.to_string()).collect();
        let bolus: Vec<Option<f32>> = self
            .records
            .iter()
            .map(|r| r.bolus_volume_delivered)
            .collect();
        let basal: Vec<Option<f32>> = self.records.iter().map(|r| r.basal_rate).collect();

        let frame = DataFrame::new(vec![
            Series::new(columns::INDEX.into(), index).into(),
            Series::new(columns::DATE.into(), dates).into(),
            Series::new(columns::TIME.into(), times).into(),
            Series::new(columns::BOLUS_VOLUME_DELIVERED.into(), bolus).into(),
            Series::new(columns::BASAL_RATE.into(), basal).into(),
        ])?;
        Ok(frame)
    }
}

/// Typed glucose section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlucoseSection {
    pub readings: Vec<GlucoseReading>,
}

impl GlucoseSection {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Readings that carry a value, in file order
    pub fn present_values(&self) -> Vec<f32> {
        self.readings
            .iter()
            .filter_map(|r| r.sensor_glucose)
            .collect()
    }

    pub fn missing_count(&self) -> usize {
        self.readings
            .iter()
            .filter(|r| r.sensor_glucose.is_none())
            .count()
    }

    /// Distinct dates in the order they first appear
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut seen = Vec::new();
        for reading in &self.readings {
            if !seen.contains(&reading.date) {
                seen.push(reading.date);
            }
        }
        seen
    }

    /// Render back into a frame with Float32 measurements and ISO date/time strings
    pub fn to_frame(&self) -> Result<DataFrame> {
        let index: Vec<f32> = self.readings.iter().map(|r| r.index).collect();
        let dates: Vec<String> = self.readings.iter().map(|r| r.date.to_string()).collect();
        let times: Vec<String> = self.readings.iter().map(|r| r.time.to_string()).collect();
        let glucose: Vec<Option<f32>> = self.readings.iter().map(|r| r.sensor_glucose).collect();

        let frame = DataFrame::new(vec![
            Series::new(columns::INDEX.into(), index).into(),
            Series::new(columns::DATE.into(), dates).into(),
            Series::new(columns::TIME.into(), times).into(),
            Series::new(columns::SENSOR_GLUCOSE.into(), glucose).into(),
        ])?;
        Ok(frame)
    }
}

/// Carb section folded to an aggregate; the typed rows are not kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarbSummary {
    pub total_grams: f32,
    pub entries: usize,
    pub missing: usize,
}

/// Output of one pipeline run. Built once, then only read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedDataset {
    pub general: GeneralSection,
    pub glucose: GlucoseSection,
    pub carbs: CarbSummary,
}

/// Row and missing-value counts gathered while cleaning an export
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQuality {
    pub total_rows: usize,
    pub general_rows: usize,
    pub carb_insulin_rows: usize,
    pub glucose_rows: usize,
    pub missing_glucose: usize,
    pub missing_bolus: usize,
    pub missing_basal: usize,
    pub missing_carbs: usize,
}

impl DataQuality {
    pub fn from_dataset(total_rows: usize, dataset: &CleanedDataset) -> Self {
        let general = &dataset.general.records;
        Self {
            total_rows,
            general_rows: general.len(),
            carb_insulin_rows: dataset.carbs.entries + dataset.carbs.missing,
            glucose_rows: dataset.glucose.len(),
            missing_glucose: dataset.glucose.missing_count(),
            missing_bolus: general
                .iter()
                .filter(|r| r.bolus_volume_delivered.is_none())
                .count(),
            missing_basal: general.iter().filter(|r| r.basal_rate.is_none()).count(),
            missing_carbs: dataset.carbs.missing,
        }
    }

    /// True when any dosage column had blank values
    pub fn has_missing_dosage(&self) -> bool {
        self.missing_bolus > 0 || self.missing_basal > 0 || self.missing_carbs > 0
    }
}
