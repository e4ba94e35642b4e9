//! Chart-ready series derived from a cleaned dataset.
//!
//! Presentation lives elsewhere; these functions only shape the data for
//! the weekly line, per-day overlay, per-day distribution and bolus bar
//! views.

use crate::constants::{CHART_TARGET_HIGH, CHART_TARGET_LOW, DAY_LABEL_FORMAT};
use crate::models::{GeneralSection, GlucoseSection};
use crate::stats::median;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Reference lines drawn on glucose charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetBand {
    pub low: f32,
    pub high: f32,
}

impl Default for TargetBand {
    fn default() -> Self {
        Self {
            low: CHART_TARGET_LOW,
            high: CHART_TARGET_HIGH,
        }
    }
}

impl TargetBand {
    pub fn contains(&self, value: f32) -> bool {
        value >= self.low && value <= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub glucose: Option<f32>,
}

/// One day's readings on a shared time-of-day axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySeries {
    pub date: NaiveDate,
    pub label: String,
    pub points: Vec<(NaiveTime, Option<f32>)>,
}

/// Spread of one day's present readings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDistribution {
    pub date: NaiveDate,
    pub label: String,
    pub values: Vec<f32>,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub median: f32,
}

/// All readings in chronological order; missing readings stay as gaps
pub fn weekly_series(glucose: &GlucoseSection) -> Vec<SeriesPoint> {
    let mut points: Vec<SeriesPoint> = glucose
        .readings
        .iter()
        .map(|r| SeriesPoint {
            timestamp: r.timestamp(),
            glucose: r.sensor_glucose,
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

/// One series per date in first-seen order, each sorted by time of day
pub fn daily_series(glucose: &GlucoseSection) -> Vec<DaySeries> {
    glucose
        .dates()
        .into_iter()
        .map(|date| {
            let mut points: Vec<(NaiveTime, Option<f32>)> = glucose
                .readings
                .iter()
                .filter(|r| r.date == date)
                .map(|r| (r.time, r.sensor_glucose))
                .collect();
            points.sort_by_key(|(time, _)| *time);

            DaySeries {
                date,
                label: day_label(date),
                points,
            }
        })
        .collect()
}

/// Per-day summary of present readings; days without any are skipped
pub fn daily_distribution(glucose: &GlucoseSection) -> Vec<DayDistribution> {
    glucose
        .dates()
        .into_iter()
        .filter_map(|date| {
            let values: Vec<f32> = glucose
                .readings
                .iter()
                .filter(|r| r.date == date)
                .filter_map(|r| r.sensor_glucose)
                .collect();

            let median = median(&values)?;
            let min = values.iter().copied().fold(f32::INFINITY, f32::min);
            let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let mean = values.iter().sum::<f32>() / values.len() as f32;

            Some(DayDistribution {
                date,
                label: day_label(date),
                values,
                min,
                max,
                mean,
                median,
            })
        })
        .collect()
}

/// Bolus insulin per day, truncated to whole units, in first-seen order
pub fn bolus_by_day(general: &GeneralSection) -> Vec<(NaiveDate, i32)> {
    let mut totals: Vec<(NaiveDate, f32)> = Vec::new();
    for record in &general.records {
        let volume = record.bolus_volume_delivered.unwrap_or(0.0);
        match totals.iter_mut().find(|(date, _)| *date == record.date) {
            Some((_, total)) => *total += volume,
            None => totals.push((record.date, volume)),
        }
    }
    totals
        .into_iter()
        .map(|(date, total)| (date, total.trunc() as i32))
        .collect()
}

fn day_label(date: NaiveDate) -> String {
    date.format(DAY_LABEL_FORMAT).to_string()
}
