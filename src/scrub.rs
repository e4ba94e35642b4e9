//! Column reduction and type casting for partitioned sections.
//!
//! Each section is projected to the narrow set of columns the statistics
//! need, then converted into typed records. Values are read through their
//! string form, so casting a frame that was already cast and rendered back
//! with `to_frame` yields the same records.

use crate::constants::{
    DATE_FORMATS_MONTH_FIRST, DATE_FORMATS_YEAR_FIRST, DATETIME_FORMATS_MONTH_FIRST,
    DATETIME_FORMATS_YEAR_FIRST, TIME_FORMATS, columns,
};
use crate::error::{DiaDashError, Result};
use crate::models::{
    CarbSummary, GeneralRecord, GeneralSection, GlucoseReading, GlucoseSection, SectionKind,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use tracing::{debug, warn};

/// Project a section to the columns its kind requires
pub fn reduce_columns(frame: &DataFrame, kind: SectionKind) -> Result<DataFrame> {
    reduce_to(frame, kind.required_columns(), kind)
}

/// Project a section to an explicit column list.
///
/// A missing column means the upstream export format changed.
pub fn reduce_to(frame: &DataFrame, wanted: &[&str], kind: SectionKind) -> Result<DataFrame> {
    if let Some(missing) = wanted.iter().find(|name| frame.column(name).is_err()) {
        return Err(DiaDashError::schema(kind.label(), *missing));
    }

    let reduced = frame.select(wanted.iter().copied())?;
    debug!(
        "Reduced {} section from {} to {} columns",
        kind,
        frame.width(),
        reduced.width()
    );
    Ok(reduced)
}

/// Cast a reduced general section into pump event records
pub fn cast_general(frame: &DataFrame) -> Result<GeneralSection> {
    let kind = SectionKind::General;
    let index = string_values(frame, columns::INDEX, kind)?;
    let dates = string_values(frame, columns::DATE, kind)?;
    let times = string_values(frame, columns::TIME, kind)?;
    let bolus = string_values(frame, columns::BOLUS_VOLUME_DELIVERED, kind)?;
    let basal = string_values(frame, columns::BASAL_RATE, kind)?;

    let mut records = Vec::with_capacity(frame.height());
    for row in 0..frame.height() {
        records.push(GeneralRecord {
            index: cast_index(kind, row, index[row].as_deref())?,
            date: cast_date(kind, row, dates[row].as_deref())?,
            time: cast_time(kind, row, times[row].as_deref())?,
            bolus_volume_delivered: parse_measurement(bolus[row].as_deref()),
            basal_rate: parse_measurement(basal[row].as_deref()),
        });
    }

    Ok(GeneralSection { records })
}

/// Cast a reduced carb/insulin section and fold it into its total
pub fn cast_carb_insulin(frame: &DataFrame) -> Result<CarbSummary> {
    let kind = SectionKind::CarbInsulin;
    let carbs = string_values(frame, columns::BWZ_CARB_INPUT, kind)?;

    let mut summary = CarbSummary::default();
    for value in carbs.iter().map(|v| parse_measurement(v.as_deref())) {
        match value {
            Some(grams) => {
                summary.total_grams += grams;
                summary.entries += 1;
            }
            None => summary.missing += 1,
        }
    }

    if summary.missing > 0 {
        warn!(
            "{} of {} carb input rows have no value",
            summary.missing,
            carbs.len()
        );
    }

    Ok(summary)
}

/// Cast a reduced glucose section into sensor readings
pub fn cast_glucose(frame: &DataFrame) -> Result<GlucoseSection> {
    let kind = SectionKind::Glucose;
    let index = string_values(frame, columns::INDEX, kind)?;
    let dates = string_values(frame, columns::DATE, kind)?;
    let times = string_values(frame, columns::TIME, kind)?;
    let glucose = string_values(frame, columns::SENSOR_GLUCOSE, kind)?;

    let mut readings = Vec::with_capacity(frame.height());
    for row in 0..frame.height() {
        readings.push(GlucoseReading {
            index: cast_index(kind, row, index[row].as_deref())?,
            date: cast_date(kind, row, dates[row].as_deref())?,
            time: cast_time(kind, row, times[row].as_deref())?,
            sensor_glucose: parse_measurement(glucose[row].as_deref()),
        });
    }

    Ok(GlucoseSection { readings })
}

/// Read a column as optional strings, whatever its stored type
fn string_values(frame: &DataFrame, name: &str, kind: SectionKind) -> Result<Vec<Option<String>>> {
    let column = frame
        .column(name)
        .map_err(|_| DiaDashError::schema(kind.label(), name))?
        .cast(&DataType::String)?;

    let values = column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

fn cast_index(kind: SectionKind, row: usize, raw: Option<&str>) -> Result<f32> {
    raw.and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| DiaDashError::cast(kind.label(), columns::INDEX, row, raw.unwrap_or("")))
}

fn cast_date(kind: SectionKind, row: usize, raw: Option<&str>) -> Result<NaiveDate> {
    raw.and_then(parse_date)
        .ok_or_else(|| DiaDashError::cast(kind.label(), columns::DATE, row, raw.unwrap_or("")))
}

fn cast_time(kind: SectionKind, row: usize, raw: Option<&str>) -> Result<NaiveTime> {
    raw.and_then(parse_time)
        .ok_or_else(|| DiaDashError::cast(kind.label(), columns::TIME, row, raw.unwrap_or("")))
}

/// Parse a calendar date, dropping any time component
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let formats = if year_first(raw) {
        DATE_FORMATS_YEAR_FIRST
    } else {
        DATE_FORMATS_MONTH_FIRST
    };
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

/// Parse a time of day, dropping any date component
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_datetime(raw).map(|dt| dt.time()))
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let formats = if year_first(raw) {
        DATETIME_FORMATS_YEAR_FIRST
    } else {
        DATETIME_FORMATS_MONTH_FIRST
    };
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// `%Y` also accepts short years, so the layout is picked before parsing
fn year_first(raw: &str) -> bool {
    let digits = raw.chars().take_while(|c| c.is_ascii_digit()).count();
    digits == 4
}

/// Blank, unparseable and non-finite measurements are missing, not errors
pub fn parse_measurement(raw: Option<&str>) -> Option<f32> {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f32>().ok())
        .filter(|v| v.is_finite())
}
