//! CareLink export reading and section partitioning.
//!
//! Reads the weekly export past its preamble into a string-typed frame,
//! then locates the repeated header rows that separate the embedded
//! sub-tables and slices the frame into general, carb/insulin and
//! glucose sections.

use crate::constants::{PREAMBLE_LINES, SENTINEL_MARKER, columns, offsets};
use crate::error::{DiaDashError, Result};
use crate::models::{RawReport, ReportSections};
use polars::prelude::*;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

/// Read an export from disk
pub fn read_report(path: &Path) -> Result<RawReport> {
    let file = File::open(path).map_err(|e| DiaDashError::file_access(path, e))?;
    parse_report(file, &path.display().to_string())
}

/// Parse an export from any reader. The input is consumed once, front to back.
pub fn parse_report<R: Read>(mut reader: R, source: &str) -> Result<RawReport> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| DiaDashError::file_access(source, e))?;

    let line_count = count_lines(&bytes);
    if line_count <= PREAMBLE_LINES {
        return Err(DiaDashError::malformed(
            source,
            format!(
                "expected {} preamble lines followed by a header row, found {} lines",
                PREAMBLE_LINES, line_count
            ),
        ));
    }

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(PREAMBLE_LINES)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_truncate_ragged_lines(true))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    debug!(
        "Read {}: {} rows x {} columns after {} preamble lines",
        source,
        frame.height(),
        frame.width(),
        PREAMBLE_LINES
    );

    Ok(RawReport {
        source: source.to_string(),
        frame,
    })
}

/// Split a report into its three sub-tables.
///
/// With `s0`/`s1` the first two sentinel rows (end-exclusive ranges):
/// general = `[0, s0-1)`, carb/insulin = `[s0+1, s1-2)`, glucose = `[s1+1, total-1)`.
pub fn partition(report: &RawReport) -> Result<ReportSections> {
    let sentinels = sentinel_positions(report)?;

    if sentinels.len() < 2 {
        return Err(DiaDashError::malformed(
            &report.source,
            format!(
                "expected at least 2 '{}' sentinel rows, found {}",
                SENTINEL_MARKER,
                sentinels.len()
            ),
        ));
    }

    let (s0, s1) = (sentinels[0], sentinels[1]);
    if s0 < offsets::GAP_BEFORE_FIRST {
        return Err(DiaDashError::malformed(
            &report.source,
            format!("first sentinel at row {} leaves no general section", s0),
        ));
    }

    let total = report.total_rows();
    let frame = &report.frame;

    let sections = ReportSections {
        general: slice_rows(frame, 0, s0 - offsets::GAP_BEFORE_FIRST),
        carb_insulin: slice_rows(frame, s0 + 1, s1.saturating_sub(offsets::GAP_BEFORE_SECOND)),
        glucose: slice_rows(frame, s1 + 1, total.saturating_sub(offsets::TRAILING_ROWS)),
    };

    debug!(
        "Partitioned {} at sentinels {} and {}: general={}, carbInsulin={}, glucose={}",
        report.source,
        s0,
        s1,
        sections.general.height(),
        sections.carb_insulin.height(),
        sections.glucose.height()
    );

    Ok(sections)
}

/// Row positions whose `Index` field repeats the header text
pub fn sentinel_positions(report: &RawReport) -> Result<Vec<usize>> {
    let index = report
        .frame
        .column(columns::INDEX)
        .map_err(|_| DiaDashError::schema("report", columns::INDEX))?
        .cast(&DataType::String)?;

    let positions = index
        .str()?
        .into_iter()
        .enumerate()
        .filter_map(|(row, value)| match value {
            Some(v) if v.trim() == SENTINEL_MARKER => Some(row),
            _ => None,
        })
        .collect();

    Ok(positions)
}

/// End-exclusive row slice; an inverted range yields an empty frame
fn slice_rows(frame: &DataFrame, start: usize, end: usize) -> DataFrame {
    let len = end.saturating_sub(start);
    frame.slice(start as i64, len)
}

fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|b| **b == b'\n').count();
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}
