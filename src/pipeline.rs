//! End-to-end cleaning of a weekly export.
//!
//! Runs the fixed stage order parse → partition → reduce → cast and hands
//! back an immutable [`CleanedDataset`]. Nothing is cached between runs;
//! a refresh is simply another call.

#[cfg(test)]
mod tests;

use crate::constants::{DEFAULT_EXPORT_PATH, EXPORT_FILE_PATTERN};
use crate::error::{DiaDashError, Result};
use crate::models::{CleanedDataset, DataQuality, SectionKind};
use crate::report::{partition, read_report};
use crate::scrub::{cast_carb_insulin, cast_general, cast_glucose, reduce_columns};
use glob::{Pattern, glob};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, info, warn};

/// Clean the export at `path`, or at the default location when `None`
pub fn run(path: Option<&Path>) -> Result<CleanedDataset> {
    run_with_quality(path).map(|(dataset, _)| dataset)
}

/// Clean an export and report row and missing-value counts alongside it
pub fn run_with_quality(path: Option<&Path>) -> Result<(CleanedDataset, DataQuality)> {
    let start_time = Instant::now();
    let path = resolve_export(path.unwrap_or_else(|| Path::new(DEFAULT_EXPORT_PATH)))?;
    info!("Cleaning export {}", path.display());

    let report = read_report(&path)?;
    let total_rows = report.total_rows();
    let sections = partition(&report)?;
    drop(report);

    let reduced = |kind: SectionKind| reduce_columns(sections.get(kind), kind);
    let general = cast_general(&reduced(SectionKind::General)?)?;
    let carbs = cast_carb_insulin(&reduced(SectionKind::CarbInsulin)?)?;
    let glucose = cast_glucose(&reduced(SectionKind::Glucose)?)?;

    let dataset = CleanedDataset {
        general,
        glucose,
        carbs,
    };
    let quality = DataQuality::from_dataset(total_rows, &dataset);

    info!(
        "Cleaned {} rows: general={}, carbInsulin={}, glucose={} in {}ms",
        quality.total_rows,
        quality.general_rows,
        quality.carb_insulin_rows,
        quality.glucose_rows,
        start_time.elapsed().as_millis()
    );
    if quality.missing_glucose > 0 {
        debug!(
            "{} of {} glucose readings are missing",
            quality.missing_glucose, quality.glucose_rows
        );
    }
    if quality.has_missing_dosage() {
        warn!(
            "Missing dosage values: bolus={}, basal={}, carbs={}",
            quality.missing_bolus, quality.missing_basal, quality.missing_carbs
        );
    }

    Ok((dataset, quality))
}

/// Clean an export, treating an unreadable file as "no data yet"
pub fn load_dataset(path: Option<&Path>) -> Result<Option<CleanedDataset>> {
    match run(path) {
        Ok(dataset) => Ok(Some(dataset)),
        Err(e) if e.is_file_access() => {
            warn!("No export available: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Resolve a directory to the most recently modified export inside it.
///
/// File paths are returned unchanged, existing or not.
pub fn resolve_export(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let pattern = format!(
        "{}/{}",
        Pattern::escape(&path.display().to_string()),
        EXPORT_FILE_PATTERN
    );
    let entries = glob(&pattern).map_err(|e| {
        DiaDashError::configuration(format!("Invalid export directory {}: {}", path.display(), e))
    })?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for candidate in entries.filter_map(|entry| entry.ok()) {
        let Ok(modified) = candidate.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
            newest = Some((modified, candidate));
        }
    }

    match newest {
        Some((_, file)) => {
            debug!("Resolved {} to {}", path.display(), file.display());
            Ok(file)
        }
        None => Err(DiaDashError::file_access(
            path,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no {} export in directory", EXPORT_FILE_PATTERN),
            ),
        )),
    }
}
