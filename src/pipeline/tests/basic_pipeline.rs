//! Basic pipeline integration tests

use crate::fixtures::ExportBuilder;
use crate::pipeline::{load_dataset, run, run_with_quality};
use crate::scrub::{cast_general, cast_glucose};
use chrono::NaiveDate;
use tempfile::TempDir;

/// Helper to create a week-shaped export with a few rows per section
fn create_export(temp_dir: &TempDir) -> std::path::PathBuf {
    ExportBuilder::new()
        .general(1, "2021/10/11", "08:00:00", Some("10.0"), Some("0.8"))
        .general(2, "2021/10/11", "12:00:00", Some("5.5"), None)
        .general(3, "2021/10/12", "07:30:00", None, Some("0.9"))
        .carb(4, "2021/10/11", "12:00:00", "45")
        .carb(5, "2021/10/12", "07:30:00", "30.5")
        .carb(6, "2021/10/12", "19:00:00", "")
        .glucose(7, "2021/10/11", "08:00:00", "70")
        .glucose(8, "2021/10/11", "08:05:00", "75")
        .glucose(9, "2021/10/11", "08:10:00", "120")
        .glucose(10, "2021/10/12", "08:00:00", "185")
        .glucose(11, "2021/10/12", "08:05:00", "")
        .write_to(temp_dir.path())
}

#[test]
fn test_pipeline_produces_typed_sections() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_export(&temp_dir);

    let dataset = run(Some(&path)).unwrap();

    assert_eq!(dataset.general.len(), 3);
    assert_eq!(dataset.glucose.len(), 5);
    assert_eq!(dataset.general.bolus_total(), 15.5);
    assert_eq!(dataset.carbs.total_grams, 75.5);
    assert_eq!(dataset.carbs.entries, 2);
    assert_eq!(dataset.carbs.missing, 1);

    let first = &dataset.glucose.readings[0];
    assert_eq!(first.index, 7.0);
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2021, 10, 11).unwrap());
    assert_eq!(first.sensor_glucose, Some(70.0));
    assert_eq!(dataset.glucose.readings[4].sensor_glucose, None);
}

#[test]
fn test_section_rows_account_for_boundaries() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_export(&temp_dir);

    let (_, quality) = run_with_quality(Some(&path)).unwrap();

    assert_eq!(
        quality.general_rows + quality.carb_insulin_rows + quality.glucose_rows,
        quality.total_rows - 6
    );
    assert_eq!(quality.missing_glucose, 1);
    assert_eq!(quality.missing_bolus, 1);
    assert_eq!(quality.missing_basal, 1);
    assert_eq!(quality.missing_carbs, 1);
    assert!(quality.has_missing_dosage());
}

#[test]
fn test_running_twice_gives_equal_datasets() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_export(&temp_dir);

    let first = run(Some(&path)).unwrap();
    let second = run(Some(&path)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_recasting_rendered_sections_is_stable() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_export(&temp_dir);
    let dataset = run(Some(&path)).unwrap();

    let general = cast_general(&dataset.general.to_frame().unwrap()).unwrap();
    let glucose = cast_glucose(&dataset.glucose.to_frame().unwrap()).unwrap();

    assert_eq!(general, dataset.general);
    assert_eq!(glucose, dataset.glucose);
}

#[test]
fn test_load_dataset_present() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_export(&temp_dir);

    let loaded = load_dataset(Some(&path)).unwrap();
    assert_eq!(loaded, Some(run(Some(&path)).unwrap()));
}
