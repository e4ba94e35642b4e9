//! Directory-to-export resolution tests

use crate::fixtures::ExportBuilder;
use crate::pipeline::{resolve_export, run};
use std::fs;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

#[test]
fn test_file_path_is_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("raw_data.csv");

    assert_eq!(resolve_export(&path).unwrap(), path);
}

#[test]
fn test_directory_resolves_to_newest_csv() {
    let temp_dir = TempDir::new().unwrap();
    let older = temp_dir.path().join("CareLink-Export-1.csv");
    let newer = temp_dir.path().join("CareLink-Export-2.csv");
    fs::write(&older, "old").unwrap();
    fs::write(&newer, "new").unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

    let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
    fs::File::options()
        .write(true)
        .open(&older)
        .unwrap()
        .set_modified(an_hour_ago)
        .unwrap();

    assert_eq!(resolve_export(temp_dir.path()).unwrap(), newer);
}

#[test]
fn test_empty_directory_is_file_access() {
    let temp_dir = TempDir::new().unwrap();
    let err = resolve_export(temp_dir.path()).unwrap_err();
    assert!(err.is_file_access());
}

#[test]
fn test_run_accepts_export_directory() {
    let temp_dir = TempDir::new().unwrap();
    ExportBuilder::new()
        .general(1, "10/11/21", "08:00:00", Some("1.5"), Some("0.8"))
        .glucose(2, "10/11/21", "08:00:00", "140")
        .write_to(temp_dir.path());

    let dataset = run(Some(temp_dir.path())).unwrap();
    assert_eq!(dataset.glucose.len(), 1);
    assert_eq!(dataset.general.bolus_total(), 1.5);
}
