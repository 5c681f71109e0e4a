//! Integration tests for the artifacts loader.

use camino::Utf8PathBuf;
use covhint_reports::{ReportLoadError, load_inputs};
use covhint_types::LineSpan;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn artifacts_path(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("artifacts")).unwrap()
}

fn write_report(dir: &Utf8PathBuf, sensor: &str, contents: &str) {
    let sensor_dir = dir.join(sensor);
    fs::create_dir_all(&sensor_dir).unwrap();
    fs::write(sensor_dir.join("report.json"), contents).unwrap();
}

fn diff_json() -> &'static str {
    r#"{
        "schema": "covhint.diff.v1",
        "entries": [
            { "file_path": "src/Foo.java", "start_line": 10, "line_count": 3,
              "previous_file_path": "src/Foo.java", "previous_start_line": 10, "previous_line_count": 1 },
            { "previous_file_path": "src/Old.java", "previous_start_line": 1, "previous_line_count": 12 }
        ]
    }"#
}

fn coverage_json() -> &'static str {
    r#"{
        "schema": "covhint.coverage.v1",
        "entries": [
            { "file_path": "src/Foo.java", "test_case": "t1", "start_line": 10, "line_count": 1 },
            { "file_path": "src/Foo.java", "test_case": "t2", "start_line": 12, "line_count": 1 }
        ]
    }"#
}

#[test]
fn missing_artifacts_dir_yields_empty_inputs() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);

    let loaded = load_inputs(&artifacts).unwrap();
    assert!(loaded.diff.is_empty());
    assert!(loaded.coverage.is_empty());
    assert!(loaded.diff_path.is_none());
    assert!(loaded.coverage_path.is_none());
}

#[test]
fn loads_both_reports() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    write_report(&artifacts, "diff", diff_json());
    write_report(&artifacts, "coverage", coverage_json());

    let loaded = load_inputs(&artifacts).unwrap();

    assert_eq!(loaded.diff.file_count(), 1);
    let foo = loaded.diff.entries_for("src/Foo.java").unwrap();
    let spans: Vec<_> = foo.iter().map(|e| (e.start_line(), e.line_count())).collect();
    assert_eq!(spans, vec![(10, 3)]);

    assert_eq!(loaded.coverage.file_count(), 1);
    assert_eq!(loaded.coverage.test_case_count(), 2);
    assert_eq!(
        loaded.diff_path.unwrap(),
        artifacts.join("diff").join("report.json")
    );
    assert!(loaded.coverage_path.is_some());
}

#[test]
fn only_diff_present_leaves_coverage_empty() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    write_report(&artifacts, "diff", diff_json());

    let loaded = load_inputs(&artifacts).unwrap();
    assert_eq!(loaded.diff.entry_count(), 1);
    assert!(loaded.coverage.is_empty());
}

#[test]
fn unrelated_sensor_dirs_are_ignored() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    write_report(&artifacts, "covhint", "not json at all");
    write_report(&artifacts, "lint", r#"{"schema":"other"}"#);
    write_report(&artifacts, "coverage", coverage_json());

    let loaded = load_inputs(&artifacts).unwrap();
    assert_eq!(loaded.coverage.entry_count(), 2);
    assert!(loaded.diff.is_empty());
}

#[test]
fn invalid_json_is_reported_with_path() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    write_report(&artifacts, "diff", "{ not valid json");

    let err = load_inputs(&artifacts).unwrap_err();
    match &err {
        ReportLoadError::Json { path, .. } => {
            assert!(path.as_str().ends_with("diff/report.json"));
        }
        other => panic!("expected json error, got {other:?}"),
    }
    assert!(err.is_rejected_input());
}

#[test]
fn negative_coverage_span_is_malformed() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    write_report(
        &artifacts,
        "coverage",
        r#"{"schema":"covhint.coverage.v1","entries":[
            {"file_path":"A.java","test_case":"t1","start_line":4,"line_count":-2}
        ]}"#,
    );

    let err = load_inputs(&artifacts).unwrap_err();
    assert!(matches!(err, ReportLoadError::Malformed { .. }));
    assert!(err.to_string().contains("negative line count -2"));
}

#[test]
fn zero_length_coverage_span_is_accepted() {
    let temp = tempfile::tempdir().unwrap();
    let artifacts = artifacts_path(&temp);
    write_report(
        &artifacts,
        "coverage",
        r#"{"schema":"covhint.coverage.v1","entries":[
            {"file_path":"A.java","test_case":"t1","start_line":0,"line_count":0}
        ]}"#,
    );

    let loaded = load_inputs(&artifacts).unwrap();
    assert_eq!(loaded.coverage.entry_count(), 1);
}
