//! Engine inputs: validated diff and coverage reports, plus their on-disk envelopes.
//!
//! The envelopes are tolerant when read:
//! - Unknown fields are ignored.
//! - Counts are signed so a negative span is reported as malformed instead of a JSON error.
//!
//! Converting an envelope into a report is where spans get validated.

use crate::error::MalformedInputError;
use crate::lines::{CoverageEntry, DiffEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Diff entries of one exercise, keyed by solution file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiffReport {
    files: BTreeMap<String, BTreeSet<DiffEntry>>,
}

impl DiffReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = DiffEntry>) -> Self {
        let mut report = Self::new();
        for entry in entries {
            report.insert(entry);
        }
        report
    }

    pub fn insert(&mut self, entry: DiffEntry) {
        self.files
            .entry(entry.file_path().to_string())
            .or_default()
            .insert(entry);
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &BTreeSet<DiffEntry>)> {
        self.files.iter().map(|(path, entries)| (path.as_str(), entries))
    }

    pub fn entries_for(&self, file_path: &str) -> Option<&BTreeSet<DiffEntry>> {
        self.files.get(file_path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn entry_count(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Coverage entries of one exercise, keyed by file path and then test case id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoverageReport {
    files: BTreeMap<String, BTreeMap<String, BTreeSet<CoverageEntry>>>,
}

impl CoverageReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = CoverageEntry>) -> Self {
        let mut report = Self::new();
        for entry in entries {
            report.insert(entry);
        }
        report
    }

    pub fn insert(&mut self, entry: CoverageEntry) {
        self.files
            .entry(entry.file_path().to_string())
            .or_default()
            .entry(entry.test_case().to_string())
            .or_default()
            .insert(entry);
    }

    pub fn files(
        &self,
    ) -> impl Iterator<Item = (&str, &BTreeMap<String, BTreeSet<CoverageEntry>>)> {
        self.files.iter().map(|(path, by_test)| (path.as_str(), by_test))
    }

    pub fn test_cases_for(
        &self,
        file_path: &str,
    ) -> Option<&BTreeMap<String, BTreeSet<CoverageEntry>>> {
        self.files.get(file_path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Distinct test case ids across every file.
    pub fn test_case_count(&self) -> usize {
        self.files
            .values()
            .flat_map(BTreeMap::keys)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn entry_count(&self) -> usize {
        self.files
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeSet::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// `covhint.diff.v1` as found on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReportV1 {
    pub schema: String,

    #[serde(default)]
    pub entries: Vec<DiffEntryV1>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffEntryV1 {
    /// Path in the solution; absent when the file only exists in the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    #[serde(default)]
    pub start_line: i64,

    #[serde(default)]
    pub line_count: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_file_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_start_line: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_line_count: Option<i64>,
}

impl DiffEntryV1 {
    /// True when the entry has no solution-side file, i.e. the file was deleted.
    pub fn is_removal(&self) -> bool {
        match self.file_path.as_deref() {
            None => true,
            Some(path) => path == "/dev/null",
        }
    }
}

impl TryFrom<&DiffReportV1> for DiffReport {
    type Error = MalformedInputError;

    fn try_from(wire: &DiffReportV1) -> Result<Self, Self::Error> {
        let mut report = DiffReport::new();
        for entry in &wire.entries {
            if let Some(previous_count) = entry.previous_line_count
                && previous_count < 0
            {
                return Err(MalformedInputError::NegativeLineCount {
                    file_path: entry
                        .previous_file_path
                        .clone()
                        .or_else(|| entry.file_path.clone())
                        .unwrap_or_default(),
                    line_count: previous_count,
                });
            }

            if entry.is_removal() {
                continue;
            }
            let file_path = entry.file_path.clone().unwrap_or_default();
            report.insert(DiffEntry::new(file_path, entry.start_line, entry.line_count)?);
        }
        Ok(report)
    }
}

/// `covhint.coverage.v1` as found on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReportV1 {
    pub schema: String,

    #[serde(default)]
    pub entries: Vec<CoverageEntryV1>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageEntryV1 {
    #[serde(default)]
    pub file_path: String,

    #[serde(default)]
    pub test_case: String,

    #[serde(default)]
    pub start_line: i64,

    #[serde(default)]
    pub line_count: i64,
}

impl TryFrom<&CoverageReportV1> for CoverageReport {
    type Error = MalformedInputError;

    fn try_from(wire: &CoverageReportV1) -> Result<Self, Self::Error> {
        let mut report = CoverageReport::new();
        for entry in &wire.entries {
            report.insert(CoverageEntry::new(
                entry.file_path.clone(),
                entry.test_case.clone(),
                entry.start_line,
                entry.line_count,
            )?);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::LineSpan;

    fn diff_wire(entries: Vec<DiffEntryV1>) -> DiffReportV1 {
        DiffReportV1 {
            schema: crate::schema::COVHINT_DIFF_V1.to_string(),
            entries,
        }
    }

    #[test]
    fn removed_files_are_dropped() {
        let wire = diff_wire(vec![
            DiffEntryV1 {
                file_path: Some("src/Kept.java".to_string()),
                start_line: 3,
                line_count: 2,
                ..Default::default()
            },
            DiffEntryV1 {
                file_path: None,
                previous_file_path: Some("src/Gone.java".to_string()),
                previous_start_line: Some(1),
                previous_line_count: Some(40),
                ..Default::default()
            },
        ]);

        let report = DiffReport::try_from(&wire).unwrap();
        assert_eq!(report.file_count(), 1);
        assert!(report.entries_for("src/Kept.java").is_some());
        assert!(report.entries_for("src/Gone.java").is_none());
    }

    #[test]
    fn negative_previous_count_is_malformed() {
        let wire = diff_wire(vec![DiffEntryV1 {
            file_path: Some("src/A.java".to_string()),
            start_line: 1,
            line_count: 1,
            previous_line_count: Some(-2),
            ..Default::default()
        }]);

        let err = DiffReport::try_from(&wire).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::NegativeLineCount { line_count: -2, .. }
        ));
    }

    #[test]
    fn duplicate_entries_collapse() {
        let a = DiffEntry::new("A.java", 1, 2).unwrap();
        let report = DiffReport::from_entries([a.clone(), a]);
        assert_eq!(report.entry_count(), 1);
    }

    #[test]
    fn coverage_is_keyed_by_file_then_test_case() {
        let report = CoverageReport::from_entries([
            CoverageEntry::new("B.java", "t2", 1, 1).unwrap(),
            CoverageEntry::new("A.java", "t1", 4, 2).unwrap(),
            CoverageEntry::new("A.java", "t2", 5, 1).unwrap(),
        ]);

        assert_eq!(report.file_count(), 2);
        assert_eq!(report.test_case_count(), 2);
        assert_eq!(report.entry_count(), 3);

        let files: Vec<_> = report.files().map(|(path, _)| path).collect();
        assert_eq!(files, vec!["A.java", "B.java"]);

        let a = report.test_cases_for("A.java").unwrap();
        assert_eq!(a.keys().cloned().collect::<Vec<_>>(), vec!["t1", "t2"]);
        let t1 = a.get("t1").unwrap().iter().next().unwrap();
        assert_eq!(t1.start_line(), 4);
    }

    #[test]
    fn coverage_wire_parses_with_unknown_fields() {
        let json = r#"{
            "schema": "covhint.coverage.v1",
            "producer": "jacoco",
            "entries": [
                { "file_path": "A.java", "test_case": "t1", "start_line": 2, "line_count": 3, "hits": 7 }
            ]
        }"#;
        let wire: CoverageReportV1 = serde_json::from_str(json).unwrap();
        let report = CoverageReport::try_from(&wire).unwrap();
        assert_eq!(report.entry_count(), 1);
    }

    #[test]
    fn coverage_wire_without_test_case_is_malformed() {
        let wire = CoverageReportV1 {
            schema: crate::schema::COVHINT_COVERAGE_V1.to_string(),
            entries: vec![CoverageEntryV1 {
                file_path: "A.java".to_string(),
                test_case: String::new(),
                start_line: 1,
                line_count: 1,
            }],
        };
        assert!(matches!(
            CoverageReport::try_from(&wire).unwrap_err(),
            MalformedInputError::EmptyTestCase { .. }
        ));
    }
}
