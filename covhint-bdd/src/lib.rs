//! BDD harness (cucumber-rs).
//!
//! Keeps scenario tests isolated from the production crates. The only shared piece is
//! [`ExerciseArtifacts`], which lays out the `artifacts/diff` and `artifacts/coverage`
//! reports a scenario runs `covhint localize` against.

use anyhow::Context;
use camino::Utf8Path;
use covhint_types::input::{CoverageEntryV1, CoverageReportV1, DiffEntryV1, DiffReportV1};
use covhint_types::schema::{COVHINT_COVERAGE_V1, COVHINT_DIFF_V1};
use fs_err as fs;

/// Diff and coverage entries collected by scenario steps, written as wire reports.
#[derive(Debug, Clone, Default)]
pub struct ExerciseArtifacts {
    diff: Vec<DiffEntryV1>,
    coverage: Vec<CoverageEntryV1>,
    coverage_touched: bool,
}

impl ExerciseArtifacts {
    pub fn changed(&mut self, file_path: &str, start_line: i64, line_count: i64) {
        self.diff.push(DiffEntryV1 {
            file_path: Some(file_path.to_string()),
            start_line,
            line_count,
            previous_file_path: Some(file_path.to_string()),
            previous_start_line: Some(start_line),
            previous_line_count: Some(0),
        });
    }

    pub fn covered(&mut self, file_path: &str, test_case: &str, start_line: i64, line_count: i64) {
        self.coverage_touched = true;
        self.coverage.push(CoverageEntryV1 {
            file_path: file_path.to_string(),
            test_case: test_case.to_string(),
            start_line,
            line_count,
        });
    }

    /// Write an explicit coverage report even when no entry was added.
    pub fn empty_coverage(&mut self) {
        self.coverage_touched = true;
    }

    /// Write `artifacts/diff/report.json` and, when coverage was declared,
    /// `artifacts/coverage/report.json` below `root`.
    pub fn write(&self, root: &Utf8Path) -> anyhow::Result<()> {
        let diff = DiffReportV1 {
            schema: COVHINT_DIFF_V1.to_string(),
            entries: self.diff.clone(),
        };
        write_json(&root.join("artifacts").join("diff"), &diff)?;

        if self.coverage_touched {
            let coverage = CoverageReportV1 {
                schema: COVHINT_COVERAGE_V1.to_string(),
                entries: self.coverage.clone(),
            };
            write_json(&root.join("artifacts").join("coverage"), &coverage)?;
        }
        Ok(())
    }
}

fn write_json<T: serde::Serialize>(dir: &Utf8Path, report: &T) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir))?;
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    fs::write(dir.join("report.json"), json).with_context(|| format!("write {}/report.json", dir))
}
