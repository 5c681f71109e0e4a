use super::{KnowledgeSource, SourceMeta};
use crate::blackboard::Blackboard;
use crate::error::CorrelationError;
use crate::grouped::GroupedFile;
use tracing::debug;

/// Pairs every changed file with each test case that executes it.
pub struct GroupByFileAndTestCase;

impl GroupByFileAndTestCase {
    pub const META: SourceMeta = SourceMeta {
        name: "group_by_file_and_test_case",
        reads: &["diff_report", "coverage_report"],
        writes: "grouped_files",
        summary: "One grouped file per (file, test case) present in both reports.",
    };
}

impl KnowledgeSource for GroupByFileAndTestCase {
    fn meta(&self) -> &'static SourceMeta {
        &Self::META
    }

    fn can_apply(&self, bb: &Blackboard) -> bool {
        bb.grouped_files().is_none()
    }

    fn apply(&self, bb: &mut Blackboard) -> Result<bool, CorrelationError> {
        let mut grouped = Vec::new();

        for (file_path, diff_entries) in bb.diff_report().files() {
            let Some(by_test_case) = bb.coverage_report().test_cases_for(file_path) else {
                debug!(file = file_path, "changed file has no coverage; dropping");
                continue;
            };
            for (test_case, coverage_entries) in by_test_case {
                if coverage_entries.is_empty() {
                    continue;
                }
                grouped.push(GroupedFile::new(
                    file_path,
                    test_case.as_str(),
                    diff_entries.clone(),
                    coverage_entries.clone(),
                )?);
            }
        }

        let uncorrelated = bb
            .coverage_report()
            .files()
            .filter(|(path, _)| bb.diff_report().entries_for(path).is_none())
            .count();
        if uncorrelated > 0 {
            debug!(files = uncorrelated, "covered files without changes dropped");
        }

        // Report maps iterate in key order, which already sorts by (file, test case).
        debug!(grouped = grouped.len(), "grouped files by test case");
        bb.set_grouped_files(grouped)?;
        Ok(true)
    }
}
