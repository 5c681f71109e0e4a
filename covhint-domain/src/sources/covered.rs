use super::{KnowledgeSource, SourceMeta};
use crate::blackboard::Blackboard;
use crate::error::{CorrelationError, Stage};
use covhint_types::expand;
use tracing::{debug, trace};

/// Expands each grouped file's coverage entries into its covered lines.
///
/// Every pending file gets a covered set, even an empty one. Progress is reported only when at
/// least one of those sets is non-empty.
pub struct ExtractCoveredLines;

impl ExtractCoveredLines {
    pub const META: SourceMeta = SourceMeta {
        name: "extract_covered_lines",
        reads: &["coverage_entries"],
        writes: "covered_lines",
        summary: "Union of the lines the test case executed in the file.",
    };
}

impl KnowledgeSource for ExtractCoveredLines {
    fn meta(&self) -> &'static SourceMeta {
        &Self::META
    }

    fn can_apply(&self, bb: &Blackboard) -> bool {
        bb.any_grouped(|g| !g.is_set(Stage::CoveredLines))
    }

    fn apply(&self, bb: &mut Blackboard) -> Result<bool, CorrelationError> {
        let mut non_empty = 0usize;
        let mut pending = 0usize;
        for grouped in bb.grouped_files_mut()? {
            if grouped.is_set(Stage::CoveredLines) {
                continue;
            }
            pending += 1;

            let lines = expand(grouped.coverage_entries());
            trace!(
                file = grouped.file_path(),
                test_case = grouped.test_case(),
                lines = lines.len(),
                "covered lines"
            );
            if !lines.is_empty() {
                non_empty += 1;
            }
            grouped.set_covered_lines(lines)?;
        }

        if pending > 0 && non_empty == 0 {
            debug!(pending, "no covered lines in any pending grouped file");
        }
        Ok(non_empty > 0)
    }
}
