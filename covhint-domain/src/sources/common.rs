use super::{KnowledgeSource, SourceMeta};
use crate::blackboard::Blackboard;
use crate::error::{CorrelationError, Stage};
use covhint_types::LineSet;

/// Intersects changed and covered lines.
pub struct ComputeCommonLines;

impl ComputeCommonLines {
    pub const META: SourceMeta = SourceMeta {
        name: "compute_common_lines",
        reads: &["changed_lines", "covered_lines"],
        writes: "common_lines",
        summary: "Lines that are both changed and executed by the test case.",
    };
}

fn ready(g: &crate::GroupedFile) -> bool {
    g.is_set(Stage::ChangedLines) && g.is_set(Stage::CoveredLines) && !g.is_set(Stage::CommonLines)
}

impl KnowledgeSource for ComputeCommonLines {
    fn meta(&self) -> &'static SourceMeta {
        &Self::META
    }

    fn can_apply(&self, bb: &Blackboard) -> bool {
        bb.any_grouped(ready)
    }

    fn apply(&self, bb: &mut Blackboard) -> Result<bool, CorrelationError> {
        let mut updated = 0usize;
        for grouped in bb.grouped_files_mut()? {
            if !ready(grouped) {
                continue;
            }
            let common: LineSet = grouped
                .require(Stage::ChangedLines)?
                .intersection(grouped.require(Stage::CoveredLines)?)
                .copied()
                .collect();
            grouped.set_common_lines(common)?;
            updated += 1;
        }
        Ok(updated > 0)
    }
}
