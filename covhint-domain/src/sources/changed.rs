use super::{KnowledgeSource, SourceMeta};
use crate::blackboard::Blackboard;
use crate::error::{CorrelationError, Stage};
use covhint_types::expand;
use tracing::trace;

/// Expands each grouped file's diff entries into its changed lines.
pub struct ExtractChangedLines;

impl ExtractChangedLines {
    pub const META: SourceMeta = SourceMeta {
        name: "extract_changed_lines",
        reads: &["diff_entries"],
        writes: "changed_lines",
        summary: "Union of the lines of every diff entry of the file.",
    };
}

impl KnowledgeSource for ExtractChangedLines {
    fn meta(&self) -> &'static SourceMeta {
        &Self::META
    }

    fn can_apply(&self, bb: &Blackboard) -> bool {
        bb.any_grouped(|g| !g.is_set(Stage::ChangedLines))
    }

    fn apply(&self, bb: &mut Blackboard) -> Result<bool, CorrelationError> {
        let mut updated = 0usize;
        for grouped in bb.grouped_files_mut()? {
            if grouped.is_set(Stage::ChangedLines) {
                continue;
            }
            if grouped.diff_entries().is_empty() {
                return Err(CorrelationError::CoverageWithoutDiff {
                    file_path: grouped.file_path().to_string(),
                    test_case: grouped.test_case().to_string(),
                });
            }

            let lines = expand(grouped.diff_entries());
            trace!(
                file = grouped.file_path(),
                test_case = grouped.test_case(),
                lines = lines.len(),
                "changed lines"
            );
            grouped.set_changed_lines(lines)?;
            updated += 1;
        }
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouped::GroupedFile;
    use covhint_types::{CoverageEntry, DiffEntry, LineSet};
    use std::collections::BTreeSet;

    fn board(grouped: Vec<GroupedFile>) -> Blackboard {
        let mut bb = Blackboard::default();
        bb.set_grouped_files(grouped).unwrap();
        bb
    }

    #[test]
    fn unions_every_diff_entry() {
        let g = GroupedFile::new(
            "A.java",
            "t1",
            BTreeSet::from([
                DiffEntry::new("A.java", 2, 2).unwrap(),
                DiffEntry::new("A.java", 7, 1).unwrap(),
                DiffEntry::new("A.java", 9, 0).unwrap(),
            ]),
            BTreeSet::from([CoverageEntry::new("A.java", "t1", 1, 1).unwrap()]),
        )
        .unwrap();
        let mut bb = board(vec![g]);

        assert!(ExtractChangedLines.can_apply(&bb));
        assert!(ExtractChangedLines.apply(&mut bb).unwrap());
        assert!(!ExtractChangedLines.can_apply(&bb));

        let g = &bb.grouped_files().unwrap()[0];
        assert_eq!(g.changed_lines(), Some(&LineSet::from([2, 3, 7])));
    }

    #[test]
    fn grouped_file_without_diff_is_a_correlation_error() {
        let g = GroupedFile::new(
            "A.java",
            "t1",
            BTreeSet::new(),
            BTreeSet::from([CoverageEntry::new("A.java", "t1", 1, 1).unwrap()]),
        )
        .unwrap();
        let mut bb = board(vec![g]);

        let err = ExtractChangedLines.apply(&mut bb).unwrap_err();
        assert!(matches!(err, CorrelationError::CoverageWithoutDiff { .. }));
    }

    #[test]
    fn ungrouped_board_is_not_applicable() {
        let mut bb = Blackboard::default();
        assert!(!ExtractChangedLines.can_apply(&bb));
        assert_eq!(
            ExtractChangedLines.apply(&mut bb).unwrap_err(),
            CorrelationError::NotGrouped
        );
    }
}
