use super::{KnowledgeSource, SourceMeta};
use crate::blackboard::Blackboard;
use crate::error::{CorrelationError, Stage};
use covhint_types::{ChangeBlock, LineNumber, LineSet, merge_touching};
use tracing::trace;

/// Folds common lines into change blocks, optionally widened by changed-but-uncovered context.
pub struct MergeIntoChangeBlocks {
    context_lines: u32,
}

impl MergeIntoChangeBlocks {
    pub const META: SourceMeta = SourceMeta {
        name: "merge_into_change_blocks",
        reads: &["common_lines", "changed_lines", "covered_lines"],
        writes: "common_changes",
        summary: "Touching common lines become one block; uncovered changed neighbours make it potential.",
    };

    /// `context_lines == 0` disables extension.
    pub fn new(context_lines: u32) -> Self {
        Self { context_lines }
    }
}

fn ready(g: &crate::GroupedFile) -> bool {
    g.is_set(Stage::CommonLines) && !g.is_set(Stage::CommonChanges)
}

impl KnowledgeSource for MergeIntoChangeBlocks {
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
            let blocks = change_blocks(
                grouped.require(Stage::CommonLines)?,
                grouped.require(Stage::ChangedLines)?,
                grouped.require(Stage::CoveredLines)?,
                self.context_lines,
            );
            trace!(
                file = grouped.file_path(),
                test_case = grouped.test_case(),
                blocks = blocks.len(),
                "change blocks"
            );
            grouped.set_common_changes(blocks)?;
            updated += 1;
        }
        Ok(updated > 0)
    }
}

/// Merge `common` into blocks, then extend each by up to `context_lines` lines per side.
///
/// Extension walks outward from the confirmed block and stops at the first line that is not
/// changed-and-uncovered. It runs once per block; blocks that touch afterwards are merged.
pub fn change_blocks(
    common: &LineSet,
    changed: &LineSet,
    covered: &LineSet,
    context_lines: u32,
) -> Vec<ChangeBlock> {
    let confirmed = ChangeBlock::from_lines(common);
    if context_lines == 0 {
        return confirmed;
    }

    let is_context = |line: LineNumber| changed.contains(&line) && !covered.contains(&line);

    let extended = confirmed.into_iter().map(|mut block| {
        let (first, last) = (block.first_line(), block.last_line());
        for step in 1..=context_lines {
            match first.checked_sub(step) {
                Some(line) if line >= 1 && is_context(line) => block.add_context_line(line),
                _ => break,
            }
        }
        for step in 1..=context_lines {
            match last.checked_add(step) {
                Some(line) if is_context(line) => block.add_context_line(line),
                _ => break,
            }
        }
        block
    });

    merge_touching(extended)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(lines: &[LineNumber]) -> LineSet {
        lines.iter().copied().collect()
    }

    fn shape(blocks: &[ChangeBlock]) -> Vec<(Vec<LineNumber>, bool)> {
        blocks
            .iter()
            .map(|b| (b.lines().iter().copied().collect(), b.is_potential()))
            .collect()
    }

    #[test]
    fn gap_of_one_changed_line_becomes_one_potential_block() {
        let changed = set(&[10, 11, 12]);
        let covered = set(&[10, 12]);
        let common = set(&[10, 12]);

        let blocks = change_blocks(&common, &changed, &covered, 1);
        assert_eq!(shape(&blocks), vec![(vec![10, 11, 12], true)]);
    }

    #[test]
    fn extension_disabled_keeps_confirmed_blocks() {
        let changed = set(&[10, 11, 12]);
        let covered = set(&[10, 12]);
        let common = set(&[10, 12]);

        let blocks = change_blocks(&common, &changed, &covered, 0);
        assert_eq!(
            shape(&blocks),
            vec![(vec![10], false), (vec![12], false)]
        );
    }

    #[test]
    fn covered_neighbour_is_not_context() {
        // 8 is covered and unchanged, 7 is neither.
        let changed = set(&[5, 6, 9]);
        let covered = set(&[5, 6, 9, 8]);
        let common = set(&[5, 6, 9]);

        let blocks = change_blocks(&common, &changed, &covered, 1);
        assert_eq!(
            shape(&blocks),
            vec![(vec![5, 6], false), (vec![9], false)]
        );
    }

    #[test]
    fn wider_context_stops_at_first_non_context_line() {
        let changed = set(&[3, 4, 5, 6, 7, 8, 10]);
        let covered = set(&[6, 10]);
        let common = set(&[6, 10]);

        let blocks = change_blocks(&common, &changed, &covered, 3);
        assert_eq!(
            shape(&blocks),
            vec![(vec![3, 4, 5, 6, 7, 8], true), (vec![10], false)]
        );
    }

    #[test]
    fn extension_never_reaches_line_zero() {
        let changed = set(&[1, 2]);
        let covered = set(&[1]);
        let common = set(&[1]);

        let blocks = change_blocks(&common, &changed, &covered, 2);
        assert_eq!(shape(&blocks), vec![(vec![1, 2], true)]);
    }

    #[test]
    fn no_common_lines_means_no_blocks() {
        let blocks = change_blocks(&LineSet::new(), &set(&[1, 2]), &LineSet::new(), 1);
        assert!(blocks.is_empty());
    }

    #[test]
    fn source_sets_blocks_once() {
        use crate::grouped::GroupedFile;
        use covhint_types::{CoverageEntry, DiffEntry};
        use std::collections::BTreeSet;

        let mut g = GroupedFile::new(
            "A.java",
            "t1",
            BTreeSet::from([DiffEntry::new("A.java", 10, 3).unwrap()]),
            BTreeSet::from([CoverageEntry::new("A.java", "t1", 10, 1).unwrap()]),
        )
        .unwrap();
        g.set_changed_lines(set(&[10, 11, 12])).unwrap();
        g.set_covered_lines(set(&[10])).unwrap();
        g.set_common_lines(set(&[10])).unwrap();

        let mut bb = Blackboard::default();
        bb.set_grouped_files(vec![g]).unwrap();

        let source = MergeIntoChangeBlocks::new(1);
        assert!(source.can_apply(&bb));
        assert!(source.apply(&mut bb).unwrap());
        assert!(!source.can_apply(&bb));

        let blocks = bb.grouped_files().unwrap()[0].common_changes().unwrap();
        assert_eq!(shape(blocks), vec![(vec![10, 11], true)]);
    }
}
