use super::{KnowledgeSource, SourceMeta};
use crate::blackboard::Blackboard;
use crate::error::{CorrelationError, Stage};
use crate::grouped::GroupedFile;
use covhint_types::{ChangeBlock, LineSet};
use covhint_types::hints::LocalizedHint;
use tracing::debug;
use uuid::Uuid;

/// Flattens finished groups into (file, test case, block) hint records.
pub struct EmitLocalizedHints {
    include_potential: bool,
}

impl EmitLocalizedHints {
    pub const META: SourceMeta = SourceMeta {
        name: "emit_localized_hints",
        reads: &["common_changes"],
        writes: "hints",
        summary: "One hint per change block, tied to the test case that exercises it.",
    };

    pub fn new(include_potential: bool) -> Self {
        Self { include_potential }
    }
}

impl KnowledgeSource for EmitLocalizedHints {
    fn meta(&self) -> &'static SourceMeta {
        &Self::META
    }

    fn can_apply(&self, bb: &Blackboard) -> bool {
        bb.hints().is_none()
            && bb
                .grouped_files()
                .is_some_and(|files| files.iter().all(|g| g.is_set(Stage::CommonChanges)))
    }

    fn apply(&self, bb: &mut Blackboard) -> Result<bool, CorrelationError> {
        let grouped = bb.grouped_files().ok_or(CorrelationError::NotGrouped)?;

        let mut hints = Vec::new();
        let mut narrowed = 0usize;
        for g in grouped {
            let Some(blocks) = g.common_changes() else {
                continue;
            };
            for block in blocks {
                if block.is_potential() && !self.include_potential {
                    narrowed += 1;
                    hints.extend(
                        confirmed_blocks(g, block)
                            .iter()
                            .map(|confirmed| localized_hint(g, confirmed)),
                    );
                    continue;
                }
                hints.push(localized_hint(g, block));
            }
        }

        hints.sort_by(|a, b| {
            (&a.file_path, &a.test_case, a.start_line).cmp(&(&b.file_path, &b.test_case, b.start_line))
        });

        debug!(hints = hints.len(), narrowed, "emitted localized hints");
        bb.set_hints(hints)?;
        Ok(true)
    }
}

/// The evidence lines of a potential block, without the context lines it grew by.
fn confirmed_blocks(g: &GroupedFile, block: &ChangeBlock) -> Vec<ChangeBlock> {
    let Some(common) = g.common_lines() else {
        return Vec::new();
    };
    let confirmed: LineSet = block.lines().intersection(common).copied().collect();
    ChangeBlock::from_lines(&confirmed)
}

fn localized_hint(g: &GroupedFile, block: &ChangeBlock) -> LocalizedHint {
    let start_line = block.first_line();
    let end_line = block.last_line();
    LocalizedHint {
        id: hint_id(g.file_path(), g.test_case(), start_line, end_line).to_string(),
        file_path: g.file_path().to_string(),
        test_case: g.test_case().to_string(),
        start_line,
        end_line,
        lines: block.lines().iter().copied().collect(),
        potential: block.is_potential(),
        code: None,
    }
}

/// Deterministic hint id: v5 over `file|test_case|start|end`.
pub fn hint_id(file_path: &str, test_case: &str, start_line: u32, end_line: u32) -> Uuid {
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x9c, 0x21, 0x6e, 0x0b, 0x3f, 0x4d, 0x4a, 0x7e, 0xa5, 0x18, 0x62, 0xd4, 0x0e, 0x91, 0xc3,
        0x57,
    ]);

    let stable_key = format!("{file_path}|{test_case}|{start_line}|{end_line}");
    Uuid::new_v5(&NAMESPACE, stable_key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use covhint_types::{CoverageEntry, DiffEntry};
    use std::collections::BTreeSet;

    fn finished(file: &str, test_case: &str, blocks: Vec<ChangeBlock>) -> GroupedFile {
        finished_with_common(file, test_case, &[], blocks)
    }

    fn finished_with_common(
        file: &str,
        test_case: &str,
        common: &[u32],
        blocks: Vec<ChangeBlock>,
    ) -> GroupedFile {
        let mut g = GroupedFile::new(
            file,
            test_case,
            BTreeSet::from([DiffEntry::new(file, 1, 1).unwrap()]),
            BTreeSet::from([CoverageEntry::new(file, test_case, 1, 1).unwrap()]),
        )
        .unwrap();
        g.set_changed_lines(LineSet::new()).unwrap();
        g.set_covered_lines(LineSet::new()).unwrap();
        g.set_common_lines(common.iter().copied().collect()).unwrap();
        g.set_common_changes(blocks).unwrap();
        g
    }

    fn potential(lines: &[u32]) -> ChangeBlock {
        ChangeBlock::new(lines.iter().copied().collect(), true).unwrap()
    }

    #[test]
    fn hint_id_is_stable_and_distinct() {
        let a = hint_id("A.java", "t1", 10, 12);
        assert_eq!(a, hint_id("A.java", "t1", 10, 12));
        assert_ne!(a, hint_id("A.java", "t2", 10, 12));
        assert_ne!(a, hint_id("A.java", "t1", 10, 11));
        assert_eq!(a.get_version_num(), 5);
    }

    #[test]
    fn waits_until_every_group_has_blocks() {
        let pending = GroupedFile::new(
            "B.java",
            "t1",
            BTreeSet::from([DiffEntry::new("B.java", 1, 1).unwrap()]),
            BTreeSet::new(),
        )
        .unwrap();
        let mut bb = Blackboard::default();
        bb.set_grouped_files(vec![finished("A.java", "t1", vec![]), pending])
            .unwrap();

        assert!(!EmitLocalizedHints::new(true).can_apply(&bb));
    }

    #[test]
    fn flattens_blocks_in_file_test_line_order() {
        let mut bb = Blackboard::default();
        bb.set_grouped_files(vec![
            finished("A.java", "t1", vec![ChangeBlock::single(3), potential(&[7, 8])]),
            finished("A.java", "t2", vec![]),
            finished("B.java", "t1", vec![ChangeBlock::single(1)]),
        ])
        .unwrap();

        let source = EmitLocalizedHints::new(true);
        assert!(source.can_apply(&bb));
        assert!(source.apply(&mut bb).unwrap());
        assert!(!source.can_apply(&bb));

        let hints = bb.hints().unwrap();
        let keys: Vec<_> = hints
            .iter()
            .map(|h| (h.file_path.as_str(), h.test_case.as_str(), h.start_line, h.end_line, h.potential))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A.java", "t1", 3, 3, false),
                ("A.java", "t1", 7, 8, true),
                ("B.java", "t1", 1, 1, false),
            ]
        );
        assert_eq!(hints[1].lines, vec![7, 8]);
        assert_eq!(hints[1].id, hint_id("A.java", "t1", 7, 8).to_string());
    }

    #[test]
    fn excluded_potential_blocks_keep_their_confirmed_lines() {
        let mut bb = Blackboard::default();
        bb.set_grouped_files(vec![finished_with_common(
            "A.java",
            "t1",
            &[3, 10, 12],
            vec![ChangeBlock::single(3), potential(&[9, 10, 11, 12, 13])],
        )])
        .unwrap();

        EmitLocalizedHints::new(false).apply(&mut bb).unwrap();
        let hints = bb.hints().unwrap();
        let lines: Vec<_> = hints.iter().map(|h| h.lines.clone()).collect();
        assert_eq!(lines, vec![vec![3], vec![10], vec![12]]);
        assert!(hints.iter().all(|h| !h.potential));
        assert_eq!(hints[1].id, hint_id("A.java", "t1", 10, 10).to_string());

        let grouped = &bb.grouped_files().unwrap()[0];
        assert!(grouped.common_changes().unwrap()[1].is_potential());
    }

    #[test]
    fn potential_block_without_evidence_emits_nothing_when_excluded() {
        let mut bb = Blackboard::default();
        bb.set_grouped_files(vec![finished("A.java", "t1", vec![potential(&[7, 8])])])
            .unwrap();

        EmitLocalizedHints::new(false).apply(&mut bb).unwrap();
        assert_eq!(bb.hints().map(<[_]>::len), Some(0));
    }
}
