use crate::error::{CorrelationError, Stage};
use covhint_types::{ChangeBlock, CoverageEntry, DiffEntry, LineSet};
use serde::Serialize;
use std::collections::BTreeSet;

/// One (file, test case) pair and everything derived for it so far.
///
/// Each derived field starts unset and is filled exactly once, in stage order. Setters refuse to
/// overwrite, which is what bounds the engine loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedFile {
    file_path: String,
    test_case: String,
    diff_entries: BTreeSet<DiffEntry>,
    coverage_entries: BTreeSet<CoverageEntry>,
    changed_lines: Option<LineSet>,
    covered_lines: Option<LineSet>,
    common_lines: Option<LineSet>,
    common_changes: Option<Vec<ChangeBlock>>,
}

impl GroupedFile {
    /// Every entry must belong to `file_path` (and, for coverage, to `test_case`).
    pub fn new(
        file_path: impl Into<String>,
        test_case: impl Into<String>,
        diff_entries: BTreeSet<DiffEntry>,
        coverage_entries: BTreeSet<CoverageEntry>,
    ) -> Result<Self, CorrelationError> {
        let file_path = file_path.into();
        let test_case = test_case.into();

        if let Some(foreign) = diff_entries.iter().find(|e| e.file_path() != file_path) {
            return Err(CorrelationError::ForeignDiffEntry {
                file_path,
                test_case,
                entry_file: foreign.file_path().to_string(),
            });
        }
        if let Some(foreign) = coverage_entries
            .iter()
            .find(|e| e.file_path() != file_path || e.test_case() != test_case)
        {
            return Err(CorrelationError::ForeignCoverageEntry {
                file_path,
                test_case,
                entry_file: foreign.file_path().to_string(),
                entry_test_case: foreign.test_case().to_string(),
            });
        }

        Ok(Self {
            file_path,
            test_case,
            diff_entries,
            coverage_entries,
            changed_lines: None,
            covered_lines: None,
            common_lines: None,
            common_changes: None,
        })
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn test_case(&self) -> &str {
        &self.test_case
    }

    pub fn diff_entries(&self) -> &BTreeSet<DiffEntry> {
        &self.diff_entries
    }

    pub fn coverage_entries(&self) -> &BTreeSet<CoverageEntry> {
        &self.coverage_entries
    }

    pub fn changed_lines(&self) -> Option<&LineSet> {
        self.changed_lines.as_ref()
    }

    pub fn covered_lines(&self) -> Option<&LineSet> {
        self.covered_lines.as_ref()
    }

    pub fn common_lines(&self) -> Option<&LineSet> {
        self.common_lines.as_ref()
    }

    pub fn common_changes(&self) -> Option<&[ChangeBlock]> {
        self.common_changes.as_deref()
    }

    pub fn is_set(&self, stage: Stage) -> bool {
        match stage {
            Stage::ChangedLines => self.changed_lines.is_some(),
            Stage::CoveredLines => self.covered_lines.is_some(),
            Stage::CommonLines => self.common_lines.is_some(),
            Stage::CommonChanges => self.common_changes.is_some(),
        }
    }

    /// True once change blocks exist and at least one was found.
    pub fn has_signal(&self) -> bool {
        self.common_changes.as_ref().is_some_and(|b| !b.is_empty())
    }

    pub fn set_changed_lines(&mut self, lines: LineSet) -> Result<(), CorrelationError> {
        self.ensure_unset(Stage::ChangedLines)?;
        self.changed_lines = Some(lines);
        Ok(())
    }

    pub fn set_covered_lines(&mut self, lines: LineSet) -> Result<(), CorrelationError> {
        self.ensure_unset(Stage::CoveredLines)?;
        self.covered_lines = Some(lines);
        Ok(())
    }

    pub fn set_common_lines(&mut self, lines: LineSet) -> Result<(), CorrelationError> {
        self.ensure_unset(Stage::CommonLines)?;
        self.common_lines = Some(lines);
        Ok(())
    }

    pub fn set_common_changes(&mut self, blocks: Vec<ChangeBlock>) -> Result<(), CorrelationError> {
        self.ensure_unset(Stage::CommonChanges)?;
        self.common_changes = Some(blocks);
        Ok(())
    }

    /// The value of an earlier stage that a later one depends on.
    pub fn require(&self, stage: Stage) -> Result<&LineSet, CorrelationError> {
        let value = match stage {
            Stage::ChangedLines => self.changed_lines.as_ref(),
            Stage::CoveredLines => self.covered_lines.as_ref(),
            Stage::CommonLines => self.common_lines.as_ref(),
            Stage::CommonChanges => None,
        };
        value.ok_or_else(|| CorrelationError::MissingStage {
            file_path: self.file_path.clone(),
            test_case: self.test_case.clone(),
            stage,
        })
    }

    fn ensure_unset(&self, stage: Stage) -> Result<(), CorrelationError> {
        if self.is_set(stage) {
            return Err(CorrelationError::StageAlreadySet {
                file_path: self.file_path.clone(),
                test_case: self.test_case.clone(),
                stage,
            });
        }
        Ok(())
    }
}
