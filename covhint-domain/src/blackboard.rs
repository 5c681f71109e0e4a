use crate::error::CorrelationError;
use crate::grouped::GroupedFile;
use covhint_types::hints::LocalizedHint;
use covhint_types::input::{CoverageReport, DiffReport};

/// State shared by the knowledge sources during one engine run.
///
/// Holds the two input reports and what the sources derive from them. No logic lives here beyond
/// guarding the unset-to-set transitions.
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    diff_report: DiffReport,
    coverage_report: CoverageReport,
    grouped_files: Option<Vec<GroupedFile>>,
    hints: Option<Vec<LocalizedHint>>,
}

impl Blackboard {
    pub fn new(diff_report: DiffReport, coverage_report: CoverageReport) -> Self {
        Self {
            diff_report,
            coverage_report,
            grouped_files: None,
            hints: None,
        }
    }

    pub fn diff_report(&self) -> &DiffReport {
        &self.diff_report
    }

    pub fn coverage_report(&self) -> &CoverageReport {
        &self.coverage_report
    }

    pub fn grouped_files(&self) -> Option<&[GroupedFile]> {
        self.grouped_files.as_deref()
    }

    pub fn grouped_files_mut(&mut self) -> Result<&mut [GroupedFile], CorrelationError> {
        self.grouped_files
            .as_deref_mut()
            .ok_or(CorrelationError::NotGrouped)
    }

    pub fn set_grouped_files(&mut self, grouped: Vec<GroupedFile>) -> Result<(), CorrelationError> {
        if self.grouped_files.is_some() {
            return Err(CorrelationError::AlreadyGrouped);
        }
        self.grouped_files = Some(grouped);
        Ok(())
    }

    pub fn hints(&self) -> Option<&[LocalizedHint]> {
        self.hints.as_deref()
    }

    pub fn set_hints(&mut self, hints: Vec<LocalizedHint>) -> Result<(), CorrelationError> {
        if self.hints.is_some() {
            return Err(CorrelationError::HintsAlreadyEmitted);
        }
        self.hints = Some(hints);
        Ok(())
    }

    /// Grouped files for which `pending` holds; empty before grouping.
    pub fn any_grouped(&self, pending: impl Fn(&GroupedFile) -> bool) -> bool {
        self.grouped_files
            .as_deref()
            .is_some_and(|files| files.iter().any(pending))
    }

    /// Split into the finished grouped files and emitted hints.
    pub fn into_results(self) -> (Vec<GroupedFile>, Vec<LocalizedHint>) {
        (
            self.grouped_files.unwrap_or_default(),
            self.hints.unwrap_or_default(),
        )
    }
}
