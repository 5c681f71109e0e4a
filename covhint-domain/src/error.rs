use std::fmt;
use thiserror::Error;

/// A derived field of [`GroupedFile`](crate::GroupedFile), in the order the sources fill them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    ChangedLines,
    CoveredLines,
    CommonLines,
    CommonChanges,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ChangedLines => "changed_lines",
            Stage::CoveredLines => "covered_lines",
            Stage::CommonLines => "common_lines",
            Stage::CommonChanges => "common_changes",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A knowledge source found the blackboard in a state it must not proceed from.
///
/// These never come from bad input (that is rejected at ingestion); they mean a source ran out of
/// order or the blackboard was corrupted between applications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("{file_path} [{test_case}]: {stage} is already set")]
    StageAlreadySet {
        file_path: String,
        test_case: String,
        stage: Stage,
    },

    #[error("{file_path} [{test_case}]: {stage} is required but not computed yet")]
    MissingStage {
        file_path: String,
        test_case: String,
        stage: Stage,
    },

    #[error("{file_path} [{test_case}]: holds a diff entry for {entry_file}")]
    ForeignDiffEntry {
        file_path: String,
        test_case: String,
        entry_file: String,
    },

    #[error("{file_path} [{test_case}]: holds a coverage entry for {entry_file} [{entry_test_case}]")]
    ForeignCoverageEntry {
        file_path: String,
        test_case: String,
        entry_file: String,
        entry_test_case: String,
    },

    #[error("coverage for {file_path} [{test_case}] has no diff entries to correlate with")]
    CoverageWithoutDiff { file_path: String, test_case: String },

    #[error("grouped files have not been built yet")]
    NotGrouped,

    #[error("grouped files are already built")]
    AlreadyGrouped,

    #[error("localized hints were already emitted")]
    HintsAlreadyEmitted,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("knowledge source {source_name} failed")]
    Correlation {
        source_name: &'static str,
        #[source]
        error: CorrelationError,
    },

    #[error("engine exceeded the limit of {limit} knowledge source applications")]
    ApplicationLimit { limit: usize },
}
