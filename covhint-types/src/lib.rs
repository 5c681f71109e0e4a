//! Shared DTOs (schemas-as-code) for the covhint workspace.
//!
//! # Design constraints
//! - Input envelopes are read from disk and must stay tolerant of extra fields.
//! - The hint report is written to disk; prefer adding optional fields over changing semantics.
//! - Everything that reaches the engine has already been validated here.

pub mod error;
pub mod hints;
pub mod input;
pub mod lines;
pub mod tool;

pub use error::MalformedInputError;
pub use lines::{
    ChangeBlock, CoverageEntry, DiffEntry, LineNumber, LineSet, LineSpan, expand, merge_touching,
};

/// Schema identifiers.
pub mod schema {
    pub const COVHINT_DIFF_V1: &str = "covhint.diff.v1";
    pub const COVHINT_COVERAGE_V1: &str = "covhint.coverage.v1";
    pub const COVHINT_HINTS_V1: &str = "covhint.hints.v1";
}
