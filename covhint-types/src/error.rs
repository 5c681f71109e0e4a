//! Ingestion errors.
//!
//! Spans are validated when wire entries are converted into [`DiffEntry`](crate::DiffEntry) and
//! [`CoverageEntry`](crate::CoverageEntry). Nothing malformed ever reaches a blackboard.

use thiserror::Error;

/// A diff or coverage entry whose span cannot describe real solution lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInputError {
    /// The entry names no file.
    #[error("entry has an empty file path")]
    EmptyFilePath,

    /// A coverage entry names no test case.
    #[error("coverage entry for {file_path} has an empty test case id")]
    EmptyTestCase { file_path: String },

    /// `line_count` is below zero.
    #[error("{file_path}: negative line count {line_count}")]
    NegativeLineCount { file_path: String, line_count: i64 },

    /// A non-empty span starts before line 1, or an empty span before line 0.
    #[error("{file_path}: invalid start line {start_line} for {line_count} line(s)")]
    InvalidStartLine {
        file_path: String,
        start_line: i64,
        line_count: i64,
    },

    /// The span runs past the largest representable line number.
    #[error("{file_path}: span {start_line}+{line_count} overflows the line range")]
    SpanOverflow {
        file_path: String,
        start_line: i64,
        line_count: i64,
    },
}
