//! Line-range model: diff spans, coverage spans, expanded line sets and merged change blocks.

use crate::error::MalformedInputError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::Range;

/// 1-based line number in a solution file.
pub type LineNumber = u32;

/// Expanded, ordered set of line numbers.
pub type LineSet = BTreeSet<LineNumber>;

/// A contiguous run of solution lines.
pub trait LineSpan {
    fn start_line(&self) -> LineNumber;

    fn line_count(&self) -> u32;

    /// Lines covered by this span; empty when `line_count` is zero.
    fn lines(&self) -> Range<LineNumber> {
        let start = self.start_line();
        start..start.saturating_add(self.line_count())
    }
}

/// Expand every span and union the result.
pub fn expand<'a, S, I>(spans: I) -> LineSet
where
    S: LineSpan + 'a,
    I: IntoIterator<Item = &'a S>,
{
    spans.into_iter().flat_map(|s| s.lines()).collect()
}

fn validate_span(
    file_path: &str,
    start_line: i64,
    line_count: i64,
) -> Result<(LineNumber, u32), MalformedInputError> {
    if file_path.trim().is_empty() {
        return Err(MalformedInputError::EmptyFilePath);
    }
    if line_count < 0 {
        return Err(MalformedInputError::NegativeLineCount {
            file_path: file_path.to_string(),
            line_count,
        });
    }

    // Zero-length hunks (pure deletions) are anchored at the line before them, which may be 0.
    let min_start = if line_count == 0 { 0 } else { 1 };
    if start_line < min_start {
        return Err(MalformedInputError::InvalidStartLine {
            file_path: file_path.to_string(),
            start_line,
            line_count,
        });
    }

    let overflow = || MalformedInputError::SpanOverflow {
        file_path: file_path.to_string(),
        start_line,
        line_count,
    };
    let end = start_line.checked_add(line_count).ok_or_else(overflow)?;
    if end > i64::from(LineNumber::MAX) {
        return Err(overflow());
    }

    let start = LineNumber::try_from(start_line).map_err(|_| overflow())?;
    let count = u32::try_from(line_count).map_err(|_| overflow())?;
    Ok((start, count))
}

/// A span of lines that differ between the template and the solution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DiffEntry {
    file_path: String,
    start_line: LineNumber,
    line_count: u32,
}

impl DiffEntry {
    pub fn new(
        file_path: impl Into<String>,
        start_line: i64,
        line_count: i64,
    ) -> Result<Self, MalformedInputError> {
        let file_path = file_path.into();
        let (start_line, line_count) = validate_span(&file_path, start_line, line_count)?;
        Ok(Self {
            file_path,
            start_line,
            line_count,
        })
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }
}

impl LineSpan for DiffEntry {
    fn start_line(&self) -> LineNumber {
        self.start_line
    }

    fn line_count(&self) -> u32 {
        self.line_count
    }
}

/// A span of lines executed by one test case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CoverageEntry {
    file_path: String,
    test_case: String,
    start_line: LineNumber,
    line_count: u32,
}

impl CoverageEntry {
    pub fn new(
        file_path: impl Into<String>,
        test_case: impl Into<String>,
        start_line: i64,
        line_count: i64,
    ) -> Result<Self, MalformedInputError> {
        let file_path = file_path.into();
        let test_case = test_case.into();
        let (start_line, line_count) = validate_span(&file_path, start_line, line_count)?;
        if test_case.trim().is_empty() {
            return Err(MalformedInputError::EmptyTestCase { file_path });
        }
        Ok(Self {
            file_path,
            test_case,
            start_line,
            line_count,
        })
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn test_case(&self) -> &str {
        &self.test_case
    }
}

impl LineSpan for CoverageEntry {
    fn start_line(&self) -> LineNumber {
        self.start_line
    }

    fn line_count(&self) -> u32 {
        self.line_count
    }
}

/// A maximal run of touching lines that a test case exercises inside a change.
///
/// Ordering is by the lowest line first, which is the order blocks are merged and reported in.
///
/// A block always holds at least one line: `new` rejects an empty set, `single` and
/// `from_lines` build from individual lines, and `add_context_line` and `absorb` only grow it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChangeBlock {
    lines: LineSet,
    potential: bool,
}

impl ChangeBlock {
    /// Returns `None` for an empty line set.
    pub fn new(lines: LineSet, potential: bool) -> Option<Self> {
        if lines.is_empty() {
            return None;
        }
        Some(Self { lines, potential })
    }

    pub fn single(line: LineNumber) -> Self {
        Self {
            lines: LineSet::from([line]),
            potential: false,
        }
    }

    pub fn lines(&self) -> &LineSet {
        &self.lines
    }

    pub fn is_potential(&self) -> bool {
        self.potential
    }

    /// Lowest line of the block. The fallback is unreachable since blocks are never empty.
    pub fn first_line(&self) -> LineNumber {
        debug_assert!(!self.lines.is_empty());
        self.lines.first().copied().unwrap_or_default()
    }

    /// Highest line of the block; never empty, see [`ChangeBlock::first_line`].
    pub fn last_line(&self) -> LineNumber {
        debug_assert!(!self.lines.is_empty());
        self.lines.last().copied().unwrap_or_default()
    }

    /// True when the blocks overlap or are directly adjacent.
    pub fn touches(&self, other: &ChangeBlock) -> bool {
        fn starts_within(line: LineNumber, block: &ChangeBlock) -> bool {
            block.first_line() <= line && line <= block.last_line().saturating_add(1)
        }
        starts_within(self.first_line(), other) || starts_within(other.first_line(), self)
    }

    /// Add a context line that is changed but not covered. Marks the block potential.
    pub fn add_context_line(&mut self, line: LineNumber) {
        if self.lines.insert(line) {
            self.potential = true;
        }
    }

    /// Union `other` into this block; the result is potential if either side was.
    pub fn absorb(&mut self, other: ChangeBlock) {
        self.lines.extend(other.lines);
        self.potential |= other.potential;
    }

    /// Fold a line set into confirmed blocks of consecutive lines.
    pub fn from_lines(lines: &LineSet) -> Vec<ChangeBlock> {
        merge_touching(lines.iter().copied().map(ChangeBlock::single))
    }
}

/// Sort blocks by their first line and merge every touching pair.
pub fn merge_touching(blocks: impl IntoIterator<Item = ChangeBlock>) -> Vec<ChangeBlock> {
    let mut sorted: Vec<ChangeBlock> = blocks.into_iter().collect();
    sorted.sort();

    let mut out: Vec<ChangeBlock> = Vec::with_capacity(sorted.len());
    for block in sorted {
        match out.last_mut() {
            Some(last) if last.touches(&block) => last.absorb(block),
            _ => out.push(block),
        }
    }
    out
}
