//! Knowledge source explanations for the `covhint explain` command.
//!
//! Provides, for each source:
//! - What it derives and from which fields
//! - When it is allowed to run
//! - What counts as progress

/// Information about one knowledge source.
#[derive(Debug, Clone)]
pub struct SourceExplanation {
    /// Short key (user-facing, e.g., "merge-blocks").
    pub key: &'static str,
    /// Engine name of the source (e.g., "merge_into_change_blocks").
    pub source_name: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// Detailed description of what the source derives.
    pub description: &'static str,
    /// When the engine may apply the source.
    pub precondition: &'static str,
    /// What the source reports as progress.
    pub progress: &'static str,
}

/// Registry of every built-in knowledge source, in engine order.
pub static SOURCE_REGISTRY: &[SourceExplanation] = &[
    // 1) Grouping
    SourceExplanation {
        key: "group",
        source_name: "group_by_file_and_test_case",
        title: "Group By File And Test Case",
        description: r#"Builds one grouped file per (file path, test case) pair.

Only files that appear in both the diff report and the coverage report are
grouped. A changed file that no test executes carries no signal, and a covered
file that did not change has nothing to localize. Each grouped file receives
the full set of the file's diff entries and the coverage entries of its test
case. The result is ordered by file path, then test case."#,
        precondition: "Grouped files have not been built yet.",
        progress: "Always reports progress, even when no pair qualifies.",
    },
    // 2) Changed lines
    SourceExplanation {
        key: "changed-lines",
        source_name: "extract_changed_lines",
        title: "Extract Changed Lines",
        description: r#"Expands every diff entry of a grouped file into line numbers and unions them.

An entry starting at line 10 with a count of 3 contributes lines 10, 11 and 12.
An entry with a count of 0 contributes nothing."#,
        precondition: "Some grouped file has no changed lines yet.",
        progress: "Reports progress when at least one grouped file was filled in.",
    },
    // 3) Covered lines
    SourceExplanation {
        key: "covered-lines",
        source_name: "extract_covered_lines",
        title: "Extract Covered Lines",
        description: r#"Expands every coverage entry of a grouped file into line numbers and unions them.

Every pending grouped file receives its covered set, including an empty one, so
later stages can settle. Zero-length coverage entries contribute no lines."#,
        precondition: "Some grouped file has no covered lines yet.",
        progress: "Reports progress only when at least one resulting set is non-empty.",
    },
    // 4) Common lines
    SourceExplanation {
        key: "common-lines",
        source_name: "compute_common_lines",
        title: "Compute Common Lines",
        description: r#"Intersects the changed lines with the covered lines of each grouped file.

These are the lines that both differ from the template and were executed by the
test case, the most likely place for the behavior the test checks."#,
        precondition: "Changed and covered lines are set and common lines are not.",
        progress: "Reports progress when at least one grouped file was filled in.",
    },
    // 5) Change blocks
    SourceExplanation {
        key: "merge-blocks",
        source_name: "merge_into_change_blocks",
        title: "Merge Into Change Blocks",
        description: r#"Folds the common lines into blocks of consecutive lines.

Two blocks touch when the first line of one lies between the first line and
one past the last line of the other. Touching blocks are merged.

With context enabled (`context_lines`, default 1), each block then grows
outward by up to that many lines on each side, as long as the next line is
changed but not covered. A block that grew is marked potential. Blocks that
touch after growing are merged again. Lines added this way are context for the
reader, not evidence."#,
        precondition: "Common lines are set and change blocks are not.",
        progress: "Reports progress when at least one grouped file was filled in.",
    },
    // 6) Hint emission
    SourceExplanation {
        key: "emit-hints",
        source_name: "emit_localized_hints",
        title: "Emit Localized Hints",
        description: r#"Flattens every change block into a hint tied to its file and test case.

Each hint carries a stable id derived from file, test case and line range.
Hints are ordered by file, test case and first line. With `--no-potential`,
a potential block is narrowed to its changed and covered lines, which are emitted
as confirmed hints. The grouped files keep the potential block."#,
        precondition: "Every grouped file has its change blocks and no hints were emitted yet.",
        progress: "Always reports progress.",
    },
];

/// Look up a source by key or engine name, ignoring case and `_`/`-` differences.
pub fn lookup_source(query: &str) -> Option<&'static SourceExplanation> {
    let query_lower = query.trim().to_lowercase();
    let query_normalized = query_lower.replace('_', "-");

    SOURCE_REGISTRY.iter().find(|source| {
        source.key == query_normalized
            || source.source_name == query_lower
            || source.source_name.replace('_', "-") == query_normalized
    })
}

/// List all available source keys.
pub fn list_source_keys() -> Vec<&'static str> {
    SOURCE_REGISTRY.iter().map(|s| s.key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use covhint_domain::builtin_source_metas;

    #[test]
    fn test_lookup_by_key() {
        let source = lookup_source("merge-blocks").expect("should find merge-blocks");
        assert_eq!(source.source_name, "merge_into_change_blocks");
    }

    #[test]
    fn test_lookup_by_source_name() {
        let source = lookup_source("compute_common_lines").expect("should find by name");
        assert_eq!(source.key, "common-lines");
    }

    #[test]
    fn test_lookup_case_and_separator_insensitive() {
        assert!(lookup_source("EMIT-HINTS").is_some());
        assert!(lookup_source("emit_hints").is_some());
        assert!(lookup_source("Extract-Covered-Lines").is_some());
    }

    #[test]
    fn test_unknown_source() {
        assert!(lookup_source("rank-hints").is_none());
    }

    #[test]
    fn test_registry_matches_engine_order() {
        let registered: Vec<_> = SOURCE_REGISTRY.iter().map(|s| s.source_name).collect();
        let builtin: Vec<_> = builtin_source_metas().iter().map(|m| m.name).collect();
        assert_eq!(registered, builtin);
    }
}
