use crate::lines::LineNumber;
use crate::tool::{RunInfo, ToolInfo};
use serde::{Deserialize, Serialize};

/// `covhint.hints.v1`: the localized change blocks of one exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintReport {
    pub schema: String,
    pub tool: ToolInfo,

    #[serde(default)]
    pub run: RunInfo,

    pub inputs: HintInputs,
    pub policy: HintPolicy,
    pub summary: HintSummary,

    #[serde(default)]
    pub hints: Vec<LocalizedHint>,

    /// One row per (file, test case) group, including groups that produced no hint.
    #[serde(default)]
    pub groups: Vec<GroupSummary>,
}

impl HintReport {
    pub fn new(tool: ToolInfo, inputs: HintInputs, policy: HintPolicy) -> Self {
        Self {
            schema: crate::schema::COVHINT_HINTS_V1.to_string(),
            tool,
            run: RunInfo::default(),
            inputs,
            policy,
            summary: HintSummary::default(),
            hints: vec![],
            groups: vec![],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_sha256: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_sha256: Option<String>,

    #[serde(default)]
    pub diff_entries: u64,

    #[serde(default)]
    pub coverage_entries: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintPolicy {
    pub context_lines: u32,
    pub include_potential: bool,

    #[serde(default)]
    pub snippets: bool,
}

impl Default for HintPolicy {
    fn default() -> Self {
        Self {
            context_lines: 1,
            include_potential: true,
            snippets: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintSummary {
    pub grouped_files: u64,
    pub files: u64,
    pub test_cases: u64,
    pub blocks: u64,
    pub potential_blocks: u64,

    /// Groups whose coverage never met the change.
    pub groups_without_signal: u64,

    /// Knowledge-source applications the engine needed to settle.
    pub applications: u64,
}

/// A change block tied to the test case that exercises it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedHint {
    /// Stable across runs on identical input.
    pub id: String,
    pub file_path: String,
    pub test_case: String,
    pub start_line: LineNumber,
    pub end_line: LineNumber,
    pub lines: Vec<LineNumber>,
    pub potential: bool,

    /// Solution source for `start_line..=end_line`, when a solution root was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub file_path: String,
    pub test_case: String,
    pub changed_lines: u64,
    pub covered_lines: u64,
    pub common_lines: u64,
    pub blocks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_report_uses_hints_schema() {
        let tool = ToolInfo {
            name: "covhint".to_string(),
            version: Some("0.1.0".to_string()),
            commit: None,
        };
        let report = HintReport::new(tool, HintInputs::default(), HintPolicy::default());
        assert_eq!(report.schema, crate::schema::COVHINT_HINTS_V1);
        assert!(report.hints.is_empty());
        assert_eq!(report.summary, HintSummary::default());
    }

    #[test]
    fn hint_omits_code_when_absent() {
        let hint = LocalizedHint {
            id: "x".to_string(),
            file_path: "A.java".to_string(),
            test_case: "t1".to_string(),
            start_line: 4,
            end_line: 5,
            lines: vec![4, 5],
            potential: false,
            code: None,
        };
        let json = serde_json::to_string(&hint).unwrap();
        assert!(!json.contains("code"));
        assert!(json.contains("\"potential\":false"));
    }
}
