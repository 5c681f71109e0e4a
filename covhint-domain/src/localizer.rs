use crate::blackboard::Blackboard;
use crate::engine::{Engine, EngineConfig};
use crate::error::EngineError;
use crate::grouped::GroupedFile;
use crate::ports::SourceView;
use camino::Utf8Path;
use covhint_types::hints::{
    GroupSummary, HintInputs, HintPolicy, HintReport, HintSummary, LocalizedHint,
};
use covhint_types::input::{CoverageReport, DiffReport};
use covhint_types::tool::ToolInfo;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Everything one localization produced.
#[derive(Debug, Clone)]
pub struct Localization {
    pub report: HintReport,
    pub grouped: Vec<GroupedFile>,
}

/// Wraps one engine run over a fresh blackboard into a [`HintReport`].
pub struct Localizer {
    engine: Engine,
    config: EngineConfig,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Localizer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: Engine::new(&config),
            config,
        }
    }

    pub fn with_engine(engine: Engine, config: EngineConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Correlate the reports. With a `SourceView`, hints also carry their solution code.
    ///
    /// All-or-nothing: an engine error produces no report at all.
    pub fn localize(
        &self,
        diff: &DiffReport,
        coverage: &CoverageReport,
        tool: ToolInfo,
        sources: Option<&dyn SourceView>,
    ) -> Result<Localization, EngineError> {
        let policy = HintPolicy {
            context_lines: self.config.context_lines,
            include_potential: self.config.include_potential,
            snippets: sources.is_some(),
        };
        let inputs = HintInputs {
            diff_sha256: (!diff.is_empty()).then(|| sha256_json(diff)).flatten(),
            coverage_sha256: (!coverage.is_empty()).then(|| sha256_json(coverage)).flatten(),
            diff_entries: diff.entry_count() as u64,
            coverage_entries: coverage.entry_count() as u64,
        };

        let mut bb = Blackboard::new(diff.clone(), coverage.clone());
        let stats = self.engine.drive(&mut bb)?;
        let (grouped, mut hints) = bb.into_results();

        if let Some(view) = sources {
            attach_snippets(&mut hints, view);
        }

        let mut report = HintReport::new(tool, inputs, policy);
        report.summary = summarize(&grouped, &hints, stats.applications);
        report.groups = grouped.iter().map(group_summary).collect();
        report.hints = hints;

        debug!(
            grouped = report.summary.grouped_files,
            hints = report.summary.blocks,
            "localized hints"
        );
        Ok(Localization { report, grouped })
    }
}

fn sha256_json<T: Serialize>(value: &T) -> Option<String> {
    let bytes = serde_json::to_vec(value).ok()?;
    Some(hex::encode(Sha256::digest(&bytes)))
}

fn summarize(grouped: &[GroupedFile], hints: &[LocalizedHint], applications: usize) -> HintSummary {
    let files = hints
        .iter()
        .map(|h| h.file_path.as_str())
        .collect::<BTreeSet<_>>()
        .len() as u64;
    let test_cases = hints
        .iter()
        .map(|h| h.test_case.as_str())
        .collect::<BTreeSet<_>>()
        .len() as u64;

    HintSummary {
        grouped_files: grouped.len() as u64,
        files,
        test_cases,
        blocks: hints.len() as u64,
        potential_blocks: hints.iter().filter(|h| h.potential).count() as u64,
        groups_without_signal: grouped.iter().filter(|g| !g.has_signal()).count() as u64,
        applications: applications as u64,
    }
}

fn group_summary(g: &GroupedFile) -> GroupSummary {
    let size = |lines: Option<&covhint_types::LineSet>| lines.map_or(0, |l| l.len() as u64);
    GroupSummary {
        file_path: g.file_path().to_string(),
        test_case: g.test_case().to_string(),
        changed_lines: size(g.changed_lines()),
        covered_lines: size(g.covered_lines()),
        common_lines: size(g.common_lines()),
        blocks: g.common_changes().map_or(0, |b| b.len() as u64),
    }
}

/// Fill `code` from the solution sources. Each file is read at most once; unreadable files and
/// blocks past the end of the file leave `code` unset.
fn attach_snippets(hints: &mut [LocalizedHint], view: &dyn SourceView) {
    let mut cache: BTreeMap<String, Option<Vec<String>>> = BTreeMap::new();

    for hint in hints.iter_mut() {
        let lines = cache.entry(hint.file_path.clone()).or_insert_with(|| {
            match view.read_to_string(Utf8Path::new(&hint.file_path)) {
                Ok(contents) => Some(contents.lines().map(str::to_string).collect()),
                Err(e) => {
                    warn!(file = %hint.file_path, error = %e, "cannot read solution source");
                    None
                }
            }
        });

        let Some(lines) = lines else {
            continue;
        };
        hint.code = snippet(lines, hint.start_line, hint.end_line);
    }
}

fn snippet(lines: &[String], start_line: u32, end_line: u32) -> Option<String> {
    let first = usize::try_from(start_line).ok()?.checked_sub(1)?;
    if first >= lines.len() {
        return None;
    }
    let last = usize::try_from(end_line).ok()?.min(lines.len());
    Some(lines[first..last].join("\n"))
}
