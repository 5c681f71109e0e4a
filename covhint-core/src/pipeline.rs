//! The localize pipeline, extracted from the CLI.
//!
//! I/O-agnostic: reports come in through a [`ReportSource`] and artifacts go out through a
//! [`WritePort`]. Only the optional snippet lookup reads the solution checkout directly.

use crate::ports::{ReportSource, WritePort};
use crate::settings::LocalizeSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use covhint_domain::{Engine, EngineConfig, EngineError, FsSourceView, Localizer, SourceView};
use covhint_reports::ReportLoadError;
use covhint_types::hints::HintReport;
use covhint_types::input::CoverageReport;
use covhint_types::tool::{RunInfo, ToolInfo};
use tracing::debug;

/// File name of the hint report inside the output directory.
pub const HINTS_FILE: &str = "hints.json";

/// Error type for pipeline results. Exit code 2 = rejected input, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("rejected input: {0}")]
    InvalidInput(ReportLoadError),

    #[error("correlation failed")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::InvalidInput(_) => 2,
            ToolError::Engine(_) | ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_localize`.
#[derive(Debug, Clone)]
pub struct LocalizeOutcome {
    pub report: HintReport,
}

/// Run the localize pipeline and return the hint report.
///
/// The caller is responsible for writing artifacts (via `WritePort`) or the convenience
/// `write_localize_artifacts` helper.
pub fn run_localize(
    settings: &LocalizeSettings,
    reports: &dyn ReportSource,
    tool: ToolInfo,
) -> Result<LocalizeOutcome, ToolError> {
    let started_at = Utc::now();

    let inputs = reports.load_inputs().map_err(classify_load_error)?;

    let mut config = EngineConfig {
        context_lines: settings.context_lines,
        include_potential: settings.include_potential,
        max_applications: settings.max_applications,
    };
    if config.max_applications.is_none() {
        let bound = Engine::new(&config).application_bound(pair_count(&inputs.coverage));
        debug!(bound, "derived application cap from input size");
        config.max_applications = Some(bound);
    }

    let view = settings.solution_root.clone().map(FsSourceView::new);
    let localization = Localizer::new(config).localize(
        &inputs.diff,
        &inputs.coverage,
        tool,
        view.as_ref().map(|v| v as &dyn SourceView),
    )?;

    let mut report = localization.report;
    report.run = RunInfo {
        started_at: Some(started_at),
        ended_at: Some(Utc::now()),
    };

    debug!(
        hints = report.hints.len(),
        grouped = report.summary.grouped_files,
        "localize pipeline finished"
    );
    Ok(LocalizeOutcome { report })
}

/// Write `hints.json` into `out_dir`.
pub fn write_localize_artifacts(
    outcome: &LocalizeOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let mut json = serde_json::to_string_pretty(&outcome.report).context("serialize hints")?;
    json.push('\n');
    writer.write_file(&out_dir.join(HINTS_FILE), json.as_bytes())?;
    Ok(())
}

fn classify_load_error(err: anyhow::Error) -> ToolError {
    let rejected = err
        .chain()
        .find_map(|e| e.downcast_ref::<ReportLoadError>())
        .filter(|load| load.is_rejected_input())
        .cloned();
    match rejected {
        Some(load) => ToolError::InvalidInput(load),
        None => ToolError::Internal(err),
    }
}

fn pair_count(coverage: &CoverageReport) -> usize {
    coverage.files().map(|(_, by_test_case)| by_test_case.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use covhint_domain::CorrelationError;

    #[test]
    fn exit_codes_separate_input_from_tool_errors() {
        let invalid = ToolError::InvalidInput(ReportLoadError::Json {
            path: Utf8PathBuf::from("diff/report.json"),
            message: "eof".to_string(),
        });
        let engine = ToolError::Engine(EngineError::Correlation {
            source_name: "extract_changed_lines",
            error: CorrelationError::NotGrouped,
        });
        let internal = ToolError::Internal(anyhow::anyhow!("disk full"));

        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(engine.exit_code(), 1);
        assert_eq!(internal.exit_code(), 1);
    }

    #[test]
    fn io_load_errors_are_internal() {
        let err = anyhow::Error::new(ReportLoadError::Io {
            path: Utf8PathBuf::from("diff/report.json"),
            message: "permission denied".to_string(),
        })
        .context("load inputs from artifacts");
        assert!(matches!(classify_load_error(err), ToolError::Internal(_)));
    }

    #[test]
    fn malformed_load_errors_are_rejected_input() {
        let err = anyhow::Error::new(ReportLoadError::Malformed {
            path: Utf8PathBuf::from("coverage/report.json"),
            error: covhint_types::MalformedInputError::EmptyFilePath,
        })
        .context("load inputs from artifacts");
        let tool_err = classify_load_error(err);
        assert!(matches!(tool_err, ToolError::InvalidInput(_)));
        assert_eq!(tool_err.exit_code(), 2);
    }
}
