use camino::{Utf8Path, Utf8PathBuf};
use covhint_types::MalformedInputError;
use covhint_types::input::{CoverageReport, CoverageReportV1, DiffReport, DiffReportV1};
use covhint_types::schema;
use fs_err as fs;
use glob::glob;
use thiserror::Error;
use tracing::{debug, warn};

/// Directory name under the artifacts dir that holds the template/solution diff.
pub const DIFF_SENSOR: &str = "diff";

/// Directory name under the artifacts dir that holds per-test coverage.
pub const COVERAGE_SENSOR: &str = "coverage";

/// Both engine inputs. A report that was not found on disk is empty.
#[derive(Debug, Clone, Default)]
pub struct LoadedInputs {
    pub diff: DiffReport,
    pub coverage: CoverageReport,
    pub diff_path: Option<Utf8PathBuf>,
    pub coverage_path: Option<Utf8PathBuf>,
}

#[derive(Debug, Error, Clone)]
pub enum ReportLoadError {
    #[error("io error reading {path}: {message}")]
    Io { path: Utf8PathBuf, message: String },

    #[error("json parse error in {path}: {message}")]
    Json { path: Utf8PathBuf, message: String },

    #[error("malformed entry in {path}: {error}")]
    Malformed {
        path: Utf8PathBuf,
        #[source]
        error: MalformedInputError,
    },
}

impl ReportLoadError {
    /// True when the report was readable but its content must be rejected.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            ReportLoadError::Json { .. } | ReportLoadError::Malformed { .. }
        )
    }
}

/// Scan `artifacts_dir/*/report.json` for the diff and coverage reports.
pub fn load_inputs(artifacts_dir: &Utf8Path) -> Result<LoadedInputs, ReportLoadError> {
    let pattern = artifacts_dir.join("*/report.json");

    debug!(pattern = %pattern, "scanning artifacts for inputs");

    let io_error = |message: String| ReportLoadError::Io {
        path: pattern.clone(),
        message,
    };

    let mut loaded = LoadedInputs::default();
    for entry in glob(pattern.as_str()).map_err(|e| io_error(e.to_string()))? {
        let path = entry.map_err(|e| io_error(format!("glob error: {e}")))?;
        let path = Utf8PathBuf::from_path_buf(path)
            .map_err(|p| io_error(format!("non-utf8 path {}", p.display())))?;

        let sensor = path
            .parent()
            .and_then(|p| p.file_name())
            .unwrap_or("unknown")
            .to_string();

        match sensor.as_str() {
            DIFF_SENSOR => {
                let contents = read(&path)?;
                loaded.diff = parse_diff_report(&path, &contents)?;
                debug!(path = %path, files = loaded.diff.file_count(), "loaded diff report");
                loaded.diff_path = Some(path);
            }
            COVERAGE_SENSOR => {
                let contents = read(&path)?;
                loaded.coverage = parse_coverage_report(&path, &contents)?;
                debug!(
                    path = %path,
                    files = loaded.coverage.file_count(),
                    test_cases = loaded.coverage.test_case_count(),
                    "loaded coverage report"
                );
                loaded.coverage_path = Some(path);
            }
            other => {
                debug!(sensor = other, path = %path, "ignoring unrelated report");
            }
        }
    }

    Ok(loaded)
}

pub fn parse_diff_report(path: &Utf8Path, contents: &str) -> Result<DiffReport, ReportLoadError> {
    let wire: DiffReportV1 = serde_json::from_str(contents).map_err(|e| ReportLoadError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    check_schema(path, &wire.schema, schema::COVHINT_DIFF_V1);

    DiffReport::try_from(&wire).map_err(|error| ReportLoadError::Malformed {
        path: path.to_path_buf(),
        error,
    })
}

pub fn parse_coverage_report(
    path: &Utf8Path,
    contents: &str,
) -> Result<CoverageReport, ReportLoadError> {
    let wire: CoverageReportV1 =
        serde_json::from_str(contents).map_err(|e| ReportLoadError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    check_schema(path, &wire.schema, schema::COVHINT_COVERAGE_V1);

    CoverageReport::try_from(&wire).map_err(|error| ReportLoadError::Malformed {
        path: path.to_path_buf(),
        error,
    })
}

fn read(path: &Utf8Path) -> Result<String, ReportLoadError> {
    fs::read_to_string(path).map_err(|e| ReportLoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn check_schema(path: &Utf8Path, found: &str, expected: &str) {
    if found != expected {
        warn!(path = %path, found, expected, "unexpected schema id; reading anyway");
    }
}
