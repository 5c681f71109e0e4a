//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use covhint_reports::LoadedInputs;

/// Source of the diff and coverage reports.
pub trait ReportSource {
    fn load_inputs(&self) -> anyhow::Result<LoadedInputs>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
