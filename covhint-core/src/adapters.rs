//! Default filesystem-backed port implementations.

use crate::ports::{ReportSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use covhint_reports::LoadedInputs;
use fs_err as fs;

/// Loads reports from the filesystem via `covhint_reports::load_inputs`.
#[derive(Debug, Clone)]
pub struct FsReportSource {
    pub artifacts_dir: Utf8PathBuf,
}

impl FsReportSource {
    pub fn new(artifacts_dir: Utf8PathBuf) -> Self {
        Self { artifacts_dir }
    }
}

impl ReportSource for FsReportSource {
    fn load_inputs(&self) -> anyhow::Result<LoadedInputs> {
        covhint_reports::load_inputs(&self.artifacts_dir)
            .with_context(|| format!("load inputs from {}", self.artifacts_dir))
    }
}

/// In-memory report source for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportSource {
    inputs: LoadedInputs,
}

impl InMemoryReportSource {
    pub fn new(inputs: LoadedInputs) -> Self {
        Self { inputs }
    }
}

impl ReportSource for InMemoryReportSource {
    fn load_inputs(&self) -> anyhow::Result<LoadedInputs> {
        Ok(self.inputs.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
