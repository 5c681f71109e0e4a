//! Clap-free settings for the localize pipeline.

use camino::Utf8PathBuf;
use covhint_domain::DEFAULT_CONTEXT_LINES;

/// Settings for the localize pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizeSettings {
    pub artifacts_dir: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,

    /// Solution checkout to read snippets from. `None` skips snippets.
    pub solution_root: Option<Utf8PathBuf>,

    // Engine
    pub context_lines: u32,
    pub include_potential: bool,
    /// `None` derives a cap from the input size.
    pub max_applications: Option<usize>,
}

impl Default for LocalizeSettings {
    fn default() -> Self {
        Self {
            artifacts_dir: Utf8PathBuf::from("artifacts"),
            out_dir: Utf8PathBuf::from("artifacts/covhint"),
            solution_root: None,
            context_lines: DEFAULT_CONTEXT_LINES,
            include_potential: true,
            max_applications: None,
        }
    }
}
