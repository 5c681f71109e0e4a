//! Configuration file loading for covhint.
//!
//! Discovers and loads `covhint.toml` from the working root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use covhint_domain::DEFAULT_CONTEXT_LINES;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "covhint.toml";

/// Top-level configuration from covhint.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CovhintConfig {
    pub engine: EngineSection,
    pub output: OutputSection,
}

/// Engine section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Lines a change block may grow by on each side. 0 disables potential blocks.
    pub context_lines: u32,

    /// Cap on knowledge source applications.
    pub max_applications: Option<usize>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            max_applications: None,
        }
    }
}

/// Output section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Emit hints for potential (context-extended) blocks.
    pub include_potential: bool,

    /// Attach solution code to each hint.
    pub snippets: bool,

    /// Solution checkout to read snippets from, relative to the root.
    pub solution_root: Option<Utf8PathBuf>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            include_potential: true,
            snippets: false,
            solution_root: None,
        }
    }
}

/// Discover the covhint.toml config file in `root`.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a covhint.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<CovhintConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<CovhintConfig> {
    let config: CovhintConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<CovhintConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(CovhintConfig::default()),
    }
}

/// Effective localize settings after merging config file and CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub context_lines: u32,
    pub include_potential: bool,
    pub max_applications: Option<usize>,
    /// Where to read snippets from; `None` disables snippets.
    pub solution_root: Option<Utf8PathBuf>,
}

/// CLI overrides for `localize`. `None` / `false` leave the config file value in place.
#[derive(Debug, Clone, Default)]
pub struct LocalizeOverrides {
    pub context_lines: Option<u32>,
    pub no_potential: bool,
    pub max_applications: Option<usize>,
    pub solution_root: Option<Utf8PathBuf>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: CovhintConfig,
}

impl ConfigMerger {
    pub fn new(config: CovhintConfig) -> Self {
        Self { config }
    }

    /// Merge with localize command CLI arguments.
    ///
    /// A CLI `--solution-root` turns snippets on by itself. Otherwise snippets follow the config
    /// file, reading from its `solution_root` (relative to `root`) or from `root` itself.
    pub fn merge_localize_args(self, root: &Utf8Path, cli: &LocalizeOverrides) -> MergedConfig {
        let output = self.config.output;

        let solution_root = match &cli.solution_root {
            Some(path) => Some(path.clone()),
            None if output.snippets => Some(match output.solution_root {
                Some(rel) if rel.is_absolute() => rel,
                Some(rel) => root.join(rel),
                None => root.to_path_buf(),
            }),
            None => None,
        };

        MergedConfig {
            context_lines: cli
                .context_lines
                .unwrap_or(self.config.engine.context_lines),
            include_potential: output.include_potential && !cli.no_potential,
            max_applications: cli
                .max_applications
                .or(self.config.engine.max_applications),
            solution_root,
        }
    }
}
