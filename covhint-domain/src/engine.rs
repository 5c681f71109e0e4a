use crate::blackboard::Blackboard;
use crate::error::EngineError;
use crate::grouped::GroupedFile;
use crate::sources::{self, KnowledgeSource};
use tracing::{debug, trace};

/// Default number of context lines a change block may grow by on each side.
pub const DEFAULT_CONTEXT_LINES: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub context_lines: u32,
    pub include_potential: bool,
    /// Abort once this many `apply` calls have been made. `None` means unbounded.
    pub max_applications: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            include_potential: true,
            max_applications: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// `apply` calls, productive or not.
    pub applications: usize,
    /// Scans over the source list, including the final one that found nothing to do.
    pub passes: usize,
}

/// Drives an ordered list of knowledge sources over a blackboard until none makes progress.
pub struct Engine {
    sources: Vec<Box<dyn KnowledgeSource>>,
    max_applications: Option<usize>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sources: sources::builtin_sources(config),
            max_applications: config.max_applications,
        }
    }

    pub fn with_sources(
        sources: Vec<Box<dyn KnowledgeSource>>,
        max_applications: Option<usize>,
    ) -> Self {
        Self {
            sources,
            max_applications,
        }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Worst-case `apply` calls for a blackboard whose coverage has `pairs` (file, test case)
    /// pairs, when every source is monotone.
    pub fn application_bound(&self, pairs: usize) -> usize {
        let sources = self.sources.len();
        let productive = sources.saturating_mul(pairs.saturating_add(1));
        sources.saturating_mul(productive.saturating_add(1))
    }

    /// Run to fixpoint. After any productive application the scan restarts at the first source.
    pub fn drive(&self, bb: &mut Blackboard) -> Result<RunStats, EngineError> {
        let mut stats = RunStats::default();

        loop {
            stats.passes += 1;
            let mut progressed = false;

            for source in &self.sources {
                if !source.can_apply(bb) {
                    continue;
                }
                if let Some(limit) = self.max_applications
                    && stats.applications >= limit
                {
                    return Err(EngineError::ApplicationLimit { limit });
                }

                stats.applications += 1;
                let changed = source
                    .apply(bb)
                    .map_err(|error| EngineError::Correlation {
                        source_name: source.name(),
                        error,
                    })?;
                trace!(source = source.name(), changed, "applied knowledge source");

                if changed {
                    progressed = true;
                    break;
                }
            }

            if !progressed {
                break;
            }
        }

        debug!(
            applications = stats.applications,
            passes = stats.passes,
            grouped = bb.grouped_files().map_or(0, <[GroupedFile]>::len),
            "engine settled"
        );
        Ok(stats)
    }

    /// Run to fixpoint and return the grouped files, empty when nothing could be grouped.
    pub fn run<'bb>(&self, bb: &'bb mut Blackboard) -> Result<&'bb [GroupedFile], EngineError> {
        self.drive(bb)?;
        Ok(bb.grouped_files().unwrap_or_default())
    }
}
