//! Domain logic: correlate a diff report and a coverage report into per-test change blocks.
//!
//! The engine is a blackboard: knowledge sources each fill one derived field and the engine
//! re-scans them in a fixed order until nothing moves. This crate performs no I/O during a run;
//! reading solution sources for snippets happens afterwards, through [`SourceView`].

mod blackboard;
mod engine;
mod error;
mod grouped;
mod localizer;
mod ports;
mod sources;

pub use blackboard::Blackboard;
pub use engine::{DEFAULT_CONTEXT_LINES, Engine, EngineConfig, RunStats};
pub use error::{CorrelationError, EngineError, Stage};
pub use grouped::GroupedFile;
pub use localizer::{Localization, Localizer};
pub use ports::{FsSourceView, SourceView};
pub use sources::{
    ComputeCommonLines, EmitLocalizedHints, ExtractChangedLines, ExtractCoveredLines,
    GroupByFileAndTestCase, KnowledgeSource, MergeIntoChangeBlocks, SourceMeta, builtin_source_metas,
    builtin_sources, change_blocks, hint_id,
};
