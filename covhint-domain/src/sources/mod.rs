//! Knowledge sources: the rule units the engine drives to a fixpoint.
//!
//! Each source owns exactly one transition on the blackboard. Its precondition is "my input is
//! ready and my output is not", so the fixed order below is also the data-flow order.

use crate::blackboard::Blackboard;
use crate::engine::EngineConfig;
use crate::error::CorrelationError;
use serde::Serialize;

mod blocks;
mod changed;
mod common;
mod covered;
mod emit;
mod group;

pub use blocks::{MergeIntoChangeBlocks, change_blocks};
pub use changed::ExtractChangedLines;
pub use common::ComputeCommonLines;
pub use covered::ExtractCoveredLines;
pub use emit::{EmitLocalizedHints, hint_id};
pub use group::GroupByFileAndTestCase;

pub trait KnowledgeSource: Send + Sync {
    fn meta(&self) -> &'static SourceMeta;

    fn name(&self) -> &'static str {
        self.meta().name
    }

    /// Pure check against the current blackboard state.
    fn can_apply(&self, bb: &Blackboard) -> bool;

    /// Advance the blackboard by one step. `Ok(true)` means observable state changed.
    fn apply(&self, bb: &mut Blackboard) -> Result<bool, CorrelationError>;
}

/// Static description of a knowledge source, for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceMeta {
    pub name: &'static str,
    pub reads: &'static [&'static str],
    pub writes: &'static str,
    pub summary: &'static str,
}

pub fn builtin_sources(config: &EngineConfig) -> Vec<Box<dyn KnowledgeSource>> {
    vec![
        Box::new(GroupByFileAndTestCase),
        Box::new(ExtractChangedLines),
        Box::new(ExtractCoveredLines),
        Box::new(ComputeCommonLines),
        Box::new(MergeIntoChangeBlocks::new(config.context_lines)),
        Box::new(EmitLocalizedHints::new(config.include_potential)),
    ]
}

pub fn builtin_source_metas() -> Vec<&'static SourceMeta> {
    vec![
        &GroupByFileAndTestCase::META,
        &ExtractChangedLines::META,
        &ExtractCoveredLines::META,
        &ComputeCommonLines::META,
        &MergeIntoChangeBlocks::META,
        &EmitLocalizedHints::META,
    ]
}
