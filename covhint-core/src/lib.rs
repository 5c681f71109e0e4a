//! Embeddable core library for covhint.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking into a batch job, a
//! service handler, or the `covhint` binary.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`ReportSource`](ports::ReportSource) loads the diff and coverage reports
//! - [`WritePort`](ports::WritePort) writes files and creates directories
//!
//! The [`adapters`] module provides filesystem-backed and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_localize`](pipeline::run_localize) produces a hint report
//! - [`write_localize_artifacts`](pipeline::write_localize_artifacts) persists it

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export so embedders don't need covhint-domain or covhint-reports directly.
pub use covhint_domain::{EngineError, SourceView};
pub use covhint_reports::{LoadedInputs, ReportLoadError};
